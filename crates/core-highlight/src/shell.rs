//! Shell highlighting machine: `#` comments, keywords, `$x` / `${x}`
//! variables, `var=` assignment detection, strings, lax numbers.

use crate::{HighlightState, Highlighter, TokenKind, is_number_char, scan_ident};
use core_text::{Buffer, Pos};

/// Sorted for binary search.
const KEYWORDS: &[&str] = &[
    "case", "do", "done", "elif", "else", "esac", "export", "fi", "for", "function", "if", "in",
    "local", "return", "select", "then", "until", "while",
];

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Default)]
pub struct ShellHighlighter;

impl ShellHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn dispatch(&self, state: &mut HighlightState, buf: &Buffer, pos: Pos, c: char) -> TokenKind {
        match c {
            '#' => {
                state.kind = TokenKind::Comment;
                TokenKind::Comment
            }
            '"' | '\'' => {
                state.kind = TokenKind::Str;
                state.start_ch = c;
                state.prev_ch = '\0';
                TokenKind::Str
            }
            '$' => {
                state.kind = TokenKind::Variable;
                state.start_ch = match buf.step_forward(pos).and_then(|n| buf.char_at(n)) {
                    Some('{') => '{',
                    _ => '\0',
                };
                TokenKind::Variable
            }
            _ if c.is_ascii_digit() => {
                state.kind = TokenKind::Number;
                TokenKind::Number
            }
            _ if is_ident_start(c) => {
                let (word, len) = scan_ident(buf, pos, is_ident_char);
                let kind = if KEYWORDS.binary_search(&word.as_str()).is_ok() {
                    TokenKind::Keyword
                } else if self.followed_by_assignment(buf, pos, len) {
                    TokenKind::Variable
                } else {
                    TokenKind::Ident
                };
                state.word = word;
                state.arm(len, kind)
            }
            _ => TokenKind::None,
        }
    }

    /// True when the identifier run starting at `pos` (of `len` codepoints)
    /// is immediately followed by `=` (a shell assignment).
    fn followed_by_assignment(&self, buf: &Buffer, pos: Pos, len: usize) -> bool {
        let mut p = pos;
        for _ in 0..len {
            p = match buf.step_forward(p) {
                Some(n) => n,
                None => return false,
            };
        }
        buf.char_at(p) == Some('=')
    }
}

impl Highlighter for ShellHighlighter {
    fn highlight_char(&self, state: &mut HighlightState, buf: &Buffer, pos: Pos) -> TokenKind {
        if state.chars_remaining > 0 {
            return state.countdown();
        }
        let c = match buf.char_at(pos) {
            Some(c) => c,
            None => return TokenKind::None,
        };
        match state.kind {
            TokenKind::Comment => {
                if c == '\n' {
                    state.kind = TokenKind::None;
                    TokenKind::None
                } else {
                    TokenKind::Comment
                }
            }
            TokenKind::Str => {
                if state.prev_ch == '\\' {
                    state.prev_ch = '\0';
                    TokenKind::Str
                } else if c == '\\' && state.start_ch == '"' {
                    // Single quotes are literal in shell; no escapes inside.
                    state.prev_ch = '\\';
                    TokenKind::Str
                } else if c == state.start_ch {
                    state.arm(1, TokenKind::Str)
                } else if c == '\n' {
                    state.kind = TokenKind::None;
                    TokenKind::None
                } else {
                    TokenKind::Str
                }
            }
            TokenKind::Variable => {
                if state.start_ch == '{' {
                    if c == '}' {
                        state.arm(1, TokenKind::Variable)
                    } else {
                        TokenKind::Variable
                    }
                } else if is_ident_char(c) {
                    TokenKind::Variable
                } else {
                    state.kind = TokenKind::None;
                    self.dispatch(state, buf, pos, c)
                }
            }
            TokenKind::Number => {
                if is_number_char(c) {
                    TokenKind::Number
                } else {
                    state.kind = TokenKind::None;
                    self.dispatch(state, buf, pos, c)
                }
            }
            _ => self.dispatch(state, buf, pos, c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::classify_all;
    use pretty_assertions::assert_eq;

    fn kinds_of(text: &str) -> Vec<TokenKind> {
        classify_all(&ShellHighlighter::new(), text)
    }

    #[test]
    fn comment_to_end_of_line() {
        let k = kinds_of("a # b\nc");
        assert_eq!(k[2], TokenKind::Comment);
        assert_eq!(k[4], TokenKind::Comment);
        assert_eq!(k[5], TokenKind::None);
        assert_eq!(k[6], TokenKind::Ident);
    }

    #[test]
    fn simple_and_braced_variables() {
        let k = kinds_of("$ab ${cd} e");
        assert_eq!(&k[..3], &[TokenKind::Variable; 3]);
        assert_eq!(k[3], TokenKind::None);
        assert_eq!(&k[4..9], &[TokenKind::Variable; 5]);
        assert_eq!(k[10], TokenKind::Ident);
    }

    #[test]
    fn assignment_colors_the_name() {
        let k = kinds_of("foo=1 bar");
        assert_eq!(&k[..3], &[TokenKind::Variable; 3]);
        assert_eq!(k[3], TokenKind::None); // '='
        assert_eq!(k[4], TokenKind::Number);
        assert_eq!(k[6], TokenKind::Ident);
    }

    #[test]
    fn keywords_recognized() {
        let k = kinds_of("if x; then");
        assert_eq!(&k[..2], &[TokenKind::Keyword; 2]);
        assert_eq!(k[3], TokenKind::Ident);
        assert_eq!(&k[6..10], &[TokenKind::Keyword; 4]);
    }

    #[test]
    fn single_quotes_take_no_escapes() {
        let k = kinds_of(r"'a\' b");
        // The backslash does not escape; the second quote closes the string.
        assert_eq!(&k[..4], &[TokenKind::Str; 4]);
        assert_ne!(k[5], TokenKind::Str);
    }
}
