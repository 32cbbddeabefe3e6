//! C-family highlighting machine: keywords, types, preprocessor lines,
//! string/char literals with escapes, lax numbers, line and block comments.

use crate::{HighlightState, Highlighter, TokenKind, is_number_char, scan_ident};
use core_text::{Buffer, Pos};

/// Sorted for binary search.
const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "default", "delete", "do", "else",
    "enum", "extern", "false", "for", "goto", "if", "inline", "namespace", "new", "nullptr",
    "private", "protected", "public", "register", "return", "sizeof", "static", "struct", "switch",
    "template", "throw", "true", "try", "typedef", "union", "using", "virtual", "volatile",
    "while",
];

const TYPES: &[&str] = &[
    "auto", "bool", "char", "double", "float", "int", "int16_t", "int32_t", "int64_t", "int8_t",
    "long", "short", "signed", "size_t", "ssize_t", "uint16_t", "uint32_t", "uint64_t", "uint8_t",
    "unsigned", "void", "wchar_t",
];

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn classify(word: &str) -> TokenKind {
    if KEYWORDS.binary_search(&word).is_ok() {
        TokenKind::Keyword
    } else if TYPES.binary_search(&word).is_ok() {
        TokenKind::Type
    } else {
        TokenKind::Ident
    }
}

#[derive(Debug, Default)]
pub struct CHighlighter;

impl CHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn dispatch(&self, state: &mut HighlightState, buf: &Buffer, pos: Pos, c: char) -> TokenKind {
        match c {
            '"' | '\'' => {
                state.kind = TokenKind::Str;
                state.start_ch = c;
                state.prev_ch = '\0';
                TokenKind::Str
            }
            '/' => match buf.step_forward(pos).and_then(|n| buf.char_at(n)) {
                Some('/') => {
                    state.kind = TokenKind::Comment;
                    TokenKind::Comment
                }
                Some('*') => {
                    state.kind = TokenKind::BlockComment;
                    // Mark the opener's '*' as pending so "/*/" stays open.
                    state.start_ch = '*';
                    state.prev_ch = '\0';
                    TokenKind::BlockComment
                }
                _ => TokenKind::None,
            },
            '#' => {
                state.kind = TokenKind::Preprocessor;
                TokenKind::Preprocessor
            }
            _ if c.is_ascii_digit() => {
                state.kind = TokenKind::Number;
                TokenKind::Number
            }
            _ if is_ident_start(c) => {
                let (word, len) = scan_ident(buf, pos, is_ident_char);
                let kind = classify(&word);
                state.word = word;
                state.arm(len, kind)
            }
            _ => TokenKind::None,
        }
    }
}

impl Highlighter for CHighlighter {
    fn highlight_char(&self, state: &mut HighlightState, buf: &Buffer, pos: Pos) -> TokenKind {
        if state.chars_remaining > 0 {
            return state.countdown();
        }
        let c = match buf.char_at(pos) {
            Some(c) => c,
            None => return TokenKind::None,
        };
        match state.kind {
            TokenKind::Str => {
                if state.prev_ch == '\\' {
                    state.prev_ch = '\0'; // escaped char, stays in the literal
                    TokenKind::Str
                } else if c == '\\' {
                    state.prev_ch = '\\';
                    TokenKind::Str
                } else if c == state.start_ch {
                    state.arm(1, TokenKind::Str)
                } else if c == '\n' {
                    // Unterminated literal stops at the line end.
                    state.kind = TokenKind::None;
                    TokenKind::None
                } else {
                    TokenKind::Str
                }
            }
            TokenKind::Comment | TokenKind::Preprocessor => {
                if c == '\n' {
                    let kind = state.kind;
                    state.kind = TokenKind::None;
                    debug_assert_ne!(kind, TokenKind::None);
                    TokenKind::None
                } else {
                    state.kind
                }
            }
            TokenKind::BlockComment => {
                if state.start_ch == '*' {
                    // The '*' belonging to "/*"; it cannot close the comment.
                    state.start_ch = '\0';
                    state.prev_ch = '\0';
                    TokenKind::BlockComment
                } else if c == '/' && state.prev_ch == '*' {
                    state.arm(1, TokenKind::BlockComment)
                } else {
                    state.prev_ch = c;
                    TokenKind::BlockComment
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
        classify_all(&CHighlighter::new(), text)
    }

    #[test]
    fn keywords_types_and_idents() {
        let k = kinds_of("if x int");
        assert_eq!(k[0], TokenKind::Keyword);
        assert_eq!(k[1], TokenKind::Keyword);
        assert_eq!(k[2], TokenKind::None); // space
        assert_eq!(k[3], TokenKind::Ident);
        assert_eq!(k[5], TokenKind::Type);
        assert_eq!(k[7], TokenKind::Type);
    }

    #[test]
    fn string_terminator_shares_color() {
        let k = kinds_of("\"ab\"c");
        assert_eq!(&k[..4], &[TokenKind::Str; 4]);
        assert_eq!(k[4], TokenKind::Ident); // 'c' is back to normal scanning
    }

    #[test]
    fn escaped_quote_does_not_terminate() {
        let k = kinds_of(r#""a\"b"x"#);
        assert_eq!(&k[..6], &[TokenKind::Str; 6]);
        assert_ne!(k[6], TokenKind::Str);
    }

    #[test]
    fn line_comment_runs_to_newline() {
        let k = kinds_of("a // b\nc");
        assert_eq!(k[0], TokenKind::Ident);
        assert_eq!(k[2], TokenKind::Comment);
        assert_eq!(k[5], TokenKind::Comment);
        assert_eq!(k[6], TokenKind::None); // the newline
        assert_eq!(k[7], TokenKind::Ident);
    }

    #[test]
    fn block_comment_with_tricky_opener() {
        // "/*/" must not close; the terminating "*/" is still comment-colored.
        let k = kinds_of("/*/ x */y");
        assert_eq!(&k[..8], &[TokenKind::BlockComment; 8]);
        assert_eq!(k[8], TokenKind::Ident);
    }

    #[test]
    fn preprocessor_line() {
        let k = kinds_of("#include <stdio.h>\nint");
        assert_eq!(&k[..18], &[TokenKind::Preprocessor; 18]);
        assert_eq!(k[18], TokenKind::None);
        assert_eq!(k[19], TokenKind::Type);
    }

    #[test]
    fn lax_numbers_accept_hex_and_signs() {
        let k = kinds_of("0x1f+3;");
        assert_eq!(&k[..6], &[TokenKind::Number; 6]);
        assert_eq!(k[6], TokenKind::None);
    }
}
