//! Markup (HTML/XML) highlighting machine: tags, attribute names, quoted
//! attribute values, and `<!-- -->` comments. A short lookahead at `<`
//! distinguishes a comment opener from a tag.

use crate::{HighlightState, Highlighter, TokenKind};
use core_text::{Buffer, Pos};

#[derive(Debug, Default)]
pub struct MarkupHighlighter;

impl MarkupHighlighter {
    pub fn new() -> Self {
        Self
    }

    /// Do the three codepoints after `pos` spell `!--`?
    fn opens_comment(&self, buf: &Buffer, pos: Pos) -> bool {
        let mut p = pos;
        for want in ['!', '-', '-'] {
            p = match buf.step_forward(p) {
                Some(n) => n,
                None => return false,
            };
            if buf.char_at(p) != Some(want) {
                return false;
            }
        }
        true
    }
}

impl Highlighter for MarkupHighlighter {
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
                // Rolling two-char history in (start_ch, prev_ch) to spot "-->".
                if c == '>' && state.prev_ch == '-' && state.start_ch == '-' {
                    state.arm(1, TokenKind::Comment)
                } else {
                    state.start_ch = state.prev_ch;
                    state.prev_ch = c;
                    TokenKind::Comment
                }
            }
            TokenKind::Tag => {
                if c == '>' {
                    state.arm(1, TokenKind::Tag)
                } else if c.is_whitespace() {
                    state.kind = TokenKind::Attribute;
                    TokenKind::None
                } else {
                    TokenKind::Tag
                }
            }
            TokenKind::Attribute => match c {
                '>' => state.arm(1, TokenKind::Tag),
                '"' | '\'' => {
                    state.kind = TokenKind::AttributeValue;
                    state.start_ch = c;
                    TokenKind::AttributeValue
                }
                '=' | '/' => TokenKind::None,
                _ if c.is_whitespace() => TokenKind::None,
                _ => TokenKind::Attribute,
            },
            TokenKind::AttributeValue => {
                if c == state.start_ch {
                    // Closing quote keeps the value color; scanning continues
                    // in attribute position inside the same tag.
                    state.kind = TokenKind::Attribute;
                    TokenKind::AttributeValue
                } else {
                    TokenKind::AttributeValue
                }
            }
            _ => {
                if c == '<' {
                    if self.opens_comment(buf, pos) {
                        state.kind = TokenKind::Comment;
                        state.start_ch = '\0';
                        state.prev_ch = '\0';
                        TokenKind::Comment
                    } else {
                        state.kind = TokenKind::Tag;
                        TokenKind::Tag
                    }
                } else {
                    TokenKind::None
                }
            }
        }
    }
}
