//! Token-class and UI-role color mapping for the two built-in palettes.

use crate::Style;
use core_highlight::TokenKind;
use crossterm::style::Color;

/// Resolves token kinds and UI roles to concrete styles. The palette only
/// decides colors; layout stays with the painters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    bg: Color,
    fg: Color,
    pub status: Style,
    pub selection: Style,
    pub command: Style,
}

impl Palette {
    /// Light text on a dark background.
    pub fn dark() -> Self {
        let bg = Color::Black;
        let fg = Color::Grey;
        Self {
            bg,
            fg,
            status: Style {
                fg: Color::Black,
                bg: Color::Grey,
            },
            selection: Style {
                fg: Color::Black,
                bg: Color::DarkCyan,
            },
            command: Style {
                fg: Color::White,
                bg,
            },
        }
    }

    /// Dark text on a light background.
    pub fn bright() -> Self {
        let bg = Color::White;
        let fg = Color::Black;
        Self {
            bg,
            fg,
            status: Style {
                fg: Color::White,
                bg: Color::DarkGrey,
            },
            selection: Style {
                fg: Color::White,
                bg: Color::DarkBlue,
            },
            command: Style {
                fg: Color::Black,
                bg,
            },
        }
    }

    /// Default document text style.
    pub fn text(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
        }
    }

    /// Style for one token class.
    pub fn token(&self, kind: TokenKind) -> Style {
        let fg = match kind {
            TokenKind::None | TokenKind::Ident => self.fg,
            TokenKind::Str | TokenKind::AttributeValue => Color::DarkGreen,
            TokenKind::Number => Color::DarkMagenta,
            TokenKind::Keyword => Color::DarkYellow,
            TokenKind::Type => Color::DarkCyan,
            TokenKind::Comment | TokenKind::BlockComment => Color::DarkGrey,
            TokenKind::Preprocessor => Color::DarkRed,
            TokenKind::Variable => Color::Cyan,
            TokenKind::Tag => Color::Blue,
            TokenKind::Attribute => Color::DarkYellow,
        };
        Style { fg, bg: self.bg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_styles_share_the_palette_background() {
        for p in [Palette::dark(), Palette::bright()] {
            assert_eq!(p.token(TokenKind::Keyword).bg, p.text().bg);
            assert_eq!(p.token(TokenKind::None), p.text());
        }
    }

    #[test]
    fn palettes_differ_in_background() {
        assert_ne!(Palette::dark().text().bg, Palette::bright().text().bg);
    }
}
