//! Document viewport painting.
//!
//! Walks the buffer from the viewport's first line, running the document's
//! highlighting machine over every consumed codepoint, and places the
//! visible ones into the working frame. The highlight state cached at
//! `top_pos` is resumed when still valid; otherwise the scan restarts from
//! offset 0 up to the viewport start and the rebuilt snapshot is cached.

use crate::{Palette, Screen, Style};
use core_doc::Document;
use core_highlight::{HighlightState, Highlighter, TokenKind};
use core_text::Pos;
use core_text::coords::advance_col;
use unicode_width::UnicodeWidthChar;

fn consume(
    hl: Option<&dyn Highlighter>,
    state: &mut HighlightState,
    doc: &Document,
    pos: Pos,
) -> TokenKind {
    match hl {
        Some(h) => h.highlight_char(state, doc.buffer(), pos),
        None => TokenKind::None,
    }
}

/// Position and highlight snapshot of the viewport's first line, resumed
/// from the document's cache or rebuilt from offset 0.
fn viewport_start(doc: &mut Document, hl: Option<&dyn Highlighter>) -> (Pos, HighlightState) {
    if let Some(p) = doc.top_pos {
        return (p, doc.highlight.clone());
    }
    let mut state = HighlightState::default();
    let mut pos = Pos::ZERO;
    let mut line = 1;
    while line < doc.top {
        let Some(c) = doc.buffer().char_at(pos) else {
            break;
        };
        consume(hl, &mut state, doc, pos);
        if c == '\n' {
            line += 1;
        }
        pos = doc
            .buffer()
            .step_forward(pos)
            .expect("char_at was Some");
    }
    doc.top_pos = Some(pos);
    doc.highlight = state.clone();
    (pos, state)
}

/// Paint the document's viewport into rows `0..text_rows` of the working
/// frame. Returns the cursor's on-screen `(row, col)`.
pub fn paint_document(
    screen: &mut Screen,
    doc: &mut Document,
    hl: Option<&dyn Highlighter>,
    palette: &Palette,
    text_rows: usize,
) -> (u16, u16) {
    let (mut pos, mut state) = viewport_start(doc, hl);
    let selection = doc.selection_span();
    let width = screen.width();
    let mut cursor = (0u16, 0u16);
    let mut at_end = false;
    for row in 0..text_rows {
        screen.fill_row(row, palette.text());
        if at_end {
            continue;
        }
        // Logical column per the coordinate model; x is the screen column,
        // which diverges on width-2 glyphs.
        let mut col = 1usize;
        let mut x = 0usize;
        loop {
            if pos == doc.position {
                cursor = (row as u16, x.min(width.saturating_sub(1)) as u16);
            }
            let Some(c) = doc.buffer().char_at(pos) else {
                at_end = true;
                break;
            };
            let kind = consume(hl, &mut state, doc, pos);
            if c == '\n' {
                pos = doc.buffer().step_forward(pos).expect("newline consumed");
                break;
            }
            let style = match selection {
                Some((s, e)) if s <= pos && pos < e => palette.selection,
                _ => palette.token(kind),
            };
            let next_col = advance_col(col, c);
            if col >= doc.left && x < width {
                if c == '\t' {
                    for _ in col..next_col {
                        screen.put(row, x, ' ', style);
                        x += 1;
                    }
                } else {
                    screen.put(row, x, c, style);
                    x += c.width().unwrap_or(1);
                }
            }
            col = next_col;
            pos = doc.buffer().step_forward(pos).expect("char_at was Some");
        }
    }
    cursor
}

/// Paint a single full-width text row (status bar, command line).
pub fn paint_status_row(screen: &mut Screen, row: usize, text: &str, style: Style) {
    screen.fill_row(row, style);
    let width = screen.width();
    let mut x = 0usize;
    for c in text.chars() {
        if x >= width {
            break;
        }
        screen.put(row, x, c, style);
        x += c.width().unwrap_or(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_highlight::CHighlighter;
    use pretty_assertions::assert_eq;

    fn row_string(screen: &Screen, row: usize) -> String {
        (0..screen.width())
            .map(|c| screen.cell(row, c).ch)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn plain_text_paints_viewport_rows() {
        let mut screen = Screen::new(10, 3);
        let mut doc = Document::from_str("ab\ncd\nef");
        let palette = Palette::dark();
        let cursor = paint_document(&mut screen, &mut doc, None, &palette, 2);
        assert_eq!(row_string(&screen, 0), "ab");
        assert_eq!(row_string(&screen, 1), "cd");
        assert_eq!(cursor, (0, 0));
        assert_eq!(doc.top_pos, Some(Pos::ZERO));
    }

    #[test]
    fn cursor_mid_document_maps_to_screen() {
        let mut screen = Screen::new(10, 3);
        let mut doc = Document::from_str("ab\ncd");
        doc.move_to_line_col(2, 2);
        let palette = Palette::dark();
        let cursor = paint_document(&mut screen, &mut doc, None, &palette, 3);
        assert_eq!(cursor, (1, 1));
    }

    #[test]
    fn scrolled_viewport_starts_at_top_line() {
        let mut screen = Screen::new(10, 2);
        let mut doc = Document::from_str("one\ntwo\nthree\nfour");
        doc.move_to_line(3);
        doc.scroll_to_cursor(10, 2);
        assert_eq!(doc.top, 2);
        let palette = Palette::dark();
        paint_document(&mut screen, &mut doc, None, &palette, 2);
        assert_eq!(row_string(&screen, 0), "two");
        assert_eq!(row_string(&screen, 1), "three");
        // The rebuilt viewport start lands on "two".
        assert_eq!(doc.top_pos.map(|p| p.get()), Some(4));
    }

    #[test]
    fn keywords_take_token_style() {
        let mut screen = Screen::new(20, 2);
        let mut doc = Document::from_str("int x;\n");
        let palette = Palette::dark();
        let hl = CHighlighter::new();
        paint_document(&mut screen, &mut doc, Some(&hl), &palette, 1);
        let type_style = palette.token(core_highlight::TokenKind::Type);
        assert_eq!(screen.cell(0, 0).style, type_style);
        assert_eq!(screen.cell(0, 2).style, type_style);
        assert_eq!(screen.cell(0, 4).style, palette.text());
    }

    #[test]
    fn tabs_expand_to_stops() {
        let mut screen = Screen::new(12, 1);
        let mut doc = Document::from_str("\tx");
        let palette = Palette::dark();
        paint_document(&mut screen, &mut doc, None, &palette, 1);
        assert_eq!(row_string(&screen, 0), "    x");
    }

    #[test]
    fn selection_overrides_token_style() {
        let mut screen = Screen::new(10, 1);
        let mut doc = Document::from_str("abcd");
        doc.set_mark();
        doc.move_char_forward();
        doc.move_char_forward();
        let palette = Palette::dark();
        paint_document(&mut screen, &mut doc, None, &palette, 1);
        assert_eq!(screen.cell(0, 0).style, palette.selection);
        assert_eq!(screen.cell(0, 1).style, palette.selection);
        assert_eq!(screen.cell(0, 2).style, palette.text());
    }

    #[test]
    fn status_row_truncates_to_width() {
        let mut screen = Screen::new(5, 2);
        let palette = Palette::dark();
        paint_status_row(&mut screen, 1, "hello world", palette.status);
        assert_eq!(row_string(&screen, 1), "hello");
        assert_eq!(screen.cell(1, 4).style, palette.status);
    }
}
