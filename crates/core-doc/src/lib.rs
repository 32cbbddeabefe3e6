//! A document: one open file's buffer plus its cursor, selection, viewport
//! and cached highlighting state.
//!
//! Every operation keeps three invariants: the cursor position is always on a
//! codepoint boundary with `line`/`col` in sync (recomputed incrementally
//! from the previous cursor anchor), mutations set the modified flag, and any
//! operation that is not itself a selection-mode move clears the selection.

use core_highlight::{DocumentType, HighlightState};
use core_text::{Anchor, Buffer, LineCol, Pos};
use std::path::PathBuf;

mod edit;
mod io;
mod search;

pub use edit::LineChange;
pub use io::{
    Decoded, DocError, Encoding, LineEnding, decode_bytes, encode_text, trim_trailing_whitespace,
};
pub use search::ReplaceOutcome;

#[derive(Debug, Default)]
pub struct Document {
    buf: Buffer,
    /// Cursor, a byte position in `buf`.
    pub position: Pos,
    /// 1-based cursor line.
    pub line: usize,
    /// 1-based cursor column, counting tab stops.
    pub col: usize,
    /// Sticky column retained while moving vertically across shorter lines.
    pub preferred_col: usize,
    selection_anchor: Option<Pos>,
    /// Sticky-mark flag: while set, cursor motion extends the selection.
    pub selection_mode: bool,
    /// First visible line (1-based).
    pub top: usize,
    /// First visible column (1-based).
    pub left: usize,
    /// Buffer position of the viewport's first line, `None` when it must be
    /// recomputed from offset 0 on the next draw.
    pub top_pos: Option<Pos>,
    pub modified: bool,
    pub filename: Option<PathBuf>,
    pub doc_type: DocumentType,
    pub encoding: Encoding,
    pub has_bom: bool,
    pub line_ending: LineEnding,
    /// Highlighting state cached at `top_pos`.
    pub highlight: HighlightState,
}

impl Document {
    pub fn new() -> Self {
        Self {
            line: 1,
            col: 1,
            preferred_col: 1,
            top: 1,
            left: 1,
            ..Self::default()
        }
    }

    pub fn from_str(content: &str) -> Self {
        Self {
            buf: Buffer::from_str(content),
            ..Self::new()
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buf
    }

    pub fn text(&self) -> String {
        self.buf.to_string()
    }

    fn cursor_anchor(&self) -> Anchor {
        Anchor::new(self.position, self.line, self.col)
    }

    /// Anchor for an arbitrary position, resolved against the cursor before
    /// an edit is applied. Used to re-place the cursor afterwards.
    fn anchor_at(&self, pos: Pos) -> Anchor {
        let lc = self.buf.pos_to_line_col(self.cursor_anchor(), pos);
        Anchor::new(pos, lc.line, lc.col)
    }

    /// Recompute `line`/`col` for `pos` from the current cursor anchor and
    /// move there. Non-sticky moves also update the preferred column; the
    /// selection is cleared unless a sticky mark is active.
    fn place_cursor(&mut self, pos: Pos, sticky: bool) {
        let lc = self.buf.pos_to_line_col(self.cursor_anchor(), pos);
        self.position = pos;
        self.line = lc.line;
        self.col = lc.col;
        if !sticky {
            self.preferred_col = lc.col;
        }
        if !self.selection_mode {
            self.selection_anchor = None;
        }
    }

    /// Cursor bookkeeping after a buffer mutation. `valid` must be an anchor
    /// at or before the edit start; its prefix is untouched by the edit, so
    /// it stays correct in the new buffer; the stale cursor anchor does not.
    /// The edit fully replaces any selection, so mark and anchor are dropped.
    fn place_cursor_after_edit(&mut self, pos: Pos, valid: Anchor) {
        debug_assert!(valid.pos <= pos);
        let lc = self.buf.pos_to_line_col(valid, pos);
        self.position = pos;
        self.line = lc.line;
        self.col = lc.col;
        self.preferred_col = lc.col;
        self.modified = true;
        self.selection_mode = false;
        self.selection_anchor = None;
    }

    /// Invalidate the cached viewport start if an edit happened before it.
    /// Highlighting state is a function of the prefix, so edits at or after
    /// `top_pos` leave the cache valid.
    fn note_edit(&mut self, at: Pos) {
        if let Some(top) = self.top_pos
            && at < top
        {
            self.top_pos = None;
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// One codepoint right. Returns whether the cursor moved.
    pub fn move_char_forward(&mut self) -> bool {
        match self.buf.step_forward(self.position) {
            Some(p) => {
                self.place_cursor(p, false);
                true
            }
            None => false,
        }
    }

    /// One codepoint left.
    pub fn move_char_back(&mut self) -> bool {
        match self.buf.step_back(self.position) {
            Some(p) => {
                self.place_cursor(p, false);
                true
            }
            None => false,
        }
    }

    /// Forward to the next word boundary.
    pub fn move_word_forward(&mut self) -> bool {
        let p = self.buf.next_word_boundary(self.position);
        let moved = p != self.position;
        if moved {
            self.place_cursor(p, false);
        }
        moved
    }

    /// Back to the previous word boundary.
    pub fn move_word_back(&mut self) -> bool {
        let p = self.buf.prev_word_boundary(self.position);
        let moved = p != self.position;
        if moved {
            self.place_cursor(p, false);
        }
        moved
    }

    /// Forward to the next end-of-space-run.
    pub fn move_run_forward(&mut self) -> bool {
        let p = self.buf.next_run_boundary(self.position);
        let moved = p != self.position;
        if moved {
            self.place_cursor(p, false);
        }
        moved
    }

    /// Back to the previous end-of-space-run.
    pub fn move_run_back(&mut self) -> bool {
        let p = self.buf.prev_run_boundary(self.position);
        let moved = p != self.position;
        if moved {
            self.place_cursor(p, false);
        }
        moved
    }

    /// Smart home: first press goes to the first non-blank column; pressed
    /// there, to column 1. Repeated presses alternate.
    pub fn move_to_line_start(&mut self) {
        let start = self.buf.line_start(self.position);
        let mut first_non_blank = start;
        while let Some(c) = self.buf.char_at(first_non_blank) {
            if c != ' ' && c != '\t' {
                break;
            }
            first_non_blank = match self.buf.step_forward(first_non_blank) {
                Some(n) => n,
                None => break,
            };
        }
        let target = if self.position == first_non_blank {
            start
        } else {
            first_non_blank
        };
        self.place_cursor(target, false);
    }

    /// To the line's terminating newline (or the buffer end on the last line).
    pub fn move_to_line_end(&mut self) {
        let end = self.buf.line_end(self.position);
        self.place_cursor(end, false);
    }

    /// Vertical motion by `delta` lines, keeping the preferred column.
    pub fn move_lines(&mut self, delta: isize) -> bool {
        let target_line = if delta < 0 {
            self.line.saturating_sub(delta.unsigned_abs()).max(1)
        } else {
            self.line + delta as usize
        };
        if target_line == self.line {
            return false;
        }
        let got = self
            .buf
            .line_col_to_pos(self.cursor_anchor(), target_line, self.preferred_col);
        let moved = got.pos != self.position;
        self.position = got.pos;
        self.line = got.line;
        self.col = got.col;
        if !self.selection_mode {
            self.selection_anchor = None;
        }
        moved
    }

    /// Jump to a 1-based line, column 1.
    pub fn move_to_line(&mut self, line: usize) {
        self.move_to_line_col(line.max(1), 1);
    }

    /// Jump to a 1-based (line, column), clamping both.
    pub fn move_to_line_col(&mut self, line: usize, col: usize) {
        debug_assert!(line >= 1 && col >= 1);
        let got = self.buf.line_col_to_pos(self.cursor_anchor(), line, col);
        self.position = got.pos;
        self.line = got.line;
        self.col = got.col;
        self.preferred_col = col;
        if !self.selection_mode {
            self.selection_anchor = None;
        }
    }

    /// Jump to a validated position.
    pub fn move_to(&mut self, pos: Pos) {
        debug_assert!(pos <= self.buf.end());
        self.place_cursor(pos, false);
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Toggle the sticky mark. Enabling anchors the selection at the cursor;
    /// disabling clears it.
    pub fn set_mark(&mut self) {
        if self.selection_mode {
            self.selection_mode = false;
            self.selection_anchor = None;
        } else {
            self.selection_mode = true;
            self.selection_anchor = Some(self.position);
        }
    }

    /// Ordered non-empty selection span, if any.
    pub fn selection_span(&self) -> Option<(Pos, Pos)> {
        let anchor = self.selection_anchor?;
        if anchor == self.position {
            return None;
        }
        Some((
            anchor.min(self.position),
            anchor.max(self.position),
        ))
    }

    pub fn selection_anchor(&self) -> Option<Pos> {
        self.selection_anchor
    }

    /// Current line/column of an arbitrary position, computed from the
    /// cursor anchor (cheap for nearby positions).
    pub fn line_col_of(&self, pos: Pos) -> LineCol {
        self.buf.pos_to_line_col(self.cursor_anchor(), pos)
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// Scroll so the cursor is inside a `width` x `height` viewport.
    pub fn scroll_to_cursor(&mut self, width: usize, height: usize) {
        if height == 0 || width == 0 {
            return;
        }
        let old_top = self.top;
        if self.line < self.top {
            self.top = self.line;
        } else if self.line >= self.top + height {
            self.top = self.line + 1 - height;
        }
        if self.col < self.left {
            self.left = self.col;
        } else if self.col >= self.left + width {
            self.left = self.col + 1 - width;
        }
        if self.top != old_top {
            self.top_pos = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn char_motion_updates_line_col() {
        let mut d = Document::from_str("ab\ncd");
        assert!(d.move_char_forward());
        assert_eq!((d.line, d.col), (1, 2));
        assert!(d.move_char_forward());
        assert_eq!((d.line, d.col), (1, 3)); // on the newline
        assert!(d.move_char_forward());
        assert_eq!((d.line, d.col), (2, 1));
        assert!(d.move_char_back());
        assert_eq!((d.line, d.col), (1, 3));
    }

    #[test]
    fn motion_at_ends_reports_no_move() {
        let mut d = Document::from_str("a");
        assert!(!d.move_char_back());
        assert!(d.move_char_forward());
        assert!(!d.move_char_forward());
    }

    #[test]
    fn word_forward_then_back_from_inside_word() {
        let mut d = Document::from_str("alpha beta");
        d.move_to(d.buffer().pos_at(2).unwrap()); // inside "alpha"
        assert!(d.move_word_forward());
        let at_beta = d.position;
        assert_eq!(at_beta.get(), 6);
        assert!(d.move_word_back());
        assert_eq!(d.position.get(), 0);
        // From a boundary the pair is not symmetric: forward from "beta"
        // goes to the end, back returns to "beta", not the start point.
        d.move_to(at_beta);
        assert!(d.move_word_forward());
        assert!(d.move_word_back());
        assert_eq!(d.position, at_beta);
    }

    #[test]
    fn smart_home_alternates() {
        let mut d = Document::from_str("  indented");
        d.move_to_line_end();
        d.move_to_line_start();
        assert_eq!(d.col, 3); // first non-blank
        d.move_to_line_start();
        assert_eq!(d.col, 1);
        d.move_to_line_start();
        assert_eq!(d.col, 3);
    }

    #[test]
    fn vertical_motion_keeps_preferred_column() {
        let mut d = Document::from_str("long line\nx\nlonger line");
        d.move_to_line_col(1, 8);
        assert!(d.move_lines(1));
        assert_eq!((d.line, d.col), (2, 2)); // clamped to short line end
        assert!(d.move_lines(1));
        assert_eq!((d.line, d.col), (3, 8)); // preferred column restored
    }

    #[test]
    fn mark_extends_selection_until_toggled_off() {
        let mut d = Document::from_str("abcdef");
        d.set_mark();
        d.move_char_forward();
        d.move_char_forward();
        let (s, e) = d.selection_span().unwrap();
        assert_eq!((s.get(), e.get()), (0, 2));
        d.set_mark();
        assert!(d.selection_span().is_none());
        // Without the mark, motion clears any anchor.
        d.set_mark();
        d.move_char_forward();
        d.set_mark(); // off
        d.move_char_forward();
        assert!(d.selection_span().is_none());
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut d = Document::from_str(&"x\n".repeat(50));
        d.move_to_line(30);
        d.scroll_to_cursor(80, 10);
        assert!(d.top <= 30 && 30 < d.top + 10);
        assert_eq!(d.top, 21);
        d.move_to_line(5);
        d.scroll_to_cursor(80, 10);
        assert_eq!(d.top, 5);
    }
}
