//! Buffer-mutating operations: insertion with auto-indent, deletions, line
//! transforms (indent/unindent/comment), and the internal clipboard.

use crate::Document;
use core_text::{Pos, TAB_SIZE, boundary::is_word_char, coords::advance_col};

/// Per-line transform selected by [`Document::change_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    Indent,
    Unindent,
    Comment,
    Uncomment,
}

impl Document {
    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Insert one codepoint at the cursor and advance past it. With
    /// `skip_word`, the insertion point first skips forward past any word
    /// characters (typing a terminator right after accepting a completion
    /// lands it after the completed word).
    pub fn insert_char(&mut self, c: char, skip_word: bool) {
        let mut at = self.position;
        if skip_word {
            while let Some(ch) = self.buf.char_at(at) {
                if !is_word_char(ch) {
                    break;
                }
                at = self.buf.step_forward(at).expect("char_at was Some");
            }
        }
        let valid = self.anchor_at(at);
        let mut s = [0u8; 4];
        self.buf.insert(at, c.encode_utf8(&mut s));
        self.note_edit(at);
        let after = self
            .buf
            .pos_at(at.get() + c.len_utf8())
            .expect("insertion end is a boundary");
        self.place_cursor_after_edit(after, valid);
    }

    /// Insert a newline with auto-indent: trailing whitespace before the
    /// cursor and leading whitespace after it are replaced by `\n` plus the
    /// previous line's leading whitespace.
    pub fn insert_newline(&mut self) {
        // Back over any run of blanks and newlines ending at the cursor.
        let mut back = self.position;
        while let Some(c) = self.buf.char_before(back) {
            if c != ' ' && c != '\t' && c != '\n' {
                break;
            }
            back = self.buf.step_back(back).expect("char_before was Some");
        }
        // Leading whitespace of the line the cursor will continue from.
        let line_start = self.buf.line_start(back);
        let mut indent = String::new();
        let mut p = line_start;
        while let Some(c) = self.buf.char_at(p) {
            if c != ' ' && c != '\t' {
                break;
            }
            indent.push(c);
            p = self.buf.step_forward(p).expect("char_at was Some");
        }
        // Strip whitespace already present after the cursor.
        let mut fwd = self.position;
        while let Some(c) = self.buf.char_at(fwd) {
            if c != ' ' && c != '\t' {
                break;
            }
            fwd = self.buf.step_forward(fwd).expect("char_at was Some");
        }
        let valid = self.anchor_at(back);
        let replacement = format!("\n{indent}");
        self.buf.remove(back, fwd);
        self.buf.insert(back, &replacement);
        self.note_edit(back);
        let after = self
            .buf
            .pos_at(back.get() + replacement.len())
            .expect("insertion end is a boundary");
        self.place_cursor_after_edit(after, valid);
    }

    /// Insert `text` verbatim at the cursor and advance past it.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let at = self.position;
        let valid = self.anchor_at(at);
        self.buf.insert(at, text);
        self.note_edit(at);
        let after = self
            .buf
            .pos_at(at.get() + text.len())
            .expect("insertion end is a boundary");
        self.place_cursor_after_edit(after, valid);
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    fn delete_span(&mut self, start: Pos, end: Pos) -> bool {
        if start >= end {
            return false;
        }
        let valid = self.anchor_at(start);
        self.buf.remove(start, end);
        self.note_edit(start);
        self.place_cursor_after_edit(start, valid);
        true
    }

    /// Delete the codepoint under the cursor.
    pub fn delete_char_forward(&mut self) -> bool {
        match self.buf.step_forward(self.position) {
            Some(next) => self.delete_span(self.position, next),
            None => false,
        }
    }

    /// Delete the codepoint before the cursor.
    pub fn delete_char_back(&mut self) -> bool {
        match self.buf.step_back(self.position) {
            Some(prev) => self.delete_span(prev, self.position),
            None => false,
        }
    }

    /// Delete from the cursor to the next word boundary.
    pub fn delete_word_forward(&mut self) -> bool {
        let to = self.buf.next_word_boundary(self.position);
        self.delete_span(self.position, to)
    }

    /// Delete from the previous word boundary to the cursor.
    pub fn delete_word_back(&mut self) -> bool {
        let from = self.buf.prev_word_boundary(self.position);
        self.delete_span(from, self.position)
    }

    /// Delete from the cursor to the next space-run boundary.
    pub fn delete_run_forward(&mut self) -> bool {
        let to = self.buf.next_run_boundary(self.position);
        self.delete_span(self.position, to)
    }

    /// Delete from the previous space-run boundary to the cursor.
    pub fn delete_run_back(&mut self) -> bool {
        let from = self.buf.prev_run_boundary(self.position);
        self.delete_span(from, self.position)
    }

    // ------------------------------------------------------------------
    // Line transforms
    // ------------------------------------------------------------------

    /// Leading-whitespace width of the line starting at `start`, in columns.
    fn leading_width(&self, start: Pos) -> (Pos, usize) {
        let mut p = start;
        let mut col = 1;
        while let Some(c) = self.buf.char_at(p) {
            if c != ' ' && c != '\t' {
                break;
            }
            col = advance_col(col, c);
            p = self.buf.step_forward(p).expect("char_at was Some");
        }
        (p, col - 1)
    }

    fn apply_line_change(&mut self, line_start: Pos, change: LineChange) {
        match change {
            LineChange::Indent => {
                let (ws_end, width) = self.leading_width(line_start);
                let new_width = (width / TAB_SIZE + 1) * TAB_SIZE;
                self.buf.remove(line_start, ws_end);
                self.buf.insert(line_start, &" ".repeat(new_width));
            }
            LineChange::Unindent => {
                let (ws_end, width) = self.leading_width(line_start);
                let new_width = if width == 0 {
                    0
                } else {
                    ((width - 1) / TAB_SIZE) * TAB_SIZE
                };
                self.buf.remove(line_start, ws_end);
                self.buf.insert(line_start, &" ".repeat(new_width));
            }
            LineChange::Comment => {
                let (ws_end, _) = self.leading_width(line_start);
                self.buf.insert(ws_end, "//");
            }
            LineChange::Uncomment => {
                let (ws_end, _) = self.leading_width(line_start);
                let two = self
                    .buf
                    .step_forward(ws_end)
                    .and_then(|p| self.buf.step_forward(p));
                if let Some(two) = two
                    && self.buf.slice(ws_end, two) == "//"
                {
                    self.buf.remove(ws_end, two);
                }
            }
        }
        self.note_edit(line_start);
    }

    /// Apply a line transform to the current line, or to every line spanned
    /// by the selection. With a selection, both endpoints are recomputed so
    /// the selection still covers the same line range and the anchor stays
    /// on its original end.
    pub fn change_lines(&mut self, change: LineChange) {
        let prior = self.cursor_anchor();
        match self.selection_span() {
            None => {
                let line = self.line;
                self.apply_line_change(self.buf.line_start(self.position), change);
                // Re-resolve the cursor on the (possibly reflowed) line.
                let got = self.buf.line_col_to_pos(
                    core_text::Anchor::ORIGIN,
                    line,
                    self.preferred_col,
                );
                self.position = got.pos;
                self.line = got.line;
                self.col = got.col;
                self.modified = true;
            }
            Some((sel_start, sel_end)) => {
                let anchor = self.selection_anchor.expect("selection implies anchor");
                let anchor_first = anchor <= self.position;
                let first_lc = self.buf.pos_to_line_col(prior, sel_start);
                // The end of the span may sit at the start of a line it does
                // not really cover; it still counts, matching the simple
                // "every line the selection touches" rule.
                let last_lc = self.buf.pos_to_line_col(prior, sel_end);
                for line in first_lc.line..=last_lc.line {
                    let start = self
                        .buf
                        .line_col_to_pos(core_text::Anchor::ORIGIN, line, 1)
                        .pos;
                    self.apply_line_change(start, change);
                }
                // Recompute endpoints to cover the whole changed line range.
                let first_start = self
                    .buf
                    .line_col_to_pos(core_text::Anchor::ORIGIN, first_lc.line, 1)
                    .pos;
                let last_line_start = self
                    .buf
                    .line_col_to_pos(core_text::Anchor::ORIGIN, last_lc.line, 1);
                let last_end = self.buf.line_end(last_line_start.pos);
                let (new_anchor, new_cursor) = if anchor_first {
                    (first_start, last_end)
                } else {
                    (last_end, first_start)
                };
                self.selection_anchor = Some(new_anchor);
                let lc = self
                    .buf
                    .pos_to_line_col(core_text::Anchor::ORIGIN, new_cursor);
                self.position = new_cursor;
                self.line = lc.line;
                self.col = lc.col;
                self.preferred_col = lc.col;
                self.modified = true;
            }
        }
    }

    // ------------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------------

    /// Copy (and with `delete`, cut) the selection, or the whole current
    /// line including its newline when no selection exists. Returns the
    /// copied text.
    pub fn copy_delete_text(&mut self, delete: bool) -> Option<String> {
        match self.selection_span() {
            Some((start, end)) => {
                let text = self.buf.slice(start, end);
                if delete {
                    let valid = self.anchor_at(start);
                    self.buf.remove(start, end);
                    self.note_edit(start);
                    self.place_cursor_after_edit(start, valid);
                } else {
                    self.selection_mode = false;
                    self.selection_anchor = None;
                }
                Some(text)
            }
            None => {
                let start = self.buf.line_start(self.position);
                let mut end = self.buf.line_end(self.position);
                if self.buf.char_at(end) == Some('\n') {
                    end = self.buf.step_forward(end).expect("newline has successor");
                }
                if start == end {
                    return None;
                }
                let text = self.buf.slice(start, end);
                if delete {
                    let line = self.line;
                    let preferred = self.preferred_col;
                    let valid = self.anchor_at(start);
                    self.buf.remove(start, end);
                    self.note_edit(start);
                    self.place_cursor_after_edit(start, valid);
                    // Line cut restores the sticky column on the same line
                    // index (clamped if the file got shorter).
                    self.move_to_line_col(line.max(1), preferred.max(1));
                    self.preferred_col = preferred;
                }
                Some(text)
            }
        }
    }

    /// Paste: text ending in a newline is inserted at the start of the
    /// current line (line paste); anything else goes in at the cursor.
    pub fn paste_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if text.ends_with('\n') {
            let at = self.buf.line_start(self.position);
            self.buf.insert(at, text);
            self.note_edit(at);
            // The cursor's text shifted right by the insertion; follow it.
            let new_pos = self
                .buf
                .pos_at(self.position.get() + text.len())
                .expect("shift preserves the boundary");
            let lc = self
                .buf
                .pos_to_line_col(core_text::Anchor::ORIGIN, new_pos);
            self.position = new_pos;
            self.line = lc.line;
            self.col = lc.col;
            self.preferred_col = lc.col;
            self.modified = true;
            self.selection_mode = false;
            self.selection_anchor = None;
        } else {
            self.insert_text(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_char_advances_cursor() {
        let mut d = Document::from_str("");
        d.insert_char('a', false);
        d.insert_char('é', false);
        assert_eq!(d.text(), "aé");
        assert_eq!((d.line, d.col), (1, 3));
        assert!(d.modified);
    }

    #[test]
    fn insert_char_skip_word_jumps_past_completion() {
        let mut d = Document::from_str("hello world");
        // Cursor inside "hello"; a skip-word insert lands after it.
        d.move_to(d.buffer().pos_at(2).unwrap());
        d.insert_char('(', true);
        assert_eq!(d.text(), "hello( world");
        assert_eq!(d.position.get(), 6);
    }

    #[test]
    fn newline_copies_indent() {
        let mut d = Document::from_str("");
        for c in "  if(x){".chars() {
            d.insert_char(c, false);
        }
        d.insert_newline();
        assert_eq!(d.text(), "  if(x){\n  ");
        assert_eq!((d.line, d.col), (2, 3));
    }

    #[test]
    fn newline_strips_trailing_and_leading_blanks() {
        let mut d = Document::from_str("\tab   cd");
        d.move_to(d.buffer().pos_at(6).unwrap()); // inside the blank run
        d.insert_newline();
        assert_eq!(d.text(), "\tab\n\tcd");
    }

    #[test]
    fn delete_word_back_erases_span() {
        let mut d = Document::from_str("foo bar");
        d.move_to_line_end();
        assert!(d.delete_word_back());
        assert_eq!(d.text(), "foo ");
        assert_eq!(d.position.get(), 4);
    }

    #[test]
    fn indent_then_unindent_restores_aligned_width() {
        let mut d = Document::from_str("    x");
        d.change_lines(LineChange::Indent);
        assert_eq!(d.text(), "        x");
        d.change_lines(LineChange::Unindent);
        assert_eq!(d.text(), "    x");
    }

    #[test]
    fn indent_pads_to_next_stop_from_unaligned() {
        let mut d = Document::from_str("  x\n");
        d.change_lines(LineChange::Indent);
        assert_eq!(d.text(), "    x\n");
        d.change_lines(LineChange::Unindent);
        assert_eq!(d.text(), "x\n");
    }

    #[test]
    fn indent_converts_tabs_to_spaces() {
        let mut d = Document::from_str("\tx");
        d.change_lines(LineChange::Indent);
        assert_eq!(d.text(), "        x");
    }

    #[test]
    fn comment_toggle_round_trips() {
        let mut d = Document::from_str("  code();\n");
        d.change_lines(LineChange::Comment);
        assert_eq!(d.text(), "  //code();\n");
        d.change_lines(LineChange::Uncomment);
        assert_eq!(d.text(), "  code();\n");
        // Uncommenting an uncommented line is a no-op.
        d.change_lines(LineChange::Uncomment);
        assert_eq!(d.text(), "  code();\n");
    }

    #[test]
    fn change_lines_spans_selection_and_recovers_it() {
        let mut d = Document::from_str("a\nb\nc\n");
        d.set_mark();
        d.move_to_line(3); // selection covers lines 1..=3 (start of 3)
        d.change_lines(LineChange::Indent);
        assert_eq!(d.text(), "    a\n    b\n    c\n");
        let (s, e) = d.selection_span().unwrap();
        assert_eq!(s.get(), 0);
        // Cursor carries the non-anchor end, at the end of line 3.
        assert_eq!(e, d.position);
        assert_eq!(d.line, 3);
    }

    #[test]
    fn line_cut_restores_column_on_next_line() {
        let mut d = Document::from_str("one\ntwo\nthree\n");
        d.move_to_line_col(2, 3);
        let cut = d.copy_delete_text(true).unwrap();
        assert_eq!(cut, "two\n");
        assert_eq!(d.text(), "one\nthree\n");
        assert_eq!((d.line, d.col), (2, 3));
    }

    #[test]
    fn selection_cut_lands_at_span_start() {
        let mut d = Document::from_str("abcdef");
        d.move_to(d.buffer().pos_at(1).unwrap());
        d.set_mark();
        d.move_to(d.buffer().pos_at(4).unwrap());
        let cut = d.copy_delete_text(true).unwrap();
        assert_eq!(cut, "bcd");
        assert_eq!(d.text(), "aef");
        assert_eq!(d.position.get(), 1);
        assert!(d.selection_span().is_none());
    }

    #[test]
    fn line_paste_inserts_at_line_start() {
        let mut d = Document::from_str("one\nthree\n");
        d.move_to_line_col(2, 3);
        d.paste_text("two\n");
        assert_eq!(d.text(), "one\ntwo\nthree\n");
        assert_eq!((d.line, d.col), (3, 3)); // cursor followed its text
    }

    #[test]
    fn inline_paste_inserts_at_cursor() {
        let mut d = Document::from_str("ad");
        d.move_to(d.buffer().pos_at(1).unwrap());
        d.paste_text("bc");
        assert_eq!(d.text(), "abcd");
        assert_eq!(d.position.get(), 3);
    }
}
