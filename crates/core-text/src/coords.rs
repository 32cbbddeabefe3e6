//! Incremental offset ↔ (line, column) conversion.
//!
//! The buffer keeps no line index, so every conversion walks codepoint by
//! codepoint from an [`Anchor`], a position whose line and column are already
//! known (typically the cursor or the viewport top). Local cursor movement
//! therefore costs proportional to the distance moved, not the file size.
//!
//! Lines and columns are 1-based. A tab advances the column to the next
//! multiple of [`TAB_SIZE`] plus one; every other codepoint advances it by
//! one.

use crate::{Buffer, Pos, TAB_SIZE};

/// A 1-based (line, column) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// A position with its known line/column, used as the walk origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub pos: Pos,
    pub line: usize,
    pub col: usize,
}

impl Anchor {
    /// The start of any buffer: offset 0, line 1, column 1.
    pub const ORIGIN: Anchor = Anchor {
        pos: Pos::ZERO,
        line: 1,
        col: 1,
    };

    pub fn new(pos: Pos, line: usize, col: usize) -> Self {
        debug_assert!(line >= 1 && col >= 1);
        Self { pos, line, col }
    }
}

/// Column after placing a character in column `col`.
pub fn advance_col(col: usize, c: char) -> usize {
    if c == '\t' {
        // Round up to the next tab stop: col 1..=4 -> 5, 5..=8 -> 9, ...
        col + TAB_SIZE - ((col - 1) % TAB_SIZE)
    } else {
        col + 1
    }
}

impl Buffer {
    /// Byte position of the start of the line containing `pos`.
    pub fn line_start(&self, pos: Pos) -> Pos {
        let mut p = pos;
        while let Some(prev) = self.step_back(p) {
            if self.char_at(prev) == Some('\n') {
                return p;
            }
            p = prev;
        }
        p
    }

    /// Byte position of the terminating `\n` of the line containing `pos`,
    /// or the buffer end for the last line.
    pub fn line_end(&self, pos: Pos) -> Pos {
        let mut p = pos;
        while let Some(c) = self.char_at(p) {
            if c == '\n' {
                return p;
            }
            p = self.step_forward(p).unwrap_or(p);
        }
        p
    }

    /// Line and column of `target`, walking from `anchor`.
    pub fn pos_to_line_col(&self, anchor: Anchor, target: Pos) -> LineCol {
        debug_assert!(target <= self.end());
        if target >= anchor.pos {
            let mut line = anchor.line;
            let mut col = anchor.col;
            let mut p = anchor.pos;
            while p < target {
                let c = self.char_at(p).unwrap_or('\n');
                if c == '\n' {
                    line += 1;
                    col = 1;
                } else {
                    col = advance_col(col, c);
                }
                p = match self.step_forward(p) {
                    Some(n) => n,
                    None => break,
                };
            }
            LineCol { line, col }
        } else {
            // Count newlines back to the target, then rebuild the column by a
            // forward walk from the target's line start (tab widths depend on
            // everything left of the target, so there is no pure backward
            // column arithmetic).
            let mut line = anchor.line;
            let mut p = anchor.pos;
            while p > target {
                p = self.step_back(p).expect("target below buffer start");
                if self.char_at(p) == Some('\n') {
                    line -= 1;
                }
            }
            let mut col = 1;
            let mut q = self.line_start(target);
            while q < target {
                let c = self.char_at(q).expect("walk inside buffer");
                col = advance_col(col, c);
                q = self.step_forward(q).expect("walk inside buffer");
            }
            LineCol { line, col }
        }
    }

    /// Position of (`target_line`, `target_col`), walking from `anchor`.
    ///
    /// Column overshoot on a short line clamps to that line's end; the
    /// returned anchor carries the actual line and column reached, which is
    /// what lets a sticky "preferred column" survive crossing short lines.
    pub fn line_col_to_pos(&self, anchor: Anchor, target_line: usize, target_col: usize) -> Anchor {
        debug_assert!(target_line >= 1 && target_col >= 1);
        let mut p;
        let mut line;
        if target_line >= anchor.line {
            p = self.line_start(anchor.pos);
            line = anchor.line;
            while line < target_line {
                match self.find_newline_forward(p) {
                    Some(nl) => {
                        p = self.step_forward(nl).expect("newline has a successor");
                        line += 1;
                    }
                    None => break, // fewer lines than requested: clamp to last
                }
            }
        } else {
            p = self.line_start(anchor.pos);
            line = anchor.line;
            while line > target_line {
                let before = match self.step_back(p) {
                    Some(b) => b,
                    None => break,
                };
                debug_assert_eq!(self.char_at(before), Some('\n'));
                p = self.line_start(before);
                line -= 1;
            }
        }
        // Walk forward within the line until the column reaches the target or
        // the line ends. A tab may carry the column past the target; the
        // reached column is reported back so callers can keep their sticky
        // preferred column.
        let mut col = 1;
        while col < target_col {
            match self.char_at(p) {
                Some('\n') | None => break,
                Some(c) => {
                    col = advance_col(col, c);
                    p = self.step_forward(p).expect("walk inside buffer");
                }
            }
        }
        Anchor { pos: p, line, col }
    }

    /// Position of the next `\n` at or after `from`, if any.
    pub fn find_newline_forward(&self, from: Pos) -> Option<Pos> {
        let mut p = from;
        while let Some(c) = self.char_at(p) {
            if c == '\n' {
                return Some(p);
            }
            p = self.step_forward(p)?;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lc(line: usize, col: usize) -> LineCol {
        LineCol { line, col }
    }

    #[test]
    fn forward_walk_counts_lines_and_columns() {
        let b = Buffer::from_str("ab\ncd\n");
        assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, b.pos_at(0).unwrap()), lc(1, 1));
        assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, b.pos_at(2).unwrap()), lc(1, 3));
        assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, b.pos_at(3).unwrap()), lc(2, 1));
        assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, b.pos_at(5).unwrap()), lc(2, 3));
        assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, b.end()), lc(3, 1));
    }

    #[test]
    fn tab_advances_to_next_stop() {
        // Column after k tabs is TAB_SIZE * k + 1.
        let b = Buffer::from_str("\t\t\t");
        for k in 0..=3 {
            let p = b.pos_at(k).unwrap();
            assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, p), lc(1, TAB_SIZE * k + 1));
        }
        // Tabs after partial content still round up.
        let b = Buffer::from_str("ab\tc");
        assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, b.pos_at(3).unwrap()), lc(1, 5));
        assert_eq!(b.pos_to_line_col(Anchor::ORIGIN, b.pos_at(4).unwrap()), lc(1, 6));
    }

    #[test]
    fn backward_walk_matches_forward_walk() {
        let b = Buffer::from_str("one\ttwo\nthree\nfour\t\tfive\n");
        let end_anchor = {
            let lc = b.pos_to_line_col(Anchor::ORIGIN, b.end());
            Anchor::new(b.end(), lc.line, lc.col)
        };
        let mut p = Pos::ZERO;
        loop {
            let fwd = b.pos_to_line_col(Anchor::ORIGIN, p);
            let back = b.pos_to_line_col(end_anchor, p);
            assert_eq!(fwd, back, "at offset {}", p.get());
            match b.step_forward(p) {
                Some(n) => p = n,
                None => break,
            }
        }
    }

    #[test]
    fn round_trip_for_every_position() {
        let b = Buffer::from_str("alpha\n\tbeta é\n\nlong line with\ttabs\t!\n");
        let mut p = Pos::ZERO;
        loop {
            let lc = b.pos_to_line_col(Anchor::ORIGIN, p);
            let back = b.line_col_to_pos(Anchor::ORIGIN, lc.line, lc.col);
            assert_eq!(back.pos, p, "round trip at offset {}", p.get());
            assert_eq!(back.line, lc.line);
            assert_eq!(back.col, lc.col);
            match b.step_forward(p) {
                Some(n) => p = n,
                None => break,
            }
        }
    }

    #[test]
    fn short_line_clamps_column() {
        let b = Buffer::from_str("a\nlonger\n");
        let got = b.line_col_to_pos(Anchor::ORIGIN, 1, 6);
        assert_eq!(got.pos, b.pos_at(1).unwrap()); // end of "a"
        assert_eq!(got.col, 2);
        let got = b.line_col_to_pos(Anchor::ORIGIN, 2, 6);
        assert_eq!(got.pos, b.pos_at(7).unwrap());
        assert_eq!(got.col, 6);
    }

    #[test]
    fn backward_line_walk_from_mid_buffer_anchor() {
        let b = Buffer::from_str("aa\nbb\ncc\ndd\n");
        let anchor = {
            let p = b.pos_at(7).unwrap(); // inside "cc"
            Anchor::new(p, 3, 2)
        };
        let got = b.line_col_to_pos(anchor, 1, 2);
        assert_eq!(got.pos, b.pos_at(1).unwrap());
        assert_eq!((got.line, got.col), (1, 2));
        let got = b.line_col_to_pos(anchor, 4, 1);
        assert_eq!(got.pos, b.pos_at(9).unwrap());
    }

    #[test]
    fn target_line_past_end_clamps_to_last_line() {
        let b = Buffer::from_str("aa\nbb");
        let got = b.line_col_to_pos(Anchor::ORIGIN, 99, 1);
        assert_eq!(got.line, 2);
        assert_eq!(got.pos, b.pos_at(3).unwrap());
    }
}
