//! Word and whitespace-run boundary predicates and the scans built on them.
//!
//! A boundary is a property of two *consecutive* codepoints; the scans walk
//! the buffer one codepoint at a time applying the predicate to each adjacent
//! pair. These drive move-word / delete-word and the coarser
//! move-to-end-of-whitespace-run operations.

use crate::{Buffer, Pos};

/// Word characters: alphanumerics, underscore, and the editor-specific
/// hyphen/apostrophe (so `well-known` and `don't` navigate as single words).
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '\''
}

/// True when a word boundary lies between `prev` and `next`.
pub fn is_word_boundary(prev: char, next: char) -> bool {
    if next == '\n' {
        return true;
    }
    if !is_word_char(prev) && is_word_char(next) {
        return true;
    }
    (is_word_char(prev) || prev == ' ') && !is_word_char(next) && next != ' '
}

/// True when a space-run boundary lies between `prev` and `next`: the end of
/// a run of spaces.
pub fn is_run_boundary(prev: char, next: char) -> bool {
    prev == ' ' && next != ' '
}

impl Buffer {
    /// Next position `q > pos` with a word boundary between `q-1` and `q`,
    /// or the buffer end.
    pub fn next_word_boundary(&self, pos: Pos) -> Pos {
        self.scan_forward(pos, is_word_boundary)
    }

    /// Previous position `q < pos` with a word boundary between `q-1` and
    /// `q`, or the buffer start.
    pub fn prev_word_boundary(&self, pos: Pos) -> Pos {
        self.scan_back(pos, is_word_boundary)
    }

    /// Next space-run boundary after `pos`, or the buffer end.
    pub fn next_run_boundary(&self, pos: Pos) -> Pos {
        self.scan_forward(pos, is_run_boundary)
    }

    /// Previous space-run boundary before `pos`, or the buffer start.
    pub fn prev_run_boundary(&self, pos: Pos) -> Pos {
        self.scan_back(pos, is_run_boundary)
    }

    fn scan_forward(&self, pos: Pos, pred: fn(char, char) -> bool) -> Pos {
        let mut q = match self.step_forward(pos) {
            Some(n) => n,
            None => return pos,
        };
        loop {
            let next = match self.char_at(q) {
                Some(c) => c,
                None => return q, // buffer end
            };
            let prev = self.char_before(q).expect("q > 0 by construction");
            if pred(prev, next) {
                return q;
            }
            q = self.step_forward(q).expect("char_at(q) was Some");
        }
    }

    fn scan_back(&self, pos: Pos, pred: fn(char, char) -> bool) -> Pos {
        let mut q = match self.step_back(pos) {
            Some(p) => p,
            None => return pos,
        };
        while q > Pos::ZERO {
            let next = self.char_at(q).expect("q < end by construction");
            let prev = self.char_before(q).expect("q > 0");
            if pred(prev, next) {
                return q;
            }
            q = self.step_back(q).expect("q > 0");
        }
        q
    }
}
