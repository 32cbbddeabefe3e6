//! Circular search, replace-under-cursor, bulk replace, and the word scans
//! backing autocomplete.

use crate::Document;
use core_text::{Anchor, Pos, boundary::is_word_char};
use tracing::debug;

/// Result of a single [`Document::replace`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Whether the match under the cursor was substituted.
    pub substituted: bool,
    /// Whether another match was found (and moved to) afterwards.
    pub next_found: bool,
}

impl Document {
    /// Circular forward search. Starts at the cursor, or one codepoint past
    /// it with `from_next` (so repeated finds advance); wraps to the buffer
    /// start when the tail holds no match. Moves the cursor on success.
    pub fn find(&mut self, pat: &str, case_sensitive: bool, from_next: bool) -> bool {
        if pat.is_empty() {
            return false;
        }
        let start = if from_next {
            self.buf.step_forward(self.position).unwrap_or(self.buf.end())
        } else {
            self.position
        };
        let hit = self
            .buf
            .find_from(pat, case_sensitive, start)
            .or_else(|| self.buf.find_from(pat, case_sensitive, Pos::ZERO));
        match hit {
            Some(p) => {
                self.place_cursor(p, false);
                true
            }
            None => false,
        }
    }

    /// Length in bytes of a match of `pat` at the cursor, if one sits there.
    fn match_len_at_cursor(&self, pat: &str, case_sensitive: bool) -> Option<usize> {
        if case_sensitive {
            let end = self.buf.pos_at(
                (self.position.get() + pat.len()).min(self.buf.len()),
            );
            match end {
                Ok(end) if self.buf.slice(self.position, end) == pat => Some(pat.len()),
                _ => None,
            }
        } else {
            let mut want = pat.chars().flat_map(|c| c.to_lowercase());
            let mut p = self.position;
            loop {
                let Some(next_want) = want.next() else {
                    return Some(p.get() - self.position.get());
                };
                let c = self.buf.char_at(p)?;
                let mut folded = c.to_lowercase();
                if folded.next() != Some(next_want) {
                    return None;
                }
                for extra in folded {
                    if want.next() != Some(extra) {
                        return None;
                    }
                }
                p = self.buf.step_forward(p)?;
            }
        }
    }

    /// Substitute the match under the cursor (if any), then advance to and
    /// report the next match.
    pub fn replace(&mut self, pat: &str, repl: &str, case_sensitive: bool) -> ReplaceOutcome {
        let substituted = match self.match_len_at_cursor(pat, case_sensitive) {
            Some(len) => {
                let start = self.position;
                let end = self
                    .buf
                    .pos_at(start.get() + len)
                    .expect("match end is a boundary");
                let valid = self.anchor_at(start);
                self.buf.remove(start, end);
                self.buf.insert(start, repl);
                self.note_edit(start);
                let after = self
                    .buf
                    .pos_at(start.get() + repl.len())
                    .expect("insertion end is a boundary");
                self.place_cursor_after_edit(after, valid);
                true
            }
            None => false,
        };
        let next_found = self.find(pat, case_sensitive, false);
        ReplaceOutcome {
            substituted,
            next_found,
        }
    }

    /// Replace every occurrence in the buffer. Marks the document modified
    /// and drops the cached viewport position unconditionally, even when
    /// nothing matched; the cursor's line/column are rebuilt from scratch
    /// since every position after the first match may have shifted.
    pub fn replace_all(&mut self, pat: &str, repl: &str, case_sensitive: bool) -> usize {
        let count = self.buf.replace_all(pat, repl, case_sensitive);
        debug!(target: "doc", count, "replace_all");
        self.modified = true;
        self.top_pos = None;
        self.selection_mode = false;
        self.selection_anchor = None;
        let mut off = self.position.get().min(self.buf.len());
        let pos = loop {
            match self.buf.pos_at(off) {
                Ok(p) => break p,
                Err(_) => off -= 1,
            }
        };
        let lc = self.buf.pos_to_line_col(Anchor::ORIGIN, pos);
        self.position = pos;
        self.line = lc.line;
        self.col = lc.col;
        self.preferred_col = lc.col;
        count
    }

    // ------------------------------------------------------------------
    // Autocomplete helpers
    // ------------------------------------------------------------------

    /// Start of the word run touching the cursor from the left.
    fn word_start(&self) -> Pos {
        let mut p = self.position;
        while let Some(c) = self.buf.char_before(p) {
            if !is_word_char(c) {
                break;
            }
            p = self.buf.step_back(p).expect("char_before was Some");
        }
        p
    }

    /// End of the word run touching the cursor from the right.
    fn word_end(&self) -> Pos {
        let mut p = self.position;
        while let Some(c) = self.buf.char_at(p) {
            if !is_word_char(c) {
                break;
            }
            p = self.buf.step_forward(p).expect("char_at was Some");
        }
        p
    }

    /// The whole word under the cursor, empty if the cursor touches none.
    pub fn current_word(&self) -> String {
        self.buf.slice(self.word_start(), self.word_end())
    }

    /// The word characters strictly before the cursor: the prefix a
    /// completion must extend.
    pub fn autocomplete_prefix(&self) -> String {
        self.buf.slice(self.word_start(), self.position)
    }

    /// Replace the remainder of the word at the cursor with `suffix` and
    /// advance past it.
    pub fn complete_word(&mut self, suffix: &str) {
        let end = self.word_end();
        let start = self.position;
        let valid = self.anchor_at(start);
        self.buf.remove(start, end);
        self.buf.insert(start, suffix);
        self.note_edit(start);
        let after = self
            .buf
            .pos_at(start.get() + suffix.len())
            .expect("insertion end is a boundary");
        self.place_cursor_after_edit(after, valid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_advances_and_wraps() {
        let mut d = Document::from_str("abcabc");
        assert!(d.find("b", true, true));
        assert_eq!(d.position.get(), 1);
        assert!(d.find("b", true, true));
        assert_eq!(d.position.get(), 4);
        assert!(d.find("b", true, true));
        assert_eq!(d.position.get(), 1); // wrapped
    }

    #[test]
    fn find_without_next_matches_in_place() {
        let mut d = Document::from_str("xay");
        d.move_to(d.buffer().pos_at(1).unwrap());
        assert!(d.find("a", true, false));
        assert_eq!(d.position.get(), 1);
    }

    #[test]
    fn find_case_insensitive() {
        let mut d = Document::from_str("xx AbC yy");
        assert!(d.find("abc", false, false));
        assert_eq!(d.position.get(), 3);
        assert!(!d.find("abc", true, false));
    }

    #[test]
    fn find_wraps_from_last_occurrence() {
        let mut d = Document::from_str("x..x");
        d.move_to(d.buffer().pos_at(3).unwrap());
        assert!(d.find("x", true, true));
        assert_eq!(d.position.get(), 0);
    }

    #[test]
    fn replace_only_substitutes_on_a_match() {
        let mut d = Document::from_str("aa ba");
        // Cursor not on a match: no substitution, but advances to one.
        d.move_to(d.buffer().pos_at(2).unwrap());
        let out = d.replace("aa", "z", true);
        assert!(!out.substituted);
        assert!(!out.next_found || d.text() == "aa ba"); // text unchanged
        // Move onto the match and substitute.
        d.move_to(Pos::ZERO);
        let out = d.replace("aa", "z", true);
        assert!(out.substituted);
        assert_eq!(d.text(), "z ba");
    }

    #[test]
    fn replace_reports_next_match() {
        let mut d = Document::from_str("ab ab");
        let out = d.replace("ab", "cd", true);
        assert!(out.substituted);
        assert!(out.next_found);
        assert_eq!(d.text(), "cd ab");
        assert_eq!(d.position.get(), 3);
    }

    #[test]
    fn replace_all_is_unconditionally_modifying() {
        let mut d = Document::from_str("aaa");
        d.top_pos = Some(Pos::ZERO);
        assert_eq!(d.replace_all("a", "a", true), 3);
        assert_eq!(d.text(), "aaa");
        // Even a no-op replace marks the document and drops the cache.
        assert!(d.modified);
        assert!(d.top_pos.is_none());

        let mut d = Document::from_str("xyz");
        assert_eq!(d.replace_all("q", "r", true), 0);
        assert!(d.modified);
    }

    #[test]
    fn replace_all_reclamps_cursor() {
        let mut d = Document::from_str("longword end");
        d.move_to_line_end();
        d.replace_all("longword", "s", true);
        assert_eq!(d.text(), "s end");
        assert!(d.position.get() <= d.buffer().len());
        assert_eq!(d.line, 1);
    }

    #[test]
    fn word_helpers_scan_both_ways() {
        let mut d = Document::from_str("foo barbaz qux");
        d.move_to(d.buffer().pos_at(7).unwrap()); // inside "barbaz"
        assert_eq!(d.current_word(), "barbaz");
        assert_eq!(d.autocomplete_prefix(), "bar");
        d.complete_word("rier");
        assert_eq!(d.text(), "foo barrier qux");
        assert_eq!(d.position.get(), 11);
    }
}
