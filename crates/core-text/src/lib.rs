//! Rope-based text buffer addressed by validated byte offsets.
//!
//! A [`Pos`] is an offset into the buffer's UTF-8 storage, measured in bytes,
//! never in codepoints. The invariant is that a `Pos` obtained from this
//! crate's API always lands on a `char` boundary; stepping decodes exactly one
//! codepoint at a time. There is no persistent line index; line/column
//! conversions walk the buffer incrementally from a caller-supplied anchor
//! (see [`coords`]).

use anyhow::{Result, bail};
use ropey::Rope;

pub mod boundary;
pub mod coords;

pub use coords::{Anchor, LineCol};

/// Column multiple a tab character advances to (columns are 1-based, so a tab
/// in column 1 lands in column `TAB_SIZE + 1`).
pub const TAB_SIZE: usize = 4;

/// A byte offset into a [`Buffer`], guaranteed on a `char` boundary when
/// produced by this crate. The inner offset is deliberately private; callers
/// move through the stepping and scanning APIs rather than doing arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos(usize);

impl Pos {
    /// Offset 0, valid for every buffer.
    pub const ZERO: Pos = Pos(0);

    /// Raw byte offset, for display and for interop with search results.
    pub fn get(self) -> usize {
        self.0
    }
}

/// UTF-8 text storage backed by a `ropey::Rope`.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    pub fn from_str(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// One-past-the-last-byte position.
    pub fn end(&self) -> Pos {
        Pos(self.rope.len_bytes())
    }

    /// Validate a raw byte offset into a `Pos`. Fails when the offset is out
    /// of range or falls inside a multi-byte sequence.
    pub fn pos_at(&self, offset: usize) -> Result<Pos> {
        if offset > self.rope.len_bytes() {
            bail!("offset {offset} past end of buffer ({})", self.rope.len_bytes());
        }
        let ch = self.rope.byte_to_char(offset);
        if self.rope.char_to_byte(ch) != offset {
            bail!("offset {offset} is not on a codepoint boundary");
        }
        Ok(Pos(offset))
    }

    /// Codepoint starting at `pos`, or `None` at the end of the buffer.
    pub fn char_at(&self, pos: Pos) -> Option<char> {
        if pos.0 >= self.rope.len_bytes() {
            return None;
        }
        Some(self.rope.char(self.rope.byte_to_char(pos.0)))
    }

    /// Codepoint ending at `pos`, or `None` at the start of the buffer.
    pub fn char_before(&self, pos: Pos) -> Option<char> {
        if pos.0 == 0 {
            return None;
        }
        Some(self.rope.char(self.rope.byte_to_char(pos.0) - 1))
    }

    /// Step forward over exactly one codepoint. `None` at buffer end.
    pub fn step_forward(&self, pos: Pos) -> Option<Pos> {
        let c = self.char_at(pos)?;
        Some(Pos(pos.0 + c.len_utf8()))
    }

    /// Step backward over exactly one codepoint. `None` at buffer start.
    pub fn step_back(&self, pos: Pos) -> Option<Pos> {
        let c = self.char_before(pos)?;
        Some(Pos(pos.0 - c.len_utf8()))
    }

    /// Owned copy of the byte range `[start, end)`.
    pub fn slice(&self, start: Pos, end: Pos) -> String {
        debug_assert!(start <= end);
        if start >= end {
            return String::new();
        }
        let s = self.rope.byte_to_char(start.0);
        let e = self.rope.byte_to_char(end.0);
        self.rope.slice(s..e).to_string()
    }

    /// Insert `text` at `pos`; positions at or after `pos` shift right by
    /// `text.len()` bytes.
    pub fn insert(&mut self, pos: Pos, text: &str) {
        let at = self.rope.byte_to_char(pos.0);
        self.rope.insert(at, text);
    }

    /// Remove the byte range `[start, end)`, returning the removed text.
    pub fn remove(&mut self, start: Pos, end: Pos) -> String {
        debug_assert!(start <= end);
        if start >= end {
            return String::new();
        }
        let s = self.rope.byte_to_char(start.0);
        let e = self.rope.byte_to_char(end.0);
        let removed = self.rope.slice(s..e).to_string();
        self.rope.remove(s..e);
        removed
    }

    /// Replace the whole buffer content.
    pub fn set_text(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
    }

    /// Find the next occurrence of `pat` at or after `from`, without
    /// wrapping. Returns the match start. `pat` must be non-empty.
    pub fn find_from(&self, pat: &str, case_sensitive: bool, from: Pos) -> Option<Pos> {
        if pat.is_empty() || from.0 >= self.rope.len_bytes() {
            return None;
        }
        let hay = self.slice(from, self.end());
        let at = if case_sensitive {
            hay.find(pat)
        } else {
            // Lowercasing can change byte lengths for some scripts; map the
            // match back through a char-wise scan instead of trusting offsets
            // from the folded string.
            find_case_insensitive(&hay, pat)
        };
        at.map(|off| Pos(from.0 + off))
    }

    /// Replace every occurrence of `pat` with `repl`, returning the number of
    /// substitutions. Non-overlapping, left to right.
    pub fn replace_all(&mut self, pat: &str, repl: &str, case_sensitive: bool) -> usize {
        if pat.is_empty() {
            return 0;
        }
        let text = self.rope.to_string();
        let mut out = String::with_capacity(text.len());
        let mut count = 0;
        let mut rest = text.as_str();
        loop {
            let at = if case_sensitive {
                rest.find(pat)
            } else {
                find_case_insensitive(rest, pat)
            };
            match at {
                Some(off) => {
                    let matched_len = if case_sensitive {
                        pat.len()
                    } else {
                        matched_len_at(rest, off, pat)
                    };
                    out.push_str(&rest[..off]);
                    out.push_str(repl);
                    rest = &rest[off + matched_len..];
                    count += 1;
                }
                None => {
                    out.push_str(rest);
                    break;
                }
            }
        }
        if count > 0 {
            self.rope = Rope::from_str(&out);
        }
        count
    }
}

impl std::fmt::Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rope)
    }
}

/// Byte offset of the first case-insensitive occurrence of `pat` in `hay`.
fn find_case_insensitive(hay: &str, pat: &str) -> Option<usize> {
    let pat_chars: Vec<char> = pat.chars().flat_map(|c| c.to_lowercase()).collect();
    if pat_chars.is_empty() {
        return None;
    }
    let mut starts = hay.char_indices();
    loop {
        let (start, _) = starts.clone().next()?;
        let mut h = hay[start..].chars().flat_map(|c| c.to_lowercase());
        if pat_chars.iter().all(|&p| h.next() == Some(p)) {
            return Some(start);
        }
        starts.next();
    }
}

/// Length in bytes of the text at `off` that case-insensitively matches `pat`.
fn matched_len_at(hay: &str, off: usize, pat: &str) -> usize {
    let want = pat.chars().flat_map(|c| c.to_lowercase()).count();
    let mut folded = 0;
    let mut len = 0;
    for c in hay[off..].chars() {
        if folded >= want {
            break;
        }
        folded += c.to_lowercase().count();
        len += c.len_utf8();
    }
    len
}
