//! Bounded most-recently-used edit-location history.
//!
//! Each entry is a (document, line) pair. Recording a location within
//! [`MERGE_WINDOW`] lines of an existing entry for the same document counts
//! as the same edit: the entry absorbs the new line and moves to the MRU
//! end. Back/forward navigation walks a cursor over the list, skipping
//! entries that are the same place the caller already is.

use crate::DocId;

pub const HISTORY_CAP: usize = 10;
pub const MERGE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub doc: DocId,
    pub line: usize,
}

fn same_edit(a: Location, b: Location) -> bool {
    a.doc == b.doc && a.line.abs_diff(b.line) <= MERGE_WINDOW
}

#[derive(Default)]
pub struct LocationHistory {
    entries: Vec<Location>,
    /// Walk position; `entries.len()` means "at the live end".
    cursor: usize,
}

impl LocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note an edit at `loc`, merging with a nearby existing entry.
    pub fn record(&mut self, loc: Location) {
        if let Some(i) = self.entries.iter().position(|&e| same_edit(e, loc)) {
            self.entries.remove(i);
        }
        self.entries.push(loc);
        if self.entries.len() > HISTORY_CAP {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
    }

    /// Step back, skipping entries at the caller's current place.
    pub fn back(&mut self, current: Location) -> Option<Location> {
        while self.cursor > 0 {
            self.cursor -= 1;
            let e = self.entries[self.cursor];
            if !same_edit(e, current) {
                return Some(e);
            }
        }
        None
    }

    /// Step forward, skipping entries at the caller's current place.
    pub fn forward(&mut self, current: Location) -> Option<Location> {
        while self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            let e = self.entries[self.cursor];
            if !same_edit(e, current) {
                return Some(e);
            }
        }
        None
    }

    /// Drop every entry for a closed document.
    pub fn forget(&mut self, doc: DocId) {
        self.entries.retain(|e| e.doc != doc);
        self.cursor = self.cursor.min(self.entries.len());
    }
}
