//! Double-buffered screen grid with frame diffing.
//!
//! The renderer owns two full cell grids. Painters write the next frame into
//! `current`; [`Screen::present`] diffs it against `previous`, trims each row
//! to the minimal changed span, and emits only those spans through a
//! [`RenderSink`], grouping consecutive same-style cells into one write.
//! When many rows change at once a full rewrite is cheaper than many small
//! positioned writes, so the diff escalates past [`FULL_REDRAW_ROW_LIMIT`].
//!
//! Wide glyphs occupy their cell plus a continuation cell; emission skips
//! the continuation since the glyph itself advances the terminal cursor.

use anyhow::Result;
use crossterm::style::Color;
use tracing::trace;
use unicode_width::UnicodeWidthChar;

mod paint;
mod palette;

pub use paint::{paint_document, paint_status_row};
pub use palette::Palette;

/// Rows-changed threshold beyond which the whole frame is rewritten.
pub const FULL_REDRAW_ROW_LIMIT: usize = 8;

/// Marker occupying the second cell of a width-2 glyph.
const CONTINUATION: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// Output side of the renderer: positioned styled writes plus cursor
/// control. Implemented by the crossterm terminal and by capture sinks in
/// tests.
pub trait RenderSink {
    fn move_to(&mut self, row: u16, col: u16) -> Result<()>;
    fn write_run(&mut self, text: &str, style: Style) -> Result<()>;
    fn set_cursor(&mut self, row: u16, col: u16) -> Result<()>;
    fn show_cursor(&mut self, visible: bool) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

pub struct Screen {
    width: usize,
    height: usize,
    current: Vec<Cell>,
    previous: Vec<Cell>,
    /// Forces the next present to rewrite every row (set on resize).
    full_next: bool,
}

impl Screen {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            current: vec![Cell::default(); width * height],
            previous: vec![Cell::default(); width * height],
            full_next: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize both grids to blank cells and force a full rewrite.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.current = vec![Cell::default(); width * height];
        self.previous = vec![Cell::default(); width * height];
        self.full_next = true;
    }

    /// Blank the working frame.
    pub fn clear(&mut self) {
        self.current.fill(Cell::default());
    }

    /// Place one glyph. A width-2 glyph also claims the following cell as a
    /// continuation; glyphs that would straddle the right edge are dropped.
    pub fn put(&mut self, row: usize, col: usize, ch: char, style: Style) {
        if row >= self.height || col >= self.width {
            return;
        }
        let w = ch.width().unwrap_or(1);
        if w == 2 {
            if col + 1 >= self.width {
                return;
            }
            self.current[row * self.width + col] = Cell { ch, style };
            self.current[row * self.width + col + 1] = Cell {
                ch: CONTINUATION,
                style,
            };
        } else {
            self.current[row * self.width + col] = Cell { ch, style };
        }
    }

    /// Working-frame cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        debug_assert!(row < self.height && col < self.width);
        self.current[row * self.width + col]
    }

    /// Fill a row with styled blanks.
    pub fn fill_row(&mut self, row: usize, style: Style) {
        if row >= self.height {
            return;
        }
        let start = row * self.width;
        self.current[start..start + self.width].fill(Cell { ch: ' ', style });
    }

    /// Minimal changed span per row: `(row, first, last)` inclusive columns.
    /// Spans never start on a continuation cell.
    pub fn diff_rows(&self) -> Vec<(usize, usize, usize)> {
        let mut out = Vec::new();
        for row in 0..self.height {
            let base = row * self.width;
            let cur = &self.current[base..base + self.width];
            let prev = &self.previous[base..base + self.width];
            let mut first = 0;
            while first < self.width && cur[first] == prev[first] {
                first += 1;
            }
            if first == self.width {
                continue;
            }
            let mut last = self.width - 1;
            while last > first && cur[last] == prev[last] {
                last -= 1;
            }
            while first > 0 && cur[first].ch == CONTINUATION {
                first -= 1;
            }
            out.push((row, first, last));
        }
        out
    }

    /// Emit the frame: changed spans (or everything when forced or past the
    /// escalation limit), color-run-length-encoded, cursor positioned last.
    /// The working frame becomes the previous frame.
    pub fn present(&mut self, sink: &mut dyn RenderSink, cursor: (u16, u16)) -> Result<()> {
        let spans = if self.full_next {
            (0..self.height)
                .map(|r| (r, 0, self.width.saturating_sub(1)))
                .collect()
        } else {
            let diff = self.diff_rows();
            if diff.len() > FULL_REDRAW_ROW_LIMIT {
                (0..self.height)
                    .map(|r| (r, 0, self.width.saturating_sub(1)))
                    .collect()
            } else {
                diff
            }
        };
        trace!(target: "render", rows = spans.len(), full = self.full_next, "present");
        for &(row, first, last) in &spans {
            self.emit_span(sink, row, first, last)?;
        }
        sink.set_cursor(cursor.0, cursor.1)?;
        sink.show_cursor(true)?;
        sink.flush()?;
        self.previous.copy_from_slice(&self.current);
        self.full_next = false;
        Ok(())
    }

    fn emit_span(
        &self,
        sink: &mut dyn RenderSink,
        row: usize,
        first: usize,
        last: usize,
    ) -> Result<()> {
        sink.move_to(row as u16, first as u16)?;
        let base = row * self.width;
        let mut run = String::new();
        let mut run_style = self.current[base + first].style;
        for col in first..=last {
            let cell = self.current[base + col];
            if cell.ch == CONTINUATION {
                continue;
            }
            if cell.style != run_style && !run.is_empty() {
                sink.write_run(&run, run_style)?;
                run.clear();
            }
            run_style = cell.style;
            run.push(cell.ch);
        }
        if !run.is_empty() {
            sink.write_run(&run, run_style)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::capture::{CaptureSink, Op};
    use super::*;
    use pretty_assertions::assert_eq;

    fn settled(width: usize, height: usize) -> Screen {
        // A screen whose first (forced-full) frame has already been emitted.
        let mut s = Screen::new(width, height);
        let mut sink = CaptureSink::default();
        s.present(&mut sink, (0, 0)).unwrap();
        s
    }

    #[test]
    fn single_row_change_diffs_minimally() {
        let mut s = settled(20, 5);
        let style = Style::default();
        s.put(2, 4, 'a', style);
        s.put(2, 5, 'b', style);
        let diff = s.diff_rows();
        assert_eq!(diff, vec![(2, 4, 5)]);
    }

    #[test]
    fn unchanged_frame_emits_no_writes() {
        let mut s = settled(10, 3);
        let mut sink = CaptureSink::default();
        s.present(&mut sink, (1, 1)).unwrap();
        assert_eq!(
            sink.ops,
            vec![Op::Cursor(1, 1), Op::Show(true), Op::Flush]
        );
    }

    #[test]
    fn runs_group_by_style() {
        let mut s = settled(10, 1);
        let red = Style {
            fg: Color::Red,
            bg: Color::Reset,
        };
        s.put(0, 0, 'a', Style::default());
        s.put(0, 1, 'b', Style::default());
        s.put(0, 2, 'c', red);
        let mut sink = CaptureSink::default();
        s.present(&mut sink, (0, 0)).unwrap();
        assert_eq!(
            &sink.ops[..3],
            &[
                Op::MoveTo(0, 0),
                Op::Write("ab".into(), Style::default()),
                Op::Write("c".into(), red),
            ]
        );
    }

    #[test]
    fn many_changed_rows_escalate_to_full_rewrite() {
        let mut s = settled(4, FULL_REDRAW_ROW_LIMIT + 3);
        for row in 0..FULL_REDRAW_ROW_LIMIT + 1 {
            s.put(row, 0, 'x', Style::default());
        }
        let mut sink = CaptureSink::default();
        s.present(&mut sink, (0, 0)).unwrap();
        let moves = sink
            .ops
            .iter()
            .filter(|o| matches!(o, Op::MoveTo(..)))
            .count();
        assert_eq!(moves, FULL_REDRAW_ROW_LIMIT + 3); // every row rewritten
    }

    #[test]
    fn wide_glyph_claims_continuation_cell() {
        let mut s = settled(6, 1);
        s.put(0, 1, '你', Style::default());
        let diff = s.diff_rows();
        assert_eq!(diff, vec![(0, 1, 2)]);
        let mut sink = CaptureSink::default();
        s.present(&mut sink, (0, 0)).unwrap();
        assert_eq!(
            sink.ops[1],
            Op::Write("你".into(), Style::default())
        );
    }

    #[test]
    fn resize_forces_full_rewrite() {
        let mut s = settled(5, 2);
        s.resize(5, 2);
        let mut sink = CaptureSink::default();
        s.present(&mut sink, (0, 0)).unwrap();
        let moves = sink
            .ops
            .iter()
            .filter(|o| matches!(o, Op::MoveTo(..)))
            .count();
        assert_eq!(moves, 2);
    }
}
