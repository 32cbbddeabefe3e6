//! Terminal backend abstraction and crossterm implementation.
//!
//! The terminal is both the renderer's output (it implements
//! [`RenderSink`]) and the editor's input source. Input arrives through
//! [`CrosstermTerminal::read_event_batch`]: one blocking read, then a
//! non-blocking drain of whatever else is already queued. That blocking read
//! is the application's single suspension point.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::{Stdout, Write, stdout};
use std::time::Duration;
use tracing::trace;

use core_events::{InputEvent, Key, KeyChord, Modifiers, PointerButton, PointerKind};
use core_render::{RenderSink, Style};

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
}

pub struct CrosstermTerminal {
    out: Stdout,
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller
/// early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermTerminal,
    active: bool,
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            entered: false,
        }
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }

    /// One blocking read, then drain everything already pending. Key
    /// releases and repeats are folded out here; callers only ever see
    /// presses.
    pub fn read_event_batch(&mut self) -> Result<Vec<InputEvent>> {
        let mut batch = Vec::new();
        if let Some(e) = translate(event::read()?) {
            batch.push(e);
        }
        while event::poll(Duration::ZERO)? {
            if let Some(e) = translate(event::read()?) {
                batch.push(e);
            }
        }
        trace!(target: "render", events = batch.len(), "input batch");
        Ok(batch)
    }
}

fn translate_mods(m: KeyModifiers) -> Modifiers {
    let mut mods = Modifiers::empty();
    if m.contains(KeyModifiers::SHIFT) {
        mods |= Modifiers::SHIFT;
    }
    if m.contains(KeyModifiers::CONTROL) {
        mods |= Modifiers::CTRL;
    }
    if m.contains(KeyModifiers::ALT) {
        mods |= Modifiers::ALT;
    }
    mods
}

fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(k) => {
            if k.kind != KeyEventKind::Press {
                return None;
            }
            let key = match k.code {
                KeyCode::Char(c) => Key::Char(c),
                KeyCode::Enter => Key::Enter,
                KeyCode::Esc => Key::Esc,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Delete => Key::Delete,
                KeyCode::Tab | KeyCode::BackTab => Key::Tab,
                KeyCode::Left => Key::Left,
                KeyCode::Right => Key::Right,
                KeyCode::Up => Key::Up,
                KeyCode::Down => Key::Down,
                KeyCode::Home => Key::Home,
                KeyCode::End => Key::End,
                KeyCode::PageUp => Key::PageUp,
                KeyCode::PageDown => Key::PageDown,
                KeyCode::F(n) => Key::F(n),
                _ => return None,
            };
            let mut mods = translate_mods(k.modifiers);
            if k.code == KeyCode::BackTab {
                mods |= Modifiers::SHIFT;
            }
            // Printable characters already encode shift.
            if let Key::Char(_) = key {
                mods -= Modifiers::SHIFT;
            }
            Some(InputEvent::Key {
                chord: KeyChord::new(mods, key),
            })
        }
        Event::Mouse(m) => {
            let (button, kind) = match m.kind {
                MouseEventKind::Down(b) => (translate_button(b)?, PointerKind::Down),
                MouseEventKind::Up(b) => (translate_button(b)?, PointerKind::Up),
                MouseEventKind::Drag(b) => (translate_button(b)?, PointerKind::Drag),
                MouseEventKind::ScrollDown => return Some(InputEvent::Wheel { delta: 1 }),
                MouseEventKind::ScrollUp => return Some(InputEvent::Wheel { delta: -1 }),
                _ => return None,
            };
            Some(InputEvent::Pointer {
                button,
                x: m.column,
                y: m.row,
                kind,
            })
        }
        Event::Resize(w, h) => Some(InputEvent::Resize {
            width: w,
            height: h,
        }),
        _ => None,
    }
}

fn translate_button(b: MouseButton) -> Option<PointerButton> {
    match b {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
    }
}

impl TerminalBackend for CrosstermTerminal {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(self.out, EnterAlternateScreen, Hide)?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(self.out, LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(self.out, SetTitle(title))?;
        Ok(())
    }
}

impl RenderSink for CrosstermTerminal {
    fn move_to(&mut self, row: u16, col: u16) -> Result<()> {
        queue!(self.out, MoveTo(col, row))?;
        Ok(())
    }

    fn write_run(&mut self, text: &str, style: Style) -> Result<()> {
        queue!(
            self.out,
            SetForegroundColor(style.fg),
            SetBackgroundColor(style.bg),
            Print(text)
        )?;
        Ok(())
    }

    fn set_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        queue!(self.out, MoveTo(col, row))?;
        Ok(())
    }

    fn show_cursor(&mut self, visible: bool) -> Result<()> {
        if visible {
            queue!(self.out, Show)?;
        } else {
            queue!(self.out, Hide)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl<'a> TerminalGuard<'a> {
    /// Access the backend while the guard keeps the terminal entered.
    pub fn backend_mut(&mut self) -> &mut CrosstermTerminal {
        self.backend
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn key_presses_translate_and_releases_drop() {
        let press = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(translate(press), Some(InputEvent::ch('a')));
        let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(translate(Event::Key(release)), None);
    }

    #[test]
    fn shift_is_stripped_from_printable_keys() {
        let e = Event::Key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert_eq!(translate(e), Some(InputEvent::ch('A')));
        let e = Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(
            translate(e),
            Some(InputEvent::key(Modifiers::SHIFT, Key::Left))
        );
    }

    #[test]
    fn wheel_and_resize_pass_through() {
        assert_eq!(
            translate(Event::Resize(80, 24)),
            Some(InputEvent::Resize {
                width: 80,
                height: 24
            })
        );
    }
}
