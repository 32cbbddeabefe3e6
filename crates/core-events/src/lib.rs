//! Input event model consumed by the editor's dispatch loop.
//!
//! Dispatch is a flat lookup over [`KeyChord`] values (a modifier set plus a
//! key), not a modal grammar. Pointer, wheel and resize events ride the same
//! enum so a recorded macro can replay any of them through the same path.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// A logical key. Printable input arrives as `Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

/// Dispatch-table key: one modifier combination plus one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub mods: Modifiers,
    pub key: Key,
}

impl KeyChord {
    pub fn new(mods: Modifiers, key: Key) -> Self {
        Self { mods, key }
    }

    pub fn plain(key: Key) -> Self {
        Self {
            mods: Modifiers::empty(),
            key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Up,
    Drag,
}

/// One input event delivered by the console collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key { chord: KeyChord },
    Pointer { button: PointerButton, x: u16, y: u16, kind: PointerKind },
    /// Positive delta scrolls down, negative up.
    Wheel { delta: i16 },
    Resize { width: u16, height: u16 },
}

impl InputEvent {
    pub fn key(mods: Modifiers, key: Key) -> Self {
        InputEvent::Key {
            chord: KeyChord::new(mods, key),
        }
    }

    pub fn ch(c: char) -> Self {
        InputEvent::Key {
            chord: KeyChord::plain(Key::Char(c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chords_are_hashable_lookup_keys() {
        use std::collections::HashMap;
        let mut table: HashMap<KeyChord, &str> = HashMap::new();
        table.insert(KeyChord::new(Modifiers::CTRL, Key::Char('s')), "save");
        table.insert(KeyChord::plain(Key::Enter), "newline");
        assert_eq!(
            table.get(&KeyChord::new(Modifiers::CTRL, Key::Char('s'))),
            Some(&"save")
        );
        assert_eq!(table.get(&KeyChord::plain(Key::Enter)), Some(&"newline"));
        assert_eq!(table.get(&KeyChord::plain(Key::Esc)), None);
    }

    #[test]
    fn modifier_combinations_are_distinct() {
        let a = KeyChord::new(Modifiers::CTRL, Key::Char('k'));
        let b = KeyChord::new(Modifiers::CTRL | Modifiers::SHIFT, Key::Char('k'));
        assert_ne!(a, b);
    }
}
