//! Input dispatch: a flat chord-to-operation table, not a modal grammar.
//!
//! `handle` is the only entry point. Macro interception happens before
//! anything else so the record/replay toggles are never themselves
//! recorded; everything after that flows through `dispatch`, which is also
//! the replay path.

use crate::{Completion, Editor, Location};
use core_doc::{Document, LineChange};
use core_events::{InputEvent, Key, KeyChord, Modifiers, PointerButton, PointerKind};
use core_text::boundary::is_word_char;
use tracing::debug;

impl Editor {
    pub fn handle(&mut self, event: InputEvent) {
        self.status.clear();
        if let InputEvent::Key { chord } = event {
            if chord == KeyChord::plain(Key::F(7)) {
                self.toggle_recording();
                return;
            }
            if chord == KeyChord::plain(Key::F(8)) {
                self.replay_macro();
                return;
            }
        }
        if self.recording {
            self.macro_events.push(event);
        }
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::Resize { width, height } => self.set_size(width, height),
            InputEvent::Wheel { delta } => {
                let lines = delta as isize * 3;
                self.with_doc(|d| {
                    d.move_lines(lines);
                });
            }
            InputEvent::Pointer {
                button,
                x,
                y,
                kind,
            } => self.pointer(button, x, y, kind),
            InputEvent::Key { chord } => {
                if self.command_mode {
                    self.command_key(chord);
                } else {
                    self.edit_key(chord);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Macros
    // ------------------------------------------------------------------

    fn toggle_recording(&mut self) {
        if self.recording {
            self.recording = false;
            self.status = format!("recorded {} events", self.macro_events.len());
        } else {
            self.macro_events.clear();
            self.recording = true;
            self.status = "recording macro".into();
        }
    }

    fn replay_macro(&mut self) {
        if self.recording {
            self.status = "cannot replay while recording".into();
            return;
        }
        if self.replaying {
            return;
        }
        if self.macro_events.is_empty() {
            self.status = "no macro recorded".into();
            return;
        }
        debug!(target: "editor", events = self.macro_events.len(), "macro replay");
        self.replaying = true;
        for e in self.macro_events.clone() {
            self.dispatch(e);
        }
        self.replaying = false;
    }

    // ------------------------------------------------------------------
    // Edit-mode keys
    // ------------------------------------------------------------------

    fn edit_key(&mut self, chord: KeyChord) {
        let m = chord.mods;
        let none = m.is_empty();
        let ctrl = m == Modifiers::CTRL;
        let alt = m == Modifiers::ALT;
        let shift = m == Modifiers::SHIFT;

        // Completion ends on anything but the cycling keys. Typing a
        // non-word character accepts the candidate and locks its weight.
        let cycling = ctrl && matches!(chord.key, Key::Char('n') | Key::Char('p'));
        if !cycling
            && let Some(comp) = self.completion.take()
            && let Key::Char(c) = chord.key
            && none
            && !is_word_char(c)
        {
            let word = comp.matches[comp.index].clone();
            self.words.lock_in(&word);
        }

        let page = self.height.saturating_sub(2).max(1) as isize;
        match chord.key {
            Key::Esc if none => self.enter_command_mode(),

            // Insertion
            Key::Char(c) if none => self.with_edit(|d| d.insert_char(c, false)),
            Key::Enter if none => self.with_edit(|d| d.insert_newline()),

            // Line transforms
            Key::Tab if none => self.with_edit(|d| d.change_lines(LineChange::Indent)),
            Key::Tab if shift => self.with_edit(|d| d.change_lines(LineChange::Unindent)),
            Key::Char('/') if alt => self.toggle_comment(),

            // Deletion
            Key::Backspace if none => self.with_edit(|d| {
                d.delete_char_back();
            }),
            Key::Backspace if ctrl => self.with_edit(|d| {
                d.delete_word_back();
            }),
            Key::Backspace if alt => self.with_edit(|d| {
                d.delete_run_back();
            }),
            Key::Delete if none => self.with_edit(|d| {
                d.delete_char_forward();
            }),
            Key::Delete if ctrl => self.with_edit(|d| {
                d.delete_word_forward();
            }),
            Key::Delete if alt => self.with_edit(|d| {
                d.delete_run_forward();
            }),

            // Navigation
            Key::Left if none => self.with_doc(|d| {
                d.move_char_back();
            }),
            Key::Right if none => self.with_doc(|d| {
                d.move_char_forward();
            }),
            Key::Left if ctrl => self.with_doc(|d| {
                d.move_word_back();
            }),
            Key::Right if ctrl => self.with_doc(|d| {
                d.move_word_forward();
            }),
            Key::Left if alt => self.with_doc(|d| {
                d.move_run_back();
            }),
            Key::Right if alt => self.with_doc(|d| {
                d.move_run_forward();
            }),
            Key::Up if none => self.with_doc(|d| {
                d.move_lines(-1);
            }),
            Key::Down if none => self.with_doc(|d| {
                d.move_lines(1);
            }),
            Key::PageUp if none => self.with_doc(move |d| {
                d.move_lines(-page);
            }),
            Key::PageDown if none => self.with_doc(move |d| {
                d.move_lines(page);
            }),
            Key::Home if none => self.with_doc(|d| d.move_to_line_start()),
            Key::End if none => self.with_doc(|d| d.move_to_line_end()),
            Key::Home if ctrl => self.with_doc(|d| d.move_to_line(1)),
            Key::End if ctrl => self.with_doc(|d| {
                let end = d.buffer().end();
                d.move_to(end);
            }),

            // Selection and clipboard
            Key::Char('m') if alt => self.with_doc(|d| d.set_mark()),
            Key::Char('c') if ctrl => self.copy_cut(false),
            Key::Char('x') if ctrl => self.copy_cut(true),
            Key::Char('v') if ctrl => self.paste(),

            // Search and replace repeats
            Key::F(3) if none => self.find_next(),
            Key::Char('r') if ctrl => self.replace_under_cursor(),

            // Autocomplete
            Key::Char('n') if ctrl => self.cycle_completion(1),
            Key::Char('p') if ctrl => self.cycle_completion(-1),

            // Documents and history
            Key::Up if alt => self.switch_doc(-1),
            Key::Down if alt => self.switch_doc(1),
            Key::Char('b') if ctrl => self.history_back(),
            Key::Char('f') if ctrl => self.history_forward(),

            Key::Char('s') if ctrl => self.save_current(),
            Key::Char('q') if ctrl => self.request_quit(),
            _ => {}
        }
    }

    fn command_key(&mut self, chord: KeyChord) {
        let none = chord.mods.is_empty();
        match chord.key {
            Key::Esc => self.leave_command_mode(),
            Key::Enter => {
                let text = self.command.text();
                self.leave_command_mode();
                self.run_command(&text);
            }
            Key::Char(c) if none => self.command.insert_char(c, false),
            Key::Backspace => {
                self.command.delete_char_back();
            }
            Key::Delete => {
                self.command.delete_char_forward();
            }
            Key::Left => {
                self.command.move_char_back();
            }
            Key::Right => {
                self.command.move_char_forward();
            }
            Key::Home => self.command.move_to_line_start(),
            Key::End => self.command.move_to_line_end(),
            _ => {}
        }
    }

    fn pointer(&mut self, button: PointerButton, x: u16, y: u16, kind: PointerKind) {
        if button != PointerButton::Left {
            return;
        }
        if y >= self.height.saturating_sub(1) {
            return;
        }
        match kind {
            PointerKind::Down => self.with_doc(|d| {
                d.move_to_line_col(d.top + y as usize, d.left + x as usize);
            }),
            PointerKind::Drag => self.with_doc(|d| {
                if !d.selection_mode {
                    d.set_mark();
                }
                d.move_to_line_col(d.top + y as usize, d.left + x as usize);
            }),
            PointerKind::Up => {}
        }
    }

    // ------------------------------------------------------------------
    // Helpers over the current document
    // ------------------------------------------------------------------

    fn with_doc(&mut self, f: impl FnOnce(&mut Document)) {
        if let Some(doc) = self.doc_mut() {
            f(doc);
        }
    }

    /// Apply a mutating operation and note the edit location.
    fn with_edit(&mut self, f: impl FnOnce(&mut Document)) {
        let Some(doc) = self.doc_mut() else {
            self.status = "no document".into();
            return;
        };
        f(doc);
        self.record_edit_location();
    }

    fn copy_cut(&mut self, delete: bool) {
        let Some(doc) = self.doc_mut() else { return };
        if let Some(text) = doc.copy_delete_text(delete) {
            self.clipboard = Some(text);
        }
        if delete {
            self.record_edit_location();
        }
    }

    fn paste(&mut self) {
        let Some(text) = self.clipboard.clone() else {
            self.status = "clipboard empty".into();
            return;
        };
        self.with_edit(|d| d.paste_text(&text));
    }

    /// Comment or uncomment depending on the cursor line's current state.
    fn toggle_comment(&mut self) {
        let Some(doc) = self.doc_mut() else { return };
        let start = doc.buffer().line_start(doc.position);
        let mut p = start;
        while let Some(c) = doc.buffer().char_at(p) {
            if c != ' ' && c != '\t' {
                break;
            }
            p = doc.buffer().step_forward(p).expect("char_at was Some");
        }
        let commented = doc.buffer().char_at(p) == Some('/')
            && doc
                .buffer()
                .step_forward(p)
                .and_then(|q| doc.buffer().char_at(q))
                == Some('/');
        let change = if commented {
            LineChange::Uncomment
        } else {
            LineChange::Comment
        };
        doc.change_lines(change);
        self.record_edit_location();
    }

    fn find_next(&mut self) {
        let Some((text, case_sensitive)) = self.last_find.clone() else {
            self.status = "no previous search".into();
            return;
        };
        self.find(&text, case_sensitive, true);
    }

    fn replace_under_cursor(&mut self) {
        let Some((search, replace, case_sensitive)) = self.last_replace.clone() else {
            self.status = "no previous replacement".into();
            return;
        };
        let Some(doc) = self.doc_mut() else { return };
        let out = doc.replace(&search, &replace, case_sensitive);
        if out.substituted {
            self.record_edit_location();
        }
        if !out.substituted && !out.next_found {
            self.status = format!("not found: {search}");
        }
    }

    fn request_quit(&mut self) {
        let any_modified = self
            .order
            .iter()
            .filter_map(|id| self.docs[id.0].as_ref())
            .any(|d| d.modified);
        if any_modified {
            self.status = "unsaved changes ('q' discards, 'qs' saves all)".into();
        } else {
            self.quit = true;
        }
    }

    fn history_back(&mut self) {
        let Some(current) = self.current_location() else {
            return;
        };
        match self.history.back(current) {
            Some(loc) => self.goto_location(loc),
            None => self.status = "at oldest location".into(),
        }
    }

    fn history_forward(&mut self) {
        let Some(current) = self.current_location() else {
            return;
        };
        match self.history.forward(current) {
            Some(loc) => self.goto_location(loc),
            None => self.status = "at newest location".into(),
        }
    }

    fn current_location(&self) -> Option<Location> {
        let id = self.current?;
        let line = self.docs[id.0].as_ref()?.line;
        Some(Location { doc: id, line })
    }

    // ------------------------------------------------------------------
    // Autocomplete
    // ------------------------------------------------------------------

    fn cycle_completion(&mut self, step: isize) {
        if self.completion.is_none() {
            self.start_completion();
            return;
        }
        {
            let comp = self.completion.as_mut().expect("checked above");
            let n = comp.matches.len() as isize;
            comp.index = (comp.index as isize + step).rem_euclid(n) as usize;
        }
        self.retract_completion();
        self.apply_completion();
    }

    fn start_completion(&mut self) {
        let Some(doc) = self.doc_mut() else { return };
        let prefix = doc.autocomplete_prefix();
        if prefix.is_empty() {
            self.status = "nothing to complete".into();
            return;
        }
        self.rebuild_words();
        let matches = self.words.suggest(&prefix);
        if matches.is_empty() {
            self.status = format!("no completions for {prefix}");
            return;
        }
        self.completion = Some(Completion {
            matches,
            index: 0,
            prefix_len: prefix.len(),
            applied_len: 0,
        });
        self.apply_completion();
    }

    /// Splice the current candidate's suffix in at the cursor.
    fn apply_completion(&mut self) {
        let Some(comp) = &self.completion else { return };
        let word = comp.matches[comp.index].clone();
        let suffix = word[comp.prefix_len..].to_string();
        let (index, total) = (comp.index + 1, comp.matches.len());
        let Some(doc) = self.doc_mut() else { return };
        doc.complete_word(&suffix);
        if let Some(comp) = self.completion.as_mut() {
            comp.applied_len = suffix.len();
        }
        self.record_edit_location();
        self.status = format!("{word} ({index}/{total})");
    }

    /// Put the cursor back at the end of the typed prefix so the next
    /// candidate replaces the previous one.
    fn retract_completion(&mut self) {
        let applied = self
            .completion
            .as_ref()
            .map(|c| c.applied_len)
            .unwrap_or(0);
        let Some(doc) = self.doc_mut() else { return };
        let back = doc.position.get() - applied;
        let pos = doc.buffer().pos_at(back).expect("suffix starts on a boundary");
        doc.move_to(pos);
    }
}
