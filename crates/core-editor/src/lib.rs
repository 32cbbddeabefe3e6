//! The editor controller: open documents, input dispatch, command mode,
//! macros, location history, and autocomplete.
//!
//! The controller owns everything shared across documents (the document
//! arena, the highlighter registry, the word table, the clipboard) and is
//! the single mutation point between input batches and render passes.
//! Environment errors (file I/O, bad commands) are converted to status-line
//! messages here; they never abort the input loop.

use anyhow::Result;
use core_config::Config;
use core_doc::Document;
use core_events::InputEvent;
use core_highlight::{DocumentType, HighlighterRegistry};
use core_render::{Palette, RenderSink, Screen, paint_document, paint_status_row};
use std::path::Path;
use tracing::{info, warn};

mod command;
mod dispatch;
mod history;
mod words;

pub use command::{Command, CommandError, parse};
pub use history::{HISTORY_CAP, Location, LocationHistory, MERGE_WINDOW};
pub use words::{LOCKED_WEIGHT, WordTable};

/// Stable handle into the document arena. Slots are never reused within a
/// session, so a stale handle can only point at an empty slot, never at a
/// different document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocId(pub usize);

/// In-flight autocomplete: the prefix being completed, the ranked matches,
/// and which one is currently spliced into the document.
struct Completion {
    matches: Vec<String>,
    index: usize,
    /// Byte length of the prefix the user typed.
    prefix_len: usize,
    /// Byte length of the suffix currently spliced into the document.
    applied_len: usize,
}

pub struct Editor {
    docs: Vec<Option<Document>>,
    /// Insertion order of live documents.
    order: Vec<DocId>,
    current: Option<DocId>,
    command: Document,
    command_mode: bool,
    status: String,
    clipboard: Option<String>,
    recording: bool,
    replaying: bool,
    macro_events: Vec<InputEvent>,
    history: LocationHistory,
    words: WordTable,
    completion: Option<Completion>,
    registry: HighlighterRegistry,
    config: Config,
    palette: Palette,
    last_find: Option<(String, bool)>,
    last_replace: Option<(String, String, bool)>,
    quit: bool,
    width: u16,
    height: u16,
}

impl Editor {
    pub fn new(config: Config, palette: Palette) -> Self {
        let mut words = WordTable::new();
        if let Some(path) = &config.editor.dictionary {
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    words.set_dictionary(text.lines().map(str::to_string));
                    info!(target: "editor", path = %path.display(), "dictionary loaded");
                }
                Err(e) => {
                    warn!(target: "editor", path = %path.display(), error = %e,
                          "dictionary unavailable");
                }
            }
        }
        Self {
            docs: Vec::new(),
            order: Vec::new(),
            current: None,
            command: Document::new(),
            command_mode: false,
            status: String::new(),
            clipboard: None,
            recording: false,
            replaying: false,
            macro_events: Vec::new(),
            history: LocationHistory::new(),
            words,
            completion: None,
            registry: HighlighterRegistry::new(),
            config,
            palette,
            last_find: None,
            last_replace: None,
            quit: false,
            width: 80,
            height: 24,
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn status_message(&self) -> &str {
        &self.status
    }

    // ------------------------------------------------------------------
    // Document arena
    // ------------------------------------------------------------------

    pub fn add_document(&mut self, doc: Document) -> DocId {
        let id = DocId(self.docs.len());
        self.docs.push(Some(doc));
        self.order.push(id);
        self.current = Some(id);
        id
    }

    pub fn current_doc(&self) -> Option<&Document> {
        self.current.and_then(|id| self.docs[id.0].as_ref())
    }

    fn doc_mut(&mut self) -> Option<&mut Document> {
        self.current.and_then(|id| self.docs[id.0].as_mut())
    }

    fn live_ids(&self) -> Vec<DocId> {
        self.order.clone()
    }

    /// Open a path, or switch to it if it is already open.
    pub fn open_path(&mut self, path: &Path) {
        if let Some(&id) = self.order.iter().find(|&&id| {
            self.docs[id.0]
                .as_ref()
                .is_some_and(|d| d.filename.as_deref() == Some(path))
        }) {
            self.current = Some(id);
            return;
        }
        match Document::open(path) {
            Ok(doc) => {
                self.add_document(doc);
                self.rebuild_words();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    /// Create an empty document carrying `path` as its filename.
    fn new_document(&mut self, path: &Path) {
        let mut doc = Document::new();
        doc.filename = Some(path.to_path_buf());
        doc.doc_type = DocumentType::detect(Some(path), false, "");
        self.add_document(doc);
    }

    /// Close the current document, advancing to its next live neighbor.
    fn close_current(&mut self) {
        let Some(id) = self.current else {
            self.status = "no document to close".into();
            return;
        };
        if self.docs[id.0].as_ref().is_some_and(|d| d.modified) {
            self.status = "unsaved changes (s to save, q to discard and quit)".into();
            return;
        }
        let idx = self
            .order
            .iter()
            .position(|&o| o == id)
            .expect("current is live");
        self.order.remove(idx);
        self.docs[id.0] = None;
        self.history.forget(id);
        self.current = self
            .order
            .get(idx)
            .or_else(|| self.order.last())
            .copied();
        self.rebuild_words();
    }

    fn switch_doc(&mut self, delta: isize) {
        let Some(id) = self.current else { return };
        if self.order.len() < 2 {
            return;
        }
        let idx = self
            .order
            .iter()
            .position(|&o| o == id)
            .expect("current is live");
        let n = self.order.len() as isize;
        let next = (idx as isize + delta).rem_euclid(n) as usize;
        self.current = Some(self.order[next]);
    }

    // ------------------------------------------------------------------
    // Command mode
    // ------------------------------------------------------------------

    fn enter_command_mode(&mut self) {
        self.command = Document::new();
        self.command_mode = true;
    }

    fn leave_command_mode(&mut self) {
        self.command_mode = false;
    }

    fn run_command(&mut self, input: &str) {
        match command::parse(input) {
            Ok(cmd) => self.apply_command(cmd),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn apply_command(&mut self, cmd: Command) {
        info!(target: "command", ?cmd, "run");
        match cmd {
            Command::Save => self.save_current(),
            Command::SaveAll => {
                self.save_all();
            }
            Command::Close => self.close_current(),
            Command::Quit => self.quit = true,
            Command::SaveAllQuit => {
                if self.save_all() {
                    self.quit = true;
                }
            }
            Command::Goto(n) => {
                if let Some(doc) = self.doc_mut() {
                    doc.move_to_line(n);
                } else {
                    self.status = "no document".into();
                }
            }
            Command::New(path) => self.new_document(&path),
            Command::Open(path) => self.open_path(&path),
            Command::Find {
                text,
                case_sensitive,
            } => {
                self.last_find = Some((text.clone(), case_sensitive));
                self.find(&text, case_sensitive, false);
            }
            Command::Replace {
                search,
                replace,
                case_sensitive,
                all_docs,
            } => {
                self.last_replace = Some((search.clone(), replace.clone(), case_sensitive));
                let ids = if all_docs {
                    self.live_ids()
                } else {
                    self.current.into_iter().collect()
                };
                if ids.is_empty() {
                    self.status = "no document".into();
                    return;
                }
                let mut count = 0;
                for id in &ids {
                    if let Some(doc) = self.docs[id.0].as_mut() {
                        count += doc.replace_all(&search, &replace, case_sensitive);
                    }
                }
                self.status = if ids.len() > 1 {
                    format!("{count} replacements in {} documents", ids.len())
                } else {
                    format!("{count} replacements")
                };
            }
        }
    }

    fn save_current(&mut self) {
        let trim = self.config.editor.trim_on_save;
        let Some(doc) = self.doc_mut() else {
            self.status = "no document".into();
            return;
        };
        match doc.save(trim) {
            Ok(()) => {
                let name = doc
                    .filename
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.status = format!("saved {name}");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    /// Save every modified document. Returns whether all saves succeeded.
    fn save_all(&mut self) -> bool {
        let trim = self.config.editor.trim_on_save;
        let mut saved = 0;
        for id in self.live_ids() {
            let doc = self.docs[id.0].as_mut().expect("live doc");
            if !doc.modified {
                continue;
            }
            match doc.save(trim) {
                Ok(()) => saved += 1,
                Err(e) => {
                    self.status = e.to_string();
                    return false;
                }
            }
        }
        self.status = format!("saved {saved} documents");
        true
    }

    fn find(&mut self, text: &str, case_sensitive: bool, from_next: bool) {
        let Some(doc) = self.doc_mut() else {
            self.status = "no document".into();
            return;
        };
        if !doc.find(text, case_sensitive, from_next) {
            self.status = format!("not found: {text}");
        }
    }

    // ------------------------------------------------------------------
    // Shared state maintenance
    // ------------------------------------------------------------------

    fn rebuild_words(&mut self) {
        let texts: Vec<String> = self
            .order
            .iter()
            .filter_map(|id| self.docs[id.0].as_ref())
            .map(|d| d.text())
            .collect();
        self.words.rebuild(texts);
    }

    fn record_edit_location(&mut self) {
        if let Some(id) = self.current {
            let line = self.docs[id.0].as_ref().expect("live doc").line;
            self.history.record(Location { doc: id, line });
        }
    }

    fn goto_location(&mut self, loc: Location) {
        if self.docs[loc.doc.0].is_none() {
            return;
        }
        self.current = Some(loc.doc);
        let doc = self.docs[loc.doc.0].as_mut().expect("checked live");
        doc.move_to_line(loc.line);
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn status_line(&self) -> String {
        if !self.status.is_empty() {
            return self.status.clone();
        }
        let rec = if self.recording { " [rec]" } else { "" };
        match self.current_doc() {
            Some(doc) => {
                let name = doc
                    .filename
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "[scratch]".into());
                let flag = if doc.modified { " +" } else { "" };
                format!("{name}{flag}  {}:{}{rec}", doc.line, doc.col)
            }
            None => format!("no document  (Esc, then 'o <path>' to open){rec}"),
        }
    }

    pub fn render(&mut self, screen: &mut Screen, sink: &mut dyn RenderSink) -> Result<()> {
        let text_rows = screen.height().saturating_sub(1);
        let width = screen.width();
        let mut cursor = (0u16, 0u16);
        if let Some(id) = self.current {
            let doc = self.docs[id.0].as_mut().expect("live doc");
            doc.scroll_to_cursor(width, text_rows);
            let hl = self.registry.get(doc.doc_type);
            cursor = paint_document(screen, doc, hl, &self.palette, text_rows);
        } else {
            let style = self.palette.text();
            for row in 0..text_rows {
                screen.fill_row(row, style);
            }
        }
        let last = screen.height().saturating_sub(1);
        if self.command_mode {
            let line = format!(">{}", self.command.text());
            paint_status_row(screen, last, &line, self.palette.command);
            cursor = (last as u16, (self.command.col as u16).min(width as u16));
        } else {
            paint_status_row(screen, last, &self.status_line(), self.palette.status);
        }
        screen.present(sink, cursor)
    }
}
