//! Incremental, resumable syntax highlighting.
//!
//! Each document type has a character-driven state machine implementing
//! [`Highlighter`]. The machine consumes one codepoint per call and returns
//! the [`TokenKind`] used to paint that codepoint. All machine state lives in
//! the caller-owned [`HighlightState`], which is a pure function of the
//! character stream consumed so far: snapshotting it at any position and
//! resuming later yields exactly the classifications a full scan would.
//!
//! Two shared mechanics drive every machine:
//!
//! * **Delayed reset.** Token-terminal states (strings, comments, attribute
//!   values) arm `chars_remaining` when they see their terminating condition,
//!   so the terminator itself is still painted with the token's color before
//!   the state reverts.
//! * **Identifier replay.** Identifier runs are scanned whole, classified
//!   against keyword/type tables once, then replayed through
//!   `chars_remaining` so every character of the identifier gets the same
//!   color without re-scanning.

use core_text::{Buffer, Pos};

mod c;
mod doc_type;
mod markup;
mod shell;

pub use c::CHighlighter;
pub use doc_type::DocumentType;
pub use markup::MarkupHighlighter;
pub use shell::ShellHighlighter;

/// Color class of one painted codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    #[default]
    None,
    Str,
    Number,
    Ident,
    Keyword,
    Type,
    Comment,
    BlockComment,
    Preprocessor,
    Variable,
    Tag,
    Attribute,
    AttributeValue,
}

/// Snapshot of a highlighting scan. Cheap to clone and safe to cache at any
/// buffer position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightState {
    /// Dominant state gating the machine's behavior.
    pub kind: TokenKind,
    /// Codepoints left to paint with `kind` before reconsidering.
    pub chars_remaining: usize,
    /// Whether `chars_remaining` hitting zero reverts `kind` to `None`.
    pub reset: bool,
    /// Scratch: opening quote / brace of the current token.
    pub start_ch: char,
    /// Scratch: previously consumed codepoint (escape detection).
    pub prev_ch: char,
    /// The most recently scanned identifier run. Not consulted during
    /// replay; carried so a snapshot records the token text.
    pub word: String,
}

impl HighlightState {
    /// Consume one codepoint of an armed run.
    fn countdown(&mut self) -> TokenKind {
        debug_assert!(self.chars_remaining > 0);
        self.chars_remaining -= 1;
        let kind = self.kind;
        if self.chars_remaining == 0 && self.reset {
            self.kind = TokenKind::None;
            self.reset = false;
        }
        kind
    }

    /// Arm a run of `n` codepoints painted as `kind`, reverting to `None`
    /// afterwards, and consume the first one.
    fn arm(&mut self, n: usize, kind: TokenKind) -> TokenKind {
        debug_assert!(n > 0);
        self.kind = kind;
        self.chars_remaining = n;
        self.reset = true;
        self.countdown()
    }
}

/// A per-document-type highlighting machine. Implementations are stateless;
/// all scan state is in the [`HighlightState`].
pub trait Highlighter {
    /// Consume the codepoint at `pos`, update `state`, and return the kind
    /// used to paint that codepoint. `pos` must hold a character.
    fn highlight_char(&self, state: &mut HighlightState, buf: &Buffer, pos: Pos) -> TokenKind;
}

/// Lazily-instantiated machines keyed by document type. One machine serves
/// every document of its type; documents keep only their own state snapshot.
#[derive(Default)]
pub struct HighlighterRegistry {
    c: Option<CHighlighter>,
    shell: Option<ShellHighlighter>,
    markup: Option<MarkupHighlighter>,
}

impl HighlighterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Machine for `ty`, or `None` for plain text.
    pub fn get(&mut self, ty: DocumentType) -> Option<&dyn Highlighter> {
        match ty {
            DocumentType::Plain => None,
            DocumentType::C => Some(self.c.get_or_insert_with(CHighlighter::new)),
            DocumentType::Shell => Some(self.shell.get_or_insert_with(ShellHighlighter::new)),
            DocumentType::Markup => Some(self.markup.get_or_insert_with(MarkupHighlighter::new)),
        }
    }
}

/// Scan the identifier run starting at `pos` (first char already known to be
/// an identifier start). Returns the run text and its length in codepoints.
fn scan_ident(buf: &Buffer, pos: Pos, is_ident: fn(char) -> bool) -> (String, usize) {
    let mut word = String::new();
    let mut count = 0;
    let mut p = pos;
    while let Some(c) = buf.char_at(p) {
        if !is_ident(c) {
            break;
        }
        word.push(c);
        count += 1;
        p = match buf.step_forward(p) {
            Some(n) => n,
            None => break,
        };
    }
    (word, count)
}

/// Lax numeric-literal alphabet: digits, hex letters, radix markers and
/// signs. Accepts some invalid literals on purpose; the relaxed grammar is
/// part of the contract.
fn is_number_char(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_ascii_hexdigit()
        || matches!(c, '.' | '+' | '-' | 'x' | 'X')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Classify every codepoint of `text` in one pass.
    pub(crate) fn classify_all(hl: &dyn Highlighter, text: &str) -> Vec<TokenKind> {
        let buf = Buffer::from_str(text);
        let mut state = HighlightState::default();
        let mut kinds = Vec::new();
        let mut p = Pos::ZERO;
        while buf.char_at(p).is_some() {
            kinds.push(hl.highlight_char(&mut state, &buf, p));
            p = buf.step_forward(p).unwrap();
        }
        kinds
    }

    /// For every split point N: scan to N, snapshot, resume to the end, and
    /// require the same classification as the single pass.
    fn assert_resumable(hl: &dyn Highlighter, text: &str) {
        let buf = Buffer::from_str(text);
        let full = classify_all(hl, text);
        let positions: Vec<Pos> = {
            let mut v = vec![Pos::ZERO];
            let mut p = Pos::ZERO;
            while let Some(n) = buf.step_forward(p) {
                v.push(n);
                p = n;
            }
            v
        };
        for split in 0..positions.len() {
            let mut state = HighlightState::default();
            let mut kinds = Vec::new();
            for &p in &positions[..split] {
                kinds.push(hl.highlight_char(&mut state, &buf, p));
            }
            let snapshot = state.clone();
            let mut resumed = snapshot;
            for &p in &positions[split..] {
                if buf.char_at(p).is_none() {
                    break;
                }
                kinds.push(hl.highlight_char(&mut resumed, &buf, p));
            }
            assert_eq!(kinds, full, "resume mismatch at split {split}");
        }
    }

    #[test]
    fn snapshot_records_the_scanned_identifier() {
        let hl = CHighlighter::new();
        let buf = Buffer::from_str("return");
        let mut state = HighlightState::default();
        let mut p = Pos::ZERO;
        while buf.char_at(p).is_some() {
            hl.highlight_char(&mut state, &buf, p);
            p = buf.step_forward(p).unwrap();
        }
        assert_eq!(state.word, "return");
    }

    #[test]
    fn c_machine_is_resumable_everywhere() {
        assert_resumable(
            &CHighlighter::new(),
            "int main() {\n  // line\n  /* block */ char *s = \"a\\\"b\";\n  return 0x1f;\n}\n",
        );
    }

    #[test]
    fn shell_machine_is_resumable_everywhere() {
        assert_resumable(
            &ShellHighlighter::new(),
            "#!/bin/sh\nfoo=1 # c\nif [ \"$foo\" = \"${bar}\" ]; then\n  echo done\nfi\n",
        );
    }

    #[test]
    fn markup_machine_is_resumable_everywhere() {
        assert_resumable(
            &MarkupHighlighter::new(),
            "<!-- note --><a href=\"x\">text</a>\n<br/>\n",
        );
    }
}
