//! File I/O: byte-level decode and encode (BOM sniffing, UTF-16, CRLF
//! normalization), trailing-whitespace trimming, and the open/save entry
//! points on [`Document`].

use crate::Document;
use core_highlight::{DocumentType, HighlightState};
use core_text::{Anchor, Pos};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DocError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not decode {path}")]
    Decode { path: PathBuf },
    #[error("document has no filename")]
    NoFilename,
}

/// On-disk character encoding. The buffer itself is always UTF-8; files are
/// re-encoded on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// On-disk line terminator. The buffer always uses `\n`; CRLF files are
/// normalized on load and restored on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

/// Decoded file content: normalized text plus everything needed to write the
/// file back byte-identically (modulo edits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: Encoding,
    pub has_bom: bool,
    pub line_ending: LineEnding,
}

/// BOM-less UTF-16 sniff. Text holds no NUL bytes in UTF-8, so NULs in the
/// leading bytes identify UTF-16, and whether they sit at even or odd
/// offsets identifies the byte order.
fn sniff_utf16(bytes: &[u8]) -> Option<Encoding> {
    let head = &bytes[..bytes.len().min(1024)];
    let mut even = 0usize;
    let mut odd = 0usize;
    for (i, &b) in head.iter().enumerate() {
        if b == 0 {
            if i % 2 == 0 {
                even += 1;
            } else {
                odd += 1;
            }
        }
    }
    if odd > even {
        Some(Encoding::Utf16Le)
    } else if even > odd {
        Some(Encoding::Utf16Be)
    } else {
        None
    }
}

/// Sniff the BOM (or the NUL pattern of BOM-less UTF-16), decode to UTF-8,
/// and normalize CRLF line endings to `\n`.
pub fn decode_bytes(bytes: &[u8]) -> Option<Decoded> {
    let (encoding, has_bom, body) = match bytes {
        [0xef, 0xbb, 0xbf, rest @ ..] => (Encoding::Utf8, true, rest),
        [0xff, 0xfe, rest @ ..] => (Encoding::Utf16Le, true, rest),
        [0xfe, 0xff, rest @ ..] => (Encoding::Utf16Be, true, rest),
        _ => (sniff_utf16(bytes).unwrap_or(Encoding::Utf8), false, bytes),
    };
    let raw = match encoding {
        Encoding::Utf8 => String::from_utf8(body.to_vec()).ok()?,
        Encoding::Utf16Le | Encoding::Utf16Be => {
            if body.len() % 2 != 0 {
                return None;
            }
            let units = body.chunks_exact(2).map(|pair| {
                let pair = [pair[0], pair[1]];
                match encoding {
                    Encoding::Utf16Le => u16::from_le_bytes(pair),
                    _ => u16::from_be_bytes(pair),
                }
            });
            char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .ok()?
        }
    };
    let line_ending = if raw.contains("\r\n") {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    };
    let text = match line_ending {
        LineEnding::Crlf => raw.replace("\r\n", "\n"),
        LineEnding::Lf => raw,
    };
    Some(Decoded {
        text,
        encoding,
        has_bom,
        line_ending,
    })
}

/// Inverse of [`decode_bytes`]: restore the line endings, re-encode, and
/// prepend the BOM the file arrived with.
pub fn encode_text(text: &str, encoding: Encoding, has_bom: bool, line_ending: LineEnding) -> Vec<u8> {
    let restored;
    let text = match line_ending {
        LineEnding::Crlf => {
            restored = text.replace('\n', "\r\n");
            restored.as_str()
        }
        LineEnding::Lf => text,
    };
    match encoding {
        Encoding::Utf8 => {
            let mut out = Vec::with_capacity(text.len() + 3);
            if has_bom {
                out.extend_from_slice(&[0xef, 0xbb, 0xbf]);
            }
            out.extend_from_slice(text.as_bytes());
            out
        }
        Encoding::Utf16Le | Encoding::Utf16Be => {
            let mut out = Vec::with_capacity(text.len() * 2 + 2);
            if has_bom {
                push_unit(&mut out, 0xfeff, encoding);
            }
            let mut pair = [0u16; 2];
            for c in text.chars() {
                for unit in c.encode_utf16(&mut pair) {
                    push_unit(&mut out, *unit, encoding);
                }
            }
            out
        }
    }
}

fn push_unit(out: &mut Vec<u8>, unit: u16, encoding: Encoding) {
    let bytes = match encoding {
        Encoding::Utf16Le => unit.to_le_bytes(),
        _ => unit.to_be_bytes(),
    };
    out.extend_from_slice(&bytes);
}

/// Strip spaces and tabs that sit between the last visible character of a
/// line and its newline (or the end of the text). Single pass: whitespace is
/// held pending and flushed only when a non-whitespace character follows.
pub fn trim_trailing_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    for c in text.chars() {
        match c {
            ' ' | '\t' => pending.push(c),
            '\n' => {
                pending.clear();
                out.push('\n');
            }
            _ => {
                out.push_str(&pending);
                pending.clear();
                out.push(c);
            }
        }
    }
    out
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

impl Document {
    /// Open a file. A path that does not exist yet yields an empty document
    /// carrying that filename, so `save` creates it.
    pub fn open(path: &Path) -> Result<Self, DocError> {
        let mut doc = match fs::read(path) {
            Ok(bytes) => {
                let decoded = decode_bytes(&bytes).ok_or_else(|| DocError::Decode {
                    path: path.to_path_buf(),
                })?;
                let mut doc = Document::from_str(&decoded.text);
                doc.encoding = decoded.encoding;
                doc.has_bom = decoded.has_bom;
                doc.line_ending = decoded.line_ending;
                doc
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Document::new(),
            Err(e) => {
                return Err(DocError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let first_line = {
            let end = doc.buf.find_newline_forward(Pos::ZERO).unwrap_or(doc.buf.end());
            doc.buf.slice(Pos::ZERO, end)
        };
        doc.doc_type = DocumentType::detect(Some(path), is_executable(path), &first_line);
        doc.filename = Some(path.to_path_buf());
        info!(target: "io", path = %path.display(), doc_type = ?doc.doc_type,
              encoding = ?doc.encoding, "opened");
        Ok(doc)
    }

    /// Save to the document's filename.
    pub fn save(&mut self, trim: bool) -> Result<(), DocError> {
        let path = self.filename.clone().ok_or(DocError::NoFilename)?;
        self.save_to(&path, trim)
    }

    /// Save to a new path, which becomes the document's filename; the
    /// document type is re-detected from it.
    pub fn save_as(&mut self, path: &Path, trim: bool) -> Result<(), DocError> {
        self.save_to(path, trim)?;
        self.filename = Some(path.to_path_buf());
        let first_line = {
            let end = self.buf.find_newline_forward(Pos::ZERO).unwrap_or(self.buf.end());
            self.buf.slice(Pos::ZERO, end)
        };
        self.doc_type = DocumentType::detect(Some(path), is_executable(path), &first_line);
        self.highlight = HighlightState::default();
        self.top_pos = None;
        Ok(())
    }

    fn save_to(&mut self, path: &Path, trim: bool) -> Result<(), DocError> {
        if trim {
            let trimmed = trim_trailing_whitespace(&self.text());
            if trimmed != self.text() {
                self.buf.set_text(&trimmed);
                self.top_pos = None;
                let off = self.position.get().min(self.buf.len());
                let pos = self.clamp_offset(off);
                let lc = self.buf.pos_to_line_col(Anchor::ORIGIN, pos);
                self.position = pos;
                self.line = lc.line;
                self.col = lc.col;
                self.preferred_col = lc.col;
            }
        }
        let bytes = encode_text(&self.text(), self.encoding, self.has_bom, self.line_ending);
        fs::write(path, &bytes).map_err(|e| DocError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.modified = false;
        info!(target: "io", path = %path.display(), bytes = bytes.len(), "saved");
        Ok(())
    }

    /// Largest valid position at or before the byte offset.
    fn clamp_offset(&self, mut off: usize) -> Pos {
        loop {
            match self.buf.pos_at(off) {
                Ok(p) => return p,
                Err(_) => off -= 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn utf8_without_bom() {
        let d = decode_bytes(b"hello\n").unwrap();
        assert_eq!(d.text, "hello\n");
        assert_eq!(d.encoding, Encoding::Utf8);
        assert!(!d.has_bom);
        assert_eq!(d.line_ending, LineEnding::Lf);
        assert_eq!(
            encode_text(&d.text, d.encoding, d.has_bom, d.line_ending),
            b"hello\n"
        );
    }

    #[test]
    fn utf8_bom_round_trip() {
        let bytes = b"\xef\xbb\xbfhi";
        let d = decode_bytes(bytes).unwrap();
        assert_eq!(d.text, "hi");
        assert!(d.has_bom);
        assert_eq!(
            encode_text(&d.text, d.encoding, d.has_bom, d.line_ending),
            bytes
        );
    }

    #[test]
    fn utf16_le_round_trip() {
        let bytes: Vec<u8> = vec![0xff, 0xfe, b'a', 0, b'\n', 0, 0x3b, 0x04];
        let d = decode_bytes(&bytes).unwrap();
        assert_eq!(d.text, "a\nл");
        assert_eq!(d.encoding, Encoding::Utf16Le);
        assert_eq!(encode_text(&d.text, d.encoding, d.has_bom, d.line_ending), bytes);
    }

    #[test]
    fn utf16_be_round_trip() {
        let bytes: Vec<u8> = vec![0xfe, 0xff, 0, b'o', 0, b'k'];
        let d = decode_bytes(&bytes).unwrap();
        assert_eq!(d.text, "ok");
        assert_eq!(d.encoding, Encoding::Utf16Be);
        assert_eq!(encode_text(&d.text, d.encoding, d.has_bom, d.line_ending), bytes);
    }

    #[test]
    fn bomless_utf16_sniffed_from_nul_pattern() {
        let le: Vec<u8> = vec![b'h', 0, b'i', 0, b'\n', 0];
        let d = decode_bytes(&le).unwrap();
        assert_eq!(d.text, "hi\n");
        assert_eq!(d.encoding, Encoding::Utf16Le);
        assert!(!d.has_bom);
        assert_eq!(encode_text(&d.text, d.encoding, d.has_bom, d.line_ending), le);

        let be: Vec<u8> = vec![0, b'o', 0, b'k'];
        let d = decode_bytes(&be).unwrap();
        assert_eq!(d.text, "ok");
        assert_eq!(d.encoding, Encoding::Utf16Be);
        assert_eq!(encode_text(&d.text, d.encoding, d.has_bom, d.line_ending), be);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(decode_bytes(&[0xff, 0xfe, 0x00]).is_none()); // odd UTF-16 length
        assert!(decode_bytes(&[0xc3, 0x28]).is_none()); // bad UTF-8
    }

    #[test]
    fn crlf_normalized_and_restored() {
        let d = decode_bytes(b"a\r\nb\r\n").unwrap();
        assert_eq!(d.text, "a\nb\n");
        assert_eq!(d.line_ending, LineEnding::Crlf);
        assert_eq!(
            encode_text(&d.text, d.encoding, d.has_bom, d.line_ending),
            b"a\r\nb\r\n"
        );
    }

    #[test]
    fn trim_strips_only_line_tails() {
        assert_eq!(
            trim_trailing_whitespace("a  \n  b\t\nc  d   "),
            "a\n  b\nc  d"
        );
        assert_eq!(trim_trailing_whitespace("   \n"), "\n");
    }

    #[test]
    fn open_missing_file_is_a_fresh_named_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.text(), "");
        assert_eq!(doc.filename.as_deref(), Some(path.as_path()));
        assert!(!doc.modified);
    }

    #[test]
    fn save_and_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.c");
        let mut doc = Document::from_str("int x;\n");
        doc.save_as(&path, false).unwrap();
        assert!(!doc.modified);
        assert_eq!(doc.doc_type, DocumentType::C);

        let again = Document::open(&path).unwrap();
        assert_eq!(again.text(), "int x;\n");
        assert_eq!(again.doc_type, DocumentType::C);
    }

    #[test]
    fn save_with_trim_rewrites_buffer_and_clamps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        let mut doc = Document::from_str("x   ");
        doc.move_to_line_end();
        assert_eq!(doc.col, 5);
        doc.save_as(&path, true).unwrap();
        assert_eq!(doc.text(), "x");
        assert_eq!((doc.line, doc.col), (1, 2));
        assert_eq!(fs::read(&path).unwrap(), b"x");
    }

    #[test]
    fn shebang_detected_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy");
        fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();
        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.doc_type, DocumentType::Shell);
    }
}
