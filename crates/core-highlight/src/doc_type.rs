//! Document type detection: extension map, shebang sniff, and the
//! extensionless-executable-defaults-to-shell rule.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentType {
    #[default]
    Plain,
    C,
    Shell,
    Markup,
}

impl DocumentType {
    /// Derive the type from the filename, executability, and the first line
    /// of content (for shebangs).
    pub fn detect(path: Option<&Path>, is_executable: bool, first_line: &str) -> Self {
        if let Some(ext) = path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            return Self::from_extension(ext);
        }
        if first_line.starts_with("#!") {
            return DocumentType::Shell;
        }
        if is_executable {
            return DocumentType::Shell;
        }
        DocumentType::Plain
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "c" | "h" | "cc" | "hh" | "cpp" | "cxx" | "hpp" | "java" | "js" | "ts" | "rs"
            | "go" | "cs" => DocumentType::C,
            "sh" | "bash" | "zsh" => DocumentType::Shell,
            "html" | "htm" | "xml" | "xhtml" | "svg" => DocumentType::Markup,
            _ => DocumentType::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn extension_wins_over_content() {
        let p = PathBuf::from("x.c");
        assert_eq!(
            DocumentType::detect(Some(&p), false, "#!/bin/sh"),
            DocumentType::C
        );
    }

    #[test]
    fn shebang_without_extension() {
        let p = PathBuf::from("install");
        assert_eq!(
            DocumentType::detect(Some(&p), false, "#!/usr/bin/env bash"),
            DocumentType::Shell
        );
    }

    #[test]
    fn extensionless_executable_defaults_to_shell() {
        let p = PathBuf::from("runme");
        assert_eq!(DocumentType::detect(Some(&p), true, ""), DocumentType::Shell);
        assert_eq!(DocumentType::detect(Some(&p), false, ""), DocumentType::Plain);
    }

    #[test]
    fn markup_extensions() {
        assert_eq!(DocumentType::from_extension("HTML"), DocumentType::Markup);
        assert_eq!(DocumentType::from_extension("xml"), DocumentType::Markup);
        assert_eq!(DocumentType::from_extension("txt"), DocumentType::Plain);
    }
}
