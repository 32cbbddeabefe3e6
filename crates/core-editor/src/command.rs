//! Ex-style command grammar for the command-line document.
//!
//! One line, one command: `s`, `sa`, `c`, `q`, `qs`, `g <n>`, `n <path>`,
//! `o <path>`, `f[i] <text>`, `r[i][d|a] <sep><search><sep><replace>`.
//! The replace separator is whatever character the user types first, so
//! patterns containing `/` need no escaping. Parsing never touches editor
//! state; malformed input becomes a descriptive error the controller shows
//! as the status line.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Save,
    SaveAll,
    Close,
    Quit,
    SaveAllQuit,
    Goto(usize),
    New(PathBuf),
    Open(PathBuf),
    Find {
        text: String,
        case_sensitive: bool,
    },
    Replace {
        search: String,
        replace: String,
        case_sensitive: bool,
        all_docs: bool,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} expects no argument")]
    UnexpectedArgument(&'static str),
    #[error("g expects a line number, got '{0}'")]
    BadLineNumber(String),
    #[error("{0} expects an argument")]
    MissingArgument(&'static str),
    #[error("replace expects <sep><search><sep><replace>")]
    BadReplaceSyntax,
}

pub fn parse(input: &str) -> Result<Command, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandError::Empty);
    }
    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim_start()),
        None => (input, ""),
    };
    let bare = |cmd: Command, name: &'static str| {
        if rest.is_empty() {
            Ok(cmd)
        } else {
            Err(CommandError::UnexpectedArgument(name))
        }
    };
    match head {
        "s" => bare(Command::Save, "s"),
        "sa" => bare(Command::SaveAll, "sa"),
        "c" => bare(Command::Close, "c"),
        "q" => bare(Command::Quit, "q"),
        "qs" => bare(Command::SaveAllQuit, "qs"),
        "g" => {
            let n: usize = rest
                .parse()
                .map_err(|_| CommandError::BadLineNumber(rest.to_string()))?;
            if n == 0 {
                return Err(CommandError::BadLineNumber(rest.to_string()));
            }
            Ok(Command::Goto(n))
        }
        "n" | "o" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument(if head == "n" {
                    "n"
                } else {
                    "o"
                }));
            }
            let path = PathBuf::from(rest);
            Ok(if head == "n" {
                Command::New(path)
            } else {
                Command::Open(path)
            })
        }
        "f" | "fi" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("f"));
            }
            Ok(Command::Find {
                text: rest.to_string(),
                case_sensitive: head == "f",
            })
        }
        _ if head.starts_with('r') => parse_replace(&head[1..], rest),
        _ => Err(CommandError::Unknown(head.to_string())),
    }
}

/// Flags are ordered: optional `i`, then optional `d` or `a`.
fn parse_replace(flags: &str, rest: &str) -> Result<Command, CommandError> {
    let mut flags = flags.chars().peekable();
    let case_sensitive = if flags.peek() == Some(&'i') {
        flags.next();
        false
    } else {
        true
    };
    let all_docs = match flags.next() {
        None => false,
        Some('d') => false,
        Some('a') => true,
        Some(other) => {
            return Err(CommandError::Unknown(format!("r{other}")));
        }
    };
    if flags.next().is_some() {
        return Err(CommandError::BadReplaceSyntax);
    }
    let mut chars = rest.chars();
    let sep = chars.next().ok_or(CommandError::BadReplaceSyntax)?;
    let body = chars.as_str();
    let (search, replace) = body
        .split_once(sep)
        .ok_or(CommandError::BadReplaceSyntax)?;
    if search.is_empty() {
        return Err(CommandError::BadReplaceSyntax);
    }
    // A trailing separator after the replacement is tolerated.
    let replace = replace.strip_suffix(sep).unwrap_or(replace);
    Ok(Command::Replace {
        search: search.to_string(),
        replace: replace.to_string(),
        case_sensitive,
        all_docs,
    })
}
