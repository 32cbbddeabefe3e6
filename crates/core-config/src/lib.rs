//! Configuration loading and parsing.
//!
//! `etch.toml` is looked up in the working directory first, then in the
//! platform config dir. A missing or unparsable file yields defaults; the
//! editor never refuses to start over configuration. Unknown fields are
//! ignored so older binaries tolerate newer files.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteChoice {
    #[default]
    Dark,
    Bright,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct UiConfig {
    #[serde(default)]
    pub palette: PaletteChoice,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_trim_on_save")]
    pub trim_on_save: bool,
    /// Optional word list merged into the autocomplete table.
    #[serde(default)]
    pub dictionary: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            trim_on_save: Self::default_trim_on_save(),
            dictionary: None,
        }
    }
}

impl EditorConfig {
    const fn default_trim_on_save() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Best-effort config path following platform conventions: local file first,
/// then XDG / AppData Roaming.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("etch.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("etch").join("etch.toml");
    }
    PathBuf::from("etch.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(cfg) => {
                info!(target: "config", path = %path.display(), "loaded");
                Ok(cfg)
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e,
                      "unparsable config, using defaults");
                Ok(Config::default())
            }
        },
        Err(_) => Ok(Config::default()),
    }
}
