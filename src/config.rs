use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::GosqlfmtError;

/// Looked up at the walk root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "gosqlfmt.toml";

/// Settings read from `gosqlfmt.toml`. Every field has a default, so an
/// empty file (or no file) is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub walk: WalkConfig,
    pub formatter: FormatterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkConfig {
    /// File extension to select, without the dot.
    pub extension: String,
    /// Directory names skipped wherever they appear.
    pub skip_dirs: Vec<String>,
    /// Globs matched against paths relative to the walk root.
    pub exclude: Vec<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            extension: "go".into(),
            skip_dirs: vec!["vendor".into()],
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatterConfig {
    pub program: String,
    /// Passed before the staging file path, which always comes last.
    pub args: Vec<String>,
    /// Zero disables the limit.
    pub timeout_secs: u64,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            program: "pg_format".into(),
            args: vec!["--inplace".into(), "--comma-break".into(), "--tabs".into()],
            timeout_secs: 30,
        }
    }
}

impl FormatterConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self, GosqlfmtError> {
        let text = fs::read_to_string(path).map_err(|e| GosqlfmtError::ConfigInvalid {
            path: Some(path.to_path_buf()),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|reason| GosqlfmtError::ConfigInvalid {
            path: Some(path.to_path_buf()),
            reason,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.message().to_string())
    }

    /// Explicit file if given, else `gosqlfmt.toml` in `root` if present,
    /// else defaults.
    pub fn resolve(explicit: Option<&Path>, root: &Path) -> Result<Self, GosqlfmtError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match implicit_path(root) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

fn implicit_path(root: &Path) -> Option<PathBuf> {
    let dir = if root.is_dir() { root } else { root.parent()? };
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
