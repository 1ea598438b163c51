//! Application settings and paths.
//!
//! Settings come from an optional JSON file in the XDG config directory (or
//! one passed with `--config`). Command-line flags and environment variables
//! override individual fields.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{FlushCadence, DEFAULT_FLUSH_INTERVAL};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portledger)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portledger", "portledger")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Scan defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Host to scan.
    pub host: String,
    /// Port range, e.g. "1-9999".
    pub ports: String,
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,
    /// Result file, relative to the working directory unless absolute.
    pub results_file: PathBuf,
    /// Records between intermediate flushes.
    pub flush_interval: usize,
    /// Counter the flush interval applies to.
    pub flush_cadence: FlushCadence,
    /// Maximum probes per second, 0 for unlimited.
    pub rate_limit: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "portquiz.net".to_string(),
            ports: "1-9999".to_string(),
            timeout_ms: 400,
            results_file: PathBuf::from("scan_results.txt"),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_cadence: FlushCadence::StoreSize,
            rate_limit: 0,
        }
    }
}

impl AppSettings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing default settings file yields the built-in defaults, as does
    /// a system with no resolvable home directory; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Paths::new() {
                Ok(paths) => Self::load_optional(Some(paths.settings_file().as_path())),
                Err(e) => {
                    tracing::debug!(error = %e, "no config directory, using defaults");
                    Self::load_optional(None)
                }
            },
        }
    }

    /// Load `file` if it exists, otherwise fall back to the defaults.
    fn load_optional(file: Option<&Path>) -> ConfigResult<Self> {
        match file {
            Some(file) if file.exists() => Self::load_from(file),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }
}
