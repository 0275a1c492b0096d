//! Finding and loading the server configuration file.

use crate::error::{ConfigError, ConfigResult};
use directories::BaseDirs;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Candidate file names, in lookup order.
pub const CANDIDATES: [&str; 3] = ["server.properties", "config.yml", "velocity.toml"];

/// The raw content of one located configuration file.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    name: String,
    bytes: Vec<u8>,
}

impl ConfigDocument {
    /// Wrap in-memory content under a display name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a document from disk.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let bytes = fs::read(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// Identity used in error messages (usually the file path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Resolve `path` to a configuration file.
///
/// A path naming a file is returned as-is. Otherwise `path` is treated as a
/// directory and searched for each of [`CANDIDATES`] in order.
pub fn locate(path: &Path) -> ConfigResult<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    for name in CANDIDATES {
        let candidate = path.join(name);
        if candidate.exists() {
            debug!("found {}", candidate.display());
            return Ok(candidate);
        }
    }

    Err(ConfigError::NotFound {
        path: path.to_path_buf(),
    })
}

/// Default search root: the user's home directory, or `.` without one.
pub fn default_search_root() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
