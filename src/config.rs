//! Coordinator configuration.
//!
//! Loaded from an optional TOML file; every key has a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// How a failing copy provider affects the other providers' data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyFailurePolicy {
    /// Drop only the failing provider's contribution.
    #[default]
    Isolate,
    /// Any failure discards every contribution for that copy.
    AbortAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub copy_failure: CopyFailurePolicy,
    /// Insert `text/plain` when no paste provider produced an edit.
    pub plain_text_fallback: bool,
    /// Bound on waiting for the pending copy result during a paste.
    /// `None` waits indefinitely.
    pub copy_wait_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            copy_failure: CopyFailurePolicy::Isolate,
            plain_text_fallback: true,
            copy_wait_timeout_ms: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn copy_wait_timeout(&self) -> Option<Duration> {
        self.copy_wait_timeout_ms.map(Duration::from_millis)
    }
}
