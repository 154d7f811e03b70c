use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::{ErrorCode, NavError};
use crate::host::MemoryHistory;
use crate::link::TRACE_VIEWER_PATH;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_trace_viewer_path")]
    pub trace_viewer_path: String,
    /// Keep the active `q` filter when following links into a test.
    #[serde(default = "default_true")]
    pub carry_filter: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            trace_viewer_path: default_trace_viewer_path(),
            carry_filter: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Page the in-memory host starts at.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl NavConfig {
    /// The configured base URL, parsed.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidBaseUrl`] when `history.base_url` is not
    /// an absolute URL.
    pub fn base_url(&self) -> Result<Url, NavError> {
        Url::parse(&self.history.base_url).map_err(|err| NavError::InvalidBaseUrl {
            url: self.history.base_url.clone(),
            reason: err.to_string(),
        })
    }

    /// An in-memory host positioned at the configured base URL.
    ///
    /// # Errors
    ///
    /// See [`NavConfig::base_url`].
    pub fn memory_history(&self) -> Result<MemoryHistory, NavError> {
        Ok(MemoryHistory::new(self.base_url()?))
    }
}

/// Load configuration from `path`, falling back to defaults when absent.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or is not valid TOML.
pub fn load_config(path: &Path) -> Result<NavConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(NavConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<NavConfig>(&content).with_context(|| {
        format!(
            "{}: Failed to parse {}",
            ErrorCode::ConfigParseError,
            path.display()
        )
    })
}

const fn default_true() -> bool {
    true
}

fn default_trace_viewer_path() -> String {
    TRACE_VIEWER_PATH.to_string()
}

fn default_base_url() -> String {
    "http://localhost:9323/".to_string()
}
