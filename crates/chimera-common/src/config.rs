//! Browser configuration.
//!
//! Every option has a default, so an empty JSON object (or no file at all)
//! yields the stock configuration:
//!
//! ```json
//! { "default_timeout": 5, "layout_margin_px": 8, "log_lines_to_show": 4 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file was read but is not a valid configuration.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Options recognized by the browser shell and the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Network timeout in seconds. Owned by the fetch layer; layout never
    /// reads it.
    pub default_timeout: u64,
    /// Spacing unit used throughout layout, in pixels.
    pub layout_margin_px: u32,
    /// Capacity of the diagnostics log.
    pub log_lines_to_show: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            default_timeout: 5,
            layout_margin_px: 8,
            log_lines_to_show: 4,
        }
    }
}

impl BrowserConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a JSON object of
    /// known options.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// The fetch timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout)
    }

    /// The layout margin in layout units.
    #[must_use]
    pub fn margin(&self) -> f32 {
        self.layout_margin_px as f32
    }
}
