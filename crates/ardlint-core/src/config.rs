//! Configuration file model (`ardlint.toml`).

use crate::data::IndexSource;
use crate::mode::{Compliance, LibraryManagerMode};
use crate::project::ProjectType;
use crate::report::FailOn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for ardlint.
///
/// Every field is optional; unset fields fall back to command-line defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Lint settings.
    #[serde(default)]
    pub lint: LintConfig,

    /// Library Manager index settings.
    #[serde(default)]
    pub library_index: LibraryIndexConfig,

    /// HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// `[lint]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintConfig {
    /// Compliance level.
    #[serde(default)]
    pub compliance: Option<Compliance>,

    /// Library Manager context.
    #[serde(default)]
    pub library_manager: Option<LibraryManagerMode>,

    /// Official Arduino project.
    #[serde(default)]
    pub official: Option<bool>,

    /// Search target folders recursively.
    #[serde(default)]
    pub recursive: Option<bool>,

    /// Project type filter.
    #[serde(default)]
    pub project_type: Option<ProjectType>,

    /// Lowest failing severity.
    #[serde(default)]
    pub fail_on: Option<FailOn>,
}

/// `[library_index]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryIndexConfig {
    /// URL or local path of the index.
    #[serde(default)]
    pub source: Option<String>,
}

impl LibraryIndexConfig {
    /// The configured index source, or the default download URL.
    #[must_use]
    pub fn index_source(&self) -> IndexSource {
        self.source
            .as_deref()
            .map(IndexSource::parse)
            .unwrap_or_default()
    }
}

/// `[http]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds, clamped to 1..=30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// The effective request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 30))
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
