//! TOML configuration for lookups, storage and logging.
//!
//! # Responsibility
//! - Parse and validate `tdih.toml`-style configuration.
//! - Turn configuration sections into the values the core consumes
//!   (`CandidateFilter`, connections, logging init).
//!
//! # Invariants
//! - Every field has a default; an empty document is a valid configuration.
//! - A validated configuration never carries `limit = 0` or blank content types.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, init_logging};
use crate::model::event::CONTENT_TYPE_EVENT;
use crate::repo::event_repo::CandidateFilter;
use crate::tdih::ranker::EventOrder;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TdihConfig {
    pub retrieval: RetrievalConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

/// Lookup behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Content types offered to the matcher. Empty means every type.
    pub content_types: Vec<String>,
    pub published_only: bool,
    /// Maximum number of ranked items returned by day lookups.
    pub limit: Option<usize>,
    pub order: EventOrder,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            content_types: vec![CONTENT_TYPE_EVENT.to_string()],
            published_only: true,
            limit: None,
            order: EventOrder::default(),
        }
    }
}

impl RetrievalConfig {
    /// Candidate query derived from this section.
    pub fn candidate_filter(&self) -> CandidateFilter {
        CandidateFilter {
            content_types: self.content_types.clone(),
            published_only: self.published_only,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == Some(0) {
            return Err(ConfigError::Invalid(
                "retrieval.limit must be greater than zero".to_string(),
            ));
        }
        if self
            .content_types
            .iter()
            .any(|content_type| content_type.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "retrieval.content_types cannot contain blank values".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging bootstrap options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory. File logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Starts file logging when a directory is configured.
    ///
    /// Returns `Ok(false)` when no directory is set.
    pub fn init(&self) -> Result<bool, String> {
        let Some(dir) = self.dir.as_ref() else {
            return Ok(false);
        };
        let dir = dir
            .to_str()
            .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", dir.display()))?;
        init_logging(&self.level, dir)?;
        Ok(true)
    }
}

/// Event store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file. In-memory storage when unset.
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Opens and migrates the configured database.
    pub fn open(&self) -> DbResult<Connection> {
        match self.db_path.as_ref() {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}

impl TdihConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TdihConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retrieval.validate()
    }
}
