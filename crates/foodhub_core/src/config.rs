//! Process configuration read from `FOODHUB_*` environment variables.
//!
//! # Responsibility
//! - Resolve database path, logging and identifier settings once at startup.
//! - Apply the process-wide parts (id scheme, logger).
//!
//! # Invariants
//! - Missing variables fall back to defaults; present but invalid values
//!   are rejected instead of silently ignored.
//! - `FOODHUB_LOG_DIR` must be absolute when set.

use crate::logging::{default_log_level, init_logging, LoggingError};
use crate::model::identity::{configure_id_scheme, IdScheme, IdSchemeError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_VAR: &str = "FOODHUB_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "FOODHUB_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "FOODHUB_LOG_DIR";
pub const ID_SCHEME_VAR: &str = "FOODHUB_ID_SCHEME";

pub const DEFAULT_DB_PATH: &str = "foodhub.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is present but blank.
    EmptyValue { key: &'static str },
    InvalidIdScheme(String),
    RelativeLogDir(String),
    /// The id scheme was already fixed differently in this process.
    IdSchemeConflict(IdSchemeError),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue { key } => write!(f, "{key} is set but empty"),
            Self::InvalidIdScheme(value) => write!(
                f,
                "{ID_SCHEME_VAR} must be `millis` or `uuid`, got `{value}`"
            ),
            Self::RelativeLogDir(value) => {
                write!(f, "{LOG_DIR_VAR} must be an absolute path, got `{value}`")
            }
            Self::IdSchemeConflict(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IdSchemeConflict(err) => Some(err),
            Self::Logging(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IdSchemeError> for ConfigError {
    fn from(value: IdSchemeError) -> Self {
        Self::IdSchemeConflict(value)
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodhubConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub id_scheme: IdScheme,
}

impl Default for FoodhubConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            id_scheme: IdScheme::default(),
        }
    }
}

impl FoodhubConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue { key }),
                Some(value) => Ok(Some(value.trim().to_string())),
            }
        };

        let mut config = Self::default();
        if let Some(db_path) = read(DB_PATH_VAR)? {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = read(LOG_LEVEL_VAR)? {
            config.log_level = level;
        }
        if let Some(log_dir) = read(LOG_DIR_VAR)? {
            if !Path::new(&log_dir).is_absolute() {
                return Err(ConfigError::RelativeLogDir(log_dir));
            }
            config.log_dir = Some(PathBuf::from(log_dir));
        }
        if let Some(scheme) = read(ID_SCHEME_VAR)? {
            config.id_scheme =
                IdScheme::parse(&scheme).ok_or(ConfigError::InvalidIdScheme(scheme))?;
        }
        Ok(config)
    }

    /// Fixes the id scheme and starts file logging when a directory is set.
    ///
    /// Must run before the first record is prepared for insert.
    pub fn apply(&self) -> Result<(), ConfigError> {
        configure_id_scheme(self.id_scheme)?;
        if let Some(log_dir) = &self.log_dir {
            init_logging(&self.log_level, &log_dir.to_string_lossy())?;
        }
        Ok(())
    }
}
