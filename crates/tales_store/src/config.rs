//! Store configuration loaded from the process environment.
//!
//! # Invariants
//! - A parsed `StoreConfig` always names a complete backend; missing required
//!   values are rejected here rather than at connect time.

use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_DRIVER: &str = "TALES_DB_DRIVER";
pub const ENV_SQLITE_PATH: &str = "SQLITE_PATH";
pub const ENV_MONGODB_URI: &str = "MONGODB_CONNECTION_STRING";
pub const ENV_MONGODB_DATABASE: &str = "MONGODB_DATABASE";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TALES_LOG_DIR";

const DEFAULT_SQLITE_PATH: &str = "talesmud.db";
const DEFAULT_MONGODB_DATABASE: &str = "talesmud";
/// `SQLITE_PATH` value selecting a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown database driver `{0}`; expected sqlite|mongodb")]
    UnknownDriver(String),
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

/// Storage engine selection with its connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite { path: String },
    MongoDb { uri: String, database: String },
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::MongoDb { .. } => "mongodb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let driver = get(ENV_DB_DRIVER).unwrap_or_else(|| "sqlite".to_string());
        let backend = match driver.to_ascii_lowercase().as_str() {
            "sqlite" => StoreBackend::Sqlite {
                path: get(ENV_SQLITE_PATH).unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()),
            },
            "mongodb" | "mongo" => StoreBackend::MongoDb {
                uri: get(ENV_MONGODB_URI).ok_or(ConfigError::Missing(ENV_MONGODB_URI))?,
                database: get(ENV_MONGODB_DATABASE)
                    .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
            },
            _ => return Err(ConfigError::UnknownDriver(driver)),
        };

        Ok(Self {
            backend,
            log_level: get(ENV_LOG_LEVEL),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}
