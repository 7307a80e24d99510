//! Storage configuration, loadable from a TOML section.

use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{StorageError, StorageResult};

fn default_path() -> PathBuf {
    PathBuf::from("warden.db")
}

fn default_busy_timeout_ms() -> u32 {
    5_000
}

/// Connection settings for the embedded database.
///
/// `read_pool_size` of 0 (the default) routes reads through the single
/// write connection, capping the store at one concurrent connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub read_pool_size: usize,
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_path(),
            read_pool_size: 0,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn from_toml(content: &str) -> StorageResult<Self> {
        toml::from_str(content).map_err(|e| StorageError::Config(e.to_string()))
    }
}
