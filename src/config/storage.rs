//! Storage configuration types.

use serde::Deserialize;

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path, or `:memory:`.
    pub path: String,
    /// Pool size for file-backed databases.
    pub max_connections: u32,
    /// How long a writer waits for the database lock before failing.
    pub busy_timeout_ms: u64,
    /// Optional YAML roster imported at startup.
    pub roster_seed: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./data/tinsel.db".to_string(),
            max_connections: 8,
            busy_timeout_ms: 500,
            roster_seed: None,
        }
    }
}

impl StorageConfig {
    /// In-memory database, mostly for tests and demos.
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            ..Self::default()
        }
    }
}
