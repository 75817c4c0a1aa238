//! SQLite implementations of storage interfaces.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::schema::{CREATE_CLAIMS_TABLE, CREATE_DAY_TABLES, CREATE_STUDENTS_TABLE};
use super::Result;
use crate::config::StorageConfig;

mod claim_store;
mod day_store;
mod roster_store;

pub use claim_store::SqliteClaimStore;
pub use day_store::SqliteDayStore;
pub use roster_store::SqliteRosterStore;

/// Path value selecting a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Open a connection pool for the configured database file.
///
/// An in-memory database only exists per connection, so the pool is pinned
/// to a single connection in that case.
pub async fn connect(config: &StorageConfig) -> Result<SqlitePool> {
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);

    if config.path == IN_MEMORY_PATH {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.busy_timeout(busy_timeout);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        return Ok(pool);
    }

    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;

    Ok(pool)
}

/// Initialize the database schema.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(CREATE_STUDENTS_TABLE).execute(pool).await?;
    sqlx::raw_sql(CREATE_DAY_TABLES).execute(pool).await?;
    sqlx::raw_sql(CREATE_CLAIMS_TABLE).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
