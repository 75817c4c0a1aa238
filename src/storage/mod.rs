//! Storage implementations.

use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;

pub mod helpers;
pub mod mock;
pub mod schema;
pub mod sqlite;

pub use crate::interfaces::{ClaimStore, DayStore, Result, RosterStore, StorageError};
pub use sqlite::{SqliteClaimStore, SqliteDayStore, SqliteRosterStore};

/// The stores the rest of the application works against.
#[derive(Clone)]
pub struct Storage {
    pub claims: Arc<dyn ClaimStore>,
    pub days: Arc<dyn DayStore>,
    pub roster: Arc<dyn RosterStore>,
}

/// Initialize SQLite storage from configuration.
///
/// Opens the pool, creates the schema and imports the roster seed when one
/// is configured.
pub async fn init_storage(config: &StorageConfig) -> Result<Storage> {
    info!(
        path = %config.path,
        busy_timeout_ms = config.busy_timeout_ms,
        "Opening storage"
    );

    let pool = sqlite::connect(config).await?;
    sqlite::init_schema(&pool).await?;

    let roster = SqliteRosterStore::new(pool.clone());
    if let Some(seed) = &config.roster_seed {
        roster.import_yaml(seed).await?;
    }

    Ok(Storage {
        claims: Arc::new(SqliteClaimStore::new(pool.clone())),
        days: Arc::new(SqliteDayStore::new(pool)),
        roster: Arc::new(roster),
    })
}
