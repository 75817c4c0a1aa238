//! Day configuration interface.

use async_trait::async_trait;

use super::claim_store::Result;
use crate::model::{DaySettings, SettingsUpdate};

/// Interface for the day configuration written by the admin path.
///
/// Implementations:
/// - `SqliteDayStore`: SQLite storage
/// - `MockDayStore`: In-memory mock for testing
#[async_trait]
pub trait DayStore: Send + Sync {
    /// Read the whole configuration as one consistent snapshot.
    async fn settings(&self) -> Result<DaySettings>;

    /// Upsert the given days, apply the pointer change if one is given, and
    /// bump the version.
    ///
    /// Runs as one transaction. The update is validated against the stored
    /// days inside that transaction; invalid updates fail with
    /// `StorageError::Rejected` and write nothing.
    async fn replace_settings(&self, update: &SettingsUpdate) -> Result<DaySettings>;
}
