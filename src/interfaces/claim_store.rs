//! Claim storage interface.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::model::{ClaimRecord, InvalidStudentId, NewClaim, StudentId};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Corrupt row: {0}")]
    InvalidStudentId(#[from] InvalidStudentId),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster seed error: {0}")]
    Seed(#[from] serde_yaml::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Interface for claim persistence.
///
/// The `(student_id, day_number)` pair is the unique key for stored claims.
/// Ids are assigned in commit order, so ascending id order is commit order.
///
/// Implementations:
/// - `SqliteClaimStore`: SQLite storage
/// - `MockClaimStore`: In-memory mock for testing
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Insert the claim unless one already exists for its key.
    ///
    /// The existence check and the insert are a single atomic operation.
    /// Returns `None` when the key was already taken; nothing is written then.
    async fn insert_if_absent(&self, claim: NewClaim) -> Result<Option<ClaimRecord>>;

    /// Newest claims first, at most `limit`.
    async fn recent(&self, limit: u32) -> Result<Vec<ClaimRecord>>;

    /// Officer name per claimed student on `day_number`, restricted to `student_ids`.
    async fn claimed_on_day(
        &self,
        day_number: u32,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>>;

    /// Claims with id greater than `after_id`, ascending by id, at most `limit`.
    async fn claims_after(&self, after_id: i64, limit: u32) -> Result<Vec<ClaimRecord>>;

    /// Highest committed claim id, if any claim exists.
    async fn latest_id(&self) -> Result<Option<i64>>;

    /// Every claim of a student across all days, ascending by id.
    async fn claims_for_student(&self, student_id: &StudentId) -> Result<Vec<ClaimRecord>>;
}
