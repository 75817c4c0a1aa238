//! Roster lookup interface.

use async_trait::async_trait;

use super::claim_store::Result;
use crate::model::{Student, StudentId};

/// Read-only access to the student roster.
///
/// Implementations:
/// - `SqliteRosterStore`: SQLite storage
/// - `MockRosterStore`: In-memory mock for testing
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Look up a single student.
    async fn find(&self, student_id: &StudentId) -> Result<Option<Student>>;

    /// Look up several students; unknown ids are skipped.
    async fn find_many(&self, student_ids: &[StudentId]) -> Result<Vec<Student>>;

    /// Students whose id equals `query` or whose first or last name contains
    /// it, case-insensitively. Ordered by last name, first name, id.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Student>>;
}
