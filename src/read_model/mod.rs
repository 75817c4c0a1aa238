//! Read-model joins for the officer screens.
//!
//! Student search annotated with active-day claim state, and the recent
//! claims feed with display names.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::interfaces::RosterStore;
use crate::ledger::{ClaimLedger, Result};
use crate::model::{ClaimStatus, RecentClaim, StudentId, StudentMatch};

/// Queries shorter than this return no rows.
pub const MIN_QUERY_LEN: usize = 2;
/// Feed size when the caller does not ask for one.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Joins the roster with the ledger.
#[derive(Clone)]
pub struct ReadModel {
    ledger: ClaimLedger,
    roster: Arc<dyn RosterStore>,
    max_results: u32,
}

impl ReadModel {
    pub fn new(ledger: ClaimLedger, roster: Arc<dyn RosterStore>, max_results: u32) -> Self {
        Self {
            ledger,
            roster,
            max_results,
        }
    }

    /// Search the roster by exact id or name fragment.
    ///
    /// Fails with `Configuration` when no active day is set, even if the
    /// query is too short to match anything.
    pub async fn search(&self, query: &str) -> Result<Vec<StudentMatch>> {
        let day = self.ledger.resolve_active_day().await?;

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let students = self.roster.search(query, self.max_results).await?;
        let ids: Vec<StudentId> = students.iter().map(|s| s.student_id.clone()).collect();
        let status = self.ledger.claim_status_on(day.day_number, &ids).await?;

        debug!(
            query,
            day_number = day.day_number,
            matches = students.len(),
            "Student search"
        );

        Ok(students
            .into_iter()
            .map(|student| {
                let state = status
                    .get(&student.student_id)
                    .cloned()
                    .unwrap_or(ClaimStatus::Unclaimed);
                StudentMatch::new(student, &state)
            })
            .collect())
    }

    /// Recent claims, newest first, with the student's name.
    ///
    /// Names are empty for students no longer on the roster.
    pub async fn recent_feed(&self, limit: u32) -> Result<Vec<RecentClaim>> {
        let claims = self.ledger.recent_claims(limit).await?;

        let ids: Vec<StudentId> = claims.iter().map(|c| c.student_id.clone()).collect();
        let names: HashMap<StudentId, (String, String)> = self
            .roster
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|s| (s.student_id, (s.first_name, s.last_name)))
            .collect();

        Ok(claims
            .into_iter()
            .map(|claim| {
                let (first_name, last_name) =
                    names.get(&claim.student_id).cloned().unwrap_or_default();
                RecentClaim {
                    claim,
                    first_name,
                    last_name,
                }
            })
            .collect())
    }
}
