//! Claim ledger.
//!
//! The system of record for claims. At most one claim exists per
//! `(student_id, day_number)`; the store's conditional insert is the only
//! arbiter, so concurrent attempts for the same key need no lock here.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::interfaces::{ClaimStore, DayStore, RosterStore, StorageError};
use crate::model::{ClaimRecord, ClaimStatus, Day, DaySettings, InvalidStudentId, NewClaim, StudentId};
use crate::storage::Storage;

/// Upper bound for `recent_claims`.
pub const MAX_RECENT_LIMIT: u32 = 100;

/// Errors returned by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Current day is not configured.")]
    Configuration,

    #[error("Student has already claimed for today.")]
    AlreadyClaimed {
        student_id: StudentId,
        day_number: u32,
    },

    #[error("Student {0} is not on the roster.")]
    NotFound(StudentId),

    #[error(transparent)]
    InvalidStudentId(#[from] InvalidStudentId),

    #[error("Officer name is required.")]
    MissingOfficer,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Clamp a requested feed size to `1..=MAX_RECENT_LIMIT`.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_RECENT_LIMIT)
}

/// Resolve the active day of a settings snapshot.
pub fn active_day_of(settings: &DaySettings) -> Result<Day> {
    settings.active_day().cloned().ok_or(LedgerError::Configuration)
}

/// Records claims and answers claim-state questions.
#[derive(Clone)]
pub struct ClaimLedger {
    claims: Arc<dyn ClaimStore>,
    days: Arc<dyn DayStore>,
    roster: Arc<dyn RosterStore>,
}

impl ClaimLedger {
    pub fn new(storage: &Storage) -> Self {
        Self {
            claims: storage.claims.clone(),
            days: storage.days.clone(),
            roster: storage.roster.clone(),
        }
    }

    /// The day claims are currently recorded against.
    ///
    /// Fails with `Configuration` when the pointer is unset or dangling.
    pub async fn resolve_active_day(&self) -> Result<Day> {
        let settings = self.days.settings().await?;
        active_day_of(&settings)
    }

    /// Record a claim for the active day.
    ///
    /// The day configuration is read once; the item snapshot on the returned
    /// record comes from that same read.
    #[tracing::instrument(name = "ledger.attempt_claim", skip_all, fields(student_id = %student_id.trim()))]
    pub async fn attempt_claim(&self, student_id: &str, officer_name: &str) -> Result<ClaimRecord> {
        let (student_id, officer_name) = Self::check_input(student_id, officer_name)?;

        let settings = self.days.settings().await?;
        let day = active_day_of(&settings)?;
        debug!(
            day_number = day.day_number,
            settings_version = settings.version,
            "Resolved active day"
        );

        self.claim_checked(&day, student_id, officer_name).await
    }

    /// Record a claim against an explicitly supplied day.
    pub async fn attempt_claim_on(
        &self,
        day: &Day,
        student_id: &str,
        officer_name: &str,
    ) -> Result<ClaimRecord> {
        let (student_id, officer_name) = Self::check_input(student_id, officer_name)?;
        self.claim_checked(day, student_id, officer_name).await
    }

    fn check_input(student_id: &str, officer_name: &str) -> Result<(StudentId, String)> {
        let officer_name = officer_name.trim();
        if officer_name.is_empty() {
            return Err(LedgerError::MissingOfficer);
        }
        let student_id = StudentId::parse(student_id)?;
        Ok((student_id, officer_name.to_string()))
    }

    async fn claim_checked(
        &self,
        day: &Day,
        student_id: StudentId,
        officer_name: String,
    ) -> Result<ClaimRecord> {
        if self.roster.find(&student_id).await?.is_none() {
            return Err(LedgerError::NotFound(student_id));
        }

        let claim = NewClaim {
            student_id,
            day_number: day.day_number,
            officer_name,
            item_claimed: day.item_of_the_day.clone(),
            claimed_at: Utc::now(),
        };
        let key = (claim.student_id.clone(), claim.day_number);

        match self.claims.insert_if_absent(claim).await? {
            Some(record) => {
                info!(
                    claim_id = record.id,
                    student_id = %record.student_id,
                    day_number = record.day_number,
                    officer = %record.officer_name,
                    "Claim recorded"
                );
                Ok(record)
            }
            None => {
                debug!(student_id = %key.0, day_number = key.1, "Duplicate claim rejected");
                Err(LedgerError::AlreadyClaimed {
                    student_id: key.0,
                    day_number: key.1,
                })
            }
        }
    }

    /// Committed claims, newest first. `limit` is clamped to `1..=100`.
    pub async fn recent_claims(&self, limit: u32) -> Result<Vec<ClaimRecord>> {
        Ok(self.claims.recent(clamp_limit(limit)).await?)
    }

    /// Claim state of each student on the active day.
    pub async fn claim_status_for(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, ClaimStatus>> {
        let day = self.resolve_active_day().await?;
        self.claim_status_on(day.day_number, student_ids).await
    }

    /// Claim state of each student on a given day.
    pub async fn claim_status_on(
        &self,
        day_number: u32,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, ClaimStatus>> {
        let claimed = self.claims.claimed_on_day(day_number, student_ids).await?;

        Ok(student_ids
            .iter()
            .map(|id| {
                let status = match claimed.get(id) {
                    Some(officer_name) => ClaimStatus::ClaimedBy {
                        officer_name: officer_name.clone(),
                    },
                    None => ClaimStatus::Unclaimed,
                };
                (id.clone(), status)
            })
            .collect())
    }
}
