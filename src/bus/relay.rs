//! Post-commit claim relay.
//!
//! Callers report committed claim ids over a channel; the relay task then
//! reads every claim above its cursor in id order, which is commit order,
//! and publishes them. A periodic sweep picks up claims whose notice never
//! arrived, for example when the request that committed them was cancelled.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::ClaimBus;
use crate::config::MessagingConfig;
use crate::interfaces::{ClaimStore, RosterStore, StorageError};
use crate::model::{ClaimBroadcast, Student, StudentId};
use crate::notify::{confirmation_email, EmailDispatcher};

/// Pending commit notices held before new ones are coalesced away.
const NOTICE_CAPACITY: usize = 64;

/// Caller side of the relay.
#[derive(Clone)]
pub struct RelayHandle {
    notices: mpsc::Sender<i64>,
}

impl RelayHandle {
    /// Report a committed claim. Never blocks and never fails.
    ///
    /// A full queue already holds a pending wake-up that will read this
    /// claim too, so the notice is dropped then.
    pub fn notify_committed(&self, claim_id: i64) {
        match self.notices.try_send(claim_id) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(claim_id, "Relay busy, notice coalesced");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(claim_id, "Relay stopped, claim will not be broadcast");
            }
        }
    }
}

/// Reads committed claims in order and fans them out.
pub struct ClaimRelay {
    claims: Arc<dyn ClaimStore>,
    roster: Arc<dyn RosterStore>,
    bus: ClaimBus,
    emails: EmailDispatcher,
    cursor: i64,
    batch_size: u32,
}

impl ClaimRelay {
    /// Create a relay positioned after the latest committed claim.
    pub async fn new(
        claims: Arc<dyn ClaimStore>,
        roster: Arc<dyn RosterStore>,
        bus: ClaimBus,
        emails: EmailDispatcher,
        batch_size: u32,
    ) -> Result<Self, StorageError> {
        let cursor = claims.latest_id().await?.unwrap_or(0);
        Ok(Self {
            claims,
            roster,
            bus,
            emails,
            cursor,
            batch_size: batch_size.max(1),
        })
    }

    /// Id of the last claim published.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Spawn the relay loop.
    ///
    /// The task ends when every `RelayHandle` is dropped.
    pub fn start(mut self, config: &MessagingConfig) -> (RelayHandle, JoinHandle<()>) {
        let (sender, mut notices) = mpsc::channel::<i64>(NOTICE_CAPACITY);
        let sweep_every = Duration::from_millis(config.relay_sweep_interval_ms.max(1));

        let task = tokio::spawn(async move {
            info!(cursor = self.cursor, "Claim relay started");
            let mut sweep = tokio::time::interval(sweep_every);
            sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    notice = notices.recv() => match notice {
                        Some(claim_id) => {
                            debug!(claim_id, "Commit notice received");
                        }
                        None => break,
                    },
                    _ = sweep.tick() => {}
                }

                if let Err(e) = self.drain().await {
                    error!(error = %e, cursor = self.cursor, "Relay pass failed, will retry");
                }
            }

            // Deliver anything committed before the last handle went away.
            if let Err(e) = self.drain().await {
                error!(error = %e, cursor = self.cursor, "Final relay pass failed");
            }
            info!(cursor = self.cursor, "Claim relay stopped");
        });

        (RelayHandle { notices: sender }, task)
    }

    /// Publish every committed claim above the cursor, in id order.
    ///
    /// Returns how many claims were published.
    pub async fn drain(&mut self) -> Result<usize, StorageError> {
        let mut published = 0;

        loop {
            let batch = self.claims.claims_after(self.cursor, self.batch_size).await?;
            if batch.is_empty() {
                return Ok(published);
            }

            let ids: Vec<StudentId> = batch.iter().map(|c| c.student_id.clone()).collect();
            let students: Option<HashMap<StudentId, Student>> =
                match self.roster.find_many(&ids).await {
                    Ok(found) => Some(
                        found
                            .into_iter()
                            .map(|s| (s.student_id.clone(), s))
                            .collect(),
                    ),
                    Err(e) => {
                        warn!(
                            error = %e,
                            claims = batch.len(),
                            "Roster lookup failed, broadcasting without names and skipping email"
                        );
                        None
                    }
                };

            let full_batch = batch.len() as u32 == self.batch_size;
            for claim in batch {
                let student = students.as_ref().and_then(|s| s.get(&claim.student_id));

                self.bus.publish(ClaimBroadcast::from_claim(&claim, student));

                if let Some(message) = student.and_then(|s| confirmation_email(s, &claim)) {
                    self.emails.enqueue(message);
                }

                self.cursor = claim.id;
                published += 1;
            }

            if !full_batch {
                return Ok(published);
            }
        }
    }
}
