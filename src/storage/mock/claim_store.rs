//! Mock ClaimStore implementation for testing.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{ClaimRecord, NewClaim, StudentId};
use crate::storage::{ClaimStore, Result, StorageError};

#[derive(Default)]
struct Ledger {
    next_id: i64,
    rows: Vec<ClaimRecord>,
    keys: HashSet<(StudentId, u32)>,
}

/// Mock claim store that keeps claims in memory.
///
/// The key check and the append happen under one write lock, which makes the
/// insert an atomic compare-and-insert just like the unique index does.
#[derive(Default)]
pub struct MockClaimStore {
    ledger: RwLock<Ledger>,
    fail_on_insert: RwLock<bool>,
    fail_on_read: RwLock<bool>,
}

impl MockClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    /// Number of stored claims.
    pub async fn len(&self) -> usize {
        self.ledger.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("mock read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClaimStore for MockClaimStore {
    async fn insert_if_absent(&self, claim: NewClaim) -> Result<Option<ClaimRecord>> {
        if *self.fail_on_insert.read().await {
            return Err(StorageError::Unavailable("mock insert failure".to_string()));
        }

        let mut ledger = self.ledger.write().await;
        if !ledger
            .keys
            .insert((claim.student_id.clone(), claim.day_number))
        {
            return Ok(None);
        }

        ledger.next_id += 1;
        let record = claim.committed(ledger.next_id);
        ledger.rows.push(record.clone());
        Ok(Some(record))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ClaimRecord>> {
        self.check_read().await?;
        let ledger = self.ledger.read().await;
        Ok(ledger
            .rows
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn claimed_on_day(
        &self,
        day_number: u32,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        self.check_read().await?;
        let ledger = self.ledger.read().await;
        Ok(ledger
            .rows
            .iter()
            .filter(|c| c.day_number == day_number && student_ids.contains(&c.student_id))
            .map(|c| (c.student_id.clone(), c.officer_name.clone()))
            .collect())
    }

    async fn claims_after(&self, after_id: i64, limit: u32) -> Result<Vec<ClaimRecord>> {
        self.check_read().await?;
        let ledger = self.ledger.read().await;
        Ok(ledger
            .rows
            .iter()
            .filter(|c| c.id > after_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn latest_id(&self) -> Result<Option<i64>> {
        self.check_read().await?;
        Ok(self.ledger.read().await.rows.last().map(|c| c.id))
    }

    async fn claims_for_student(&self, student_id: &StudentId) -> Result<Vec<ClaimRecord>> {
        self.check_read().await?;
        let ledger = self.ledger.read().await;
        Ok(ledger
            .rows
            .iter()
            .filter(|c| &c.student_id == student_id)
            .cloned()
            .collect())
    }
}
