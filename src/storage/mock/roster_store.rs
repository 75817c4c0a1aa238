//! Mock RosterStore implementation for testing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{Student, StudentId};
use crate::storage::{Result, RosterStore, StorageError};

/// Mock roster backed by an ordered map.
#[derive(Default)]
pub struct MockRosterStore {
    students: RwLock<BTreeMap<StudentId, Student>>,
    fail_on_read: RwLock<bool>,
}

impl MockRosterStore {
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            students: RwLock::new(
                students
                    .into_iter()
                    .map(|s| (s.student_id.clone(), s))
                    .collect(),
            ),
            fail_on_read: RwLock::new(false),
        }
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("mock roster failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RosterStore for MockRosterStore {
    async fn find(&self, student_id: &StudentId) -> Result<Option<Student>> {
        self.check_read().await?;
        Ok(self.students.read().await.get(student_id).cloned())
    }

    async fn find_many(&self, student_ids: &[StudentId]) -> Result<Vec<Student>> {
        self.check_read().await?;
        let students = self.students.read().await;
        Ok(student_ids
            .iter()
            .filter_map(|id| students.get(id).cloned())
            .collect())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Student>> {
        self.check_read().await?;
        let needle = query.to_lowercase();
        let students = self.students.read().await;

        let mut hits: Vec<Student> = students
            .values()
            .filter(|s| {
                s.student_id.as_str() == query
                    || s.first_name.to_lowercase().contains(&needle)
                    || s.last_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            (&a.last_name, &a.first_name, &a.student_id)
                .cmp(&(&b.last_name, &b.first_name, &b.student_id))
        });
        hits.truncate(limit as usize);
        Ok(hits)
    }
}
