//! Test utilities and fixtures.
//!
//! In-memory SQLite pools and a small roster shared by unit tests across
//! modules.

use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::model::{Day, SettingsUpdate, Student, StudentId};
use crate::storage::sqlite::{self, SqliteClaimStore, SqliteDayStore, SqliteRosterStore};
use crate::storage::Storage;

/// Fresh in-memory database with the schema applied.
pub async fn memory_pool() -> SqlitePool {
    let opts = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("failed to create in-memory pool");

    sqlite::init_schema(&pool)
        .await
        .expect("failed to init schema");
    pool
}

pub fn sid(raw: &str) -> StudentId {
    StudentId::parse(raw).expect("valid student id")
}

pub fn student(id: &str, first: &str, last: &str) -> Student {
    Student {
        student_id: sid(id),
        first_name: first.to_string(),
        middle_name: None,
        last_name: last.to_string(),
        email: format!("{}@students.example.edu", id),
        program: "BSCS".to_string(),
    }
}

/// A handful of roster entries with overlapping name fragments.
pub fn sample_students() -> Vec<Student> {
    vec![
        student("1001", "Ana", "Reyes"),
        student("1002", "Mark", "Anderson"),
        student("1003", "Joanna", "Cruz"),
        student("1004", "Paolo", "Santos"),
        student("2001", "Danica", "Lim"),
    ]
}

pub fn day(day_number: u32, item: &str) -> Day {
    Day {
        day_number,
        item_of_the_day: item.to_string(),
    }
}

/// SQLite-backed storage with the sample roster, three days and day 1 active.
pub async fn seeded_storage() -> (SqlitePool, Storage) {
    let pool = memory_pool().await;

    let roster = Arc::new(SqliteRosterStore::new(pool.clone()));
    roster
        .upsert(&sample_students())
        .await
        .expect("failed to seed roster");

    let days = Arc::new(SqliteDayStore::new(pool.clone()));
    crate::interfaces::DayStore::replace_settings(
        days.as_ref(),
        &SettingsUpdate {
            days: vec![day(1, "Cookies"), day(2, "Hot Chocolate"), day(3, "Candy Canes")],
            current_day: Some(Some(1)),
        },
    )
    .await
    .expect("failed to seed days");

    let storage = Storage {
        claims: Arc::new(SqliteClaimStore::new(pool.clone())),
        days,
        roster,
    };

    (pool, storage)
}

/// Mailer that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: tokio::sync::Mutex<Vec<crate::interfaces::EmailMessage>>,
    fail: std::sync::atomic::AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<crate::interfaces::EmailMessage> {
        self.sent.lock().await.clone()
    }

    /// Poll until at least `count` messages were handed over, or give up after a second.
    pub async fn wait_for(&self, count: usize) -> Vec<crate::interfaces::EmailMessage> {
        for _ in 0..100 {
            let sent = self.sent().await;
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.sent().await
    }
}

#[async_trait::async_trait]
impl crate::interfaces::Mailer for RecordingMailer {
    async fn send(
        &self,
        message: &crate::interfaces::EmailMessage,
    ) -> Result<(), crate::interfaces::MailError> {
        self.sent.lock().await.push(message.clone());
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::interfaces::MailError::Unavailable(
                "recording mailer set to fail".to_string(),
            ));
        }
        Ok(())
    }
}
