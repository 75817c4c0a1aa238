//! Mock DayStore implementation for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{Day, DaySettings, SettingsUpdate};
use crate::storage::{DayStore, Result, StorageError};

/// Mock day store holding one settings snapshot in memory.
#[derive(Default)]
pub struct MockDayStore {
    settings: RwLock<DaySettings>,
    fail_on_read: RwLock<bool>,
}

impl MockDayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the given days and pointer, without validation.
    ///
    /// Lets tests build configurations the admin path would refuse, such as
    /// a pointer to a day that does not exist.
    pub fn with_settings(days: Vec<Day>, current_day: Option<u32>) -> Self {
        Self {
            settings: RwLock::new(DaySettings {
                version: 1,
                days,
                current_day,
            }),
            fail_on_read: RwLock::new(false),
        }
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }
}

#[async_trait]
impl DayStore for MockDayStore {
    async fn settings(&self) -> Result<DaySettings> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("mock read failure".to_string()));
        }
        Ok(self.settings.read().await.clone())
    }

    async fn replace_settings(&self, update: &SettingsUpdate) -> Result<DaySettings> {
        let mut settings = self.settings.write().await;
        let existing: Vec<u32> = settings.days.iter().map(|d| d.day_number).collect();
        update.validate(&existing).map_err(StorageError::Rejected)?;

        for day in &update.days {
            match settings
                .days
                .iter_mut()
                .find(|d| d.day_number == day.day_number)
            {
                Some(stored) => stored.item_of_the_day = day.item_of_the_day.clone(),
                None => settings.days.push(day.clone()),
            }
        }
        settings.days.sort_by_key(|d| d.day_number);
        if let Some(current_day) = update.current_day {
            settings.current_day = current_day;
        }
        settings.version += 1;

        Ok(settings.clone())
    }
}
