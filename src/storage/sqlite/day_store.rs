//! SQLite DayStore implementation.

use async_trait::async_trait;
use sea_query::{Expr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;

use crate::model::{Day, DaySettings, SettingsUpdate};
use crate::storage::schema::{Days, Settings, CURRENT_DAY_KEY, SETTINGS_VERSION_KEY};
use crate::storage::{DayStore, Result, StorageError};

/// SQLite implementation of DayStore.
pub struct SqliteDayStore {
    pool: SqlitePool,
}

impl SqliteDayStore {
    /// Create a new SQLite day store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read days and settings on one connection.
    async fn read_settings(conn: &mut SqliteConnection) -> Result<DaySettings> {
        let (sql, values) = Query::select()
            .columns([Days::DayNumber, Days::ItemOfTheDay])
            .from(Days::Table)
            .order_by(Days::DayNumber, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&mut *conn).await?;
        let days = rows
            .iter()
            .map(|row| Day {
                day_number: row.get::<i64, _>("day_number") as u32,
                item_of_the_day: row.get("item_of_the_day"),
            })
            .collect();

        let current_day = Self::read_setting(conn, CURRENT_DAY_KEY)
            .await?
            .and_then(|v| v.trim().parse::<u32>().ok());
        let version = Self::read_setting(conn, SETTINGS_VERSION_KEY)
            .await?
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Ok(DaySettings {
            version,
            days,
            current_day,
        })
    }

    async fn read_setting(conn: &mut SqliteConnection, key: &str) -> Result<Option<String>> {
        let (sql, values) = Query::select()
            .column(Settings::Value)
            .from(Settings::Table)
            .and_where(Expr::col(Settings::Key).eq(key))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(|row| row.get("setting_value")))
    }

    async fn write_setting(conn: &mut SqliteConnection, key: &str, value: &str) -> Result<()> {
        let (sql, values) = Query::insert()
            .into_table(Settings::Table)
            .columns([Settings::Key, Settings::Value])
            .values_panic([key.into(), value.into()])
            .on_conflict(
                OnConflict::column(Settings::Key)
                    .update_column(Settings::Value)
                    .to_owned(),
            )
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values).execute(&mut *conn).await?;
        Ok(())
    }

    async fn apply_update(conn: &mut SqliteConnection, update: &SettingsUpdate) -> Result<DaySettings> {
        let before = Self::read_settings(conn).await?;
        let existing: Vec<u32> = before.days.iter().map(|d| d.day_number).collect();
        update.validate(&existing).map_err(StorageError::Rejected)?;

        for day in &update.days {
            let (sql, values) = Query::insert()
                .into_table(Days::Table)
                .columns([Days::DayNumber, Days::ItemOfTheDay])
                .values_panic([day.day_number.into(), day.item_of_the_day.as_str().into()])
                .on_conflict(
                    OnConflict::column(Days::DayNumber)
                        .update_column(Days::ItemOfTheDay)
                        .to_owned(),
                )
                .build_sqlx(SqliteQueryBuilder);

            sqlx::query_with(&sql, values).execute(&mut *conn).await?;
        }

        match update.current_day {
            None => {}
            Some(Some(day)) => {
                Self::write_setting(conn, CURRENT_DAY_KEY, &day.to_string()).await?;
            }
            Some(None) => {
                let (sql, values) = Query::delete()
                    .from_table(Settings::Table)
                    .and_where(Expr::col(Settings::Key).eq(CURRENT_DAY_KEY))
                    .build_sqlx(SqliteQueryBuilder);
                sqlx::query_with(&sql, values).execute(&mut *conn).await?;
            }
        }

        let version = before.version + 1;
        Self::write_setting(conn, SETTINGS_VERSION_KEY, &version.to_string()).await?;

        Self::read_settings(conn).await
    }
}

#[async_trait]
impl DayStore for SqliteDayStore {
    async fn settings(&self) -> Result<DaySettings> {
        // Read inside a transaction so the pointer and the days come from
        // the same committed state.
        let mut tx = self.pool.begin().await?;
        let settings = Self::read_settings(&mut tx).await?;
        tx.commit().await?;
        Ok(settings)
    }

    async fn replace_settings(&self, update: &SettingsUpdate) -> Result<DaySettings> {
        // BEGIN IMMEDIATE acquires the write lock upfront, preventing deadlocks
        // when concurrent DEFERRED transactions race to upgrade from shared to exclusive.
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        match Self::apply_update(&mut conn, update).await {
            Ok(settings) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                info!(
                    version = settings.version,
                    current_day = ?settings.current_day,
                    days = settings.days.len(),
                    "Day settings replaced"
                );
                Ok(settings)
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }
}
