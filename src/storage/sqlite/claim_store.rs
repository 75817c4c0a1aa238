//! SQLite ClaimStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_query::{Expr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::model::{ClaimRecord, NewClaim, StudentId};
use crate::storage::helpers::{format_timestamp, parse_timestamp};
use crate::storage::schema::Claims;
use crate::storage::{ClaimStore, Result};

const CLAIM_COLUMNS: [Claims; 6] = [
    Claims::Id,
    Claims::StudentId,
    Claims::DayNumber,
    Claims::OfficerName,
    Claims::ItemClaimed,
    Claims::ClaimedAt,
];

/// SQLite implementation of ClaimStore.
pub struct SqliteClaimStore {
    pool: SqlitePool,
}

impl SqliteClaimStore {
    /// Create a new SQLite claim store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn claim_from_row(row: &SqliteRow) -> Result<ClaimRecord> {
        let student_id: String = row.get("student_id");
        let day_number: i64 = row.get("day_number");
        let claimed_at: String = row.get("claimed_at");

        Ok(ClaimRecord {
            id: row.get("id"),
            student_id: StudentId::parse(&student_id)?,
            day_number: day_number as u32,
            officer_name: row.get("officer_name"),
            item_claimed: row.get("item_claimed"),
            claimed_at: parse_timestamp(&claimed_at)?,
        })
    }

    fn claims_from_rows(rows: &[SqliteRow]) -> Result<Vec<ClaimRecord>> {
        rows.iter().map(Self::claim_from_row).collect()
    }
}

#[async_trait]
impl ClaimStore for SqliteClaimStore {
    async fn insert_if_absent(&self, claim: NewClaim) -> Result<Option<ClaimRecord>> {
        // One statement: the unique index on (student_id, day_number) decides,
        // and a conflicting insert returns no row instead of failing.
        let (sql, values) = Query::insert()
            .into_table(Claims::Table)
            .columns([
                Claims::StudentId,
                Claims::DayNumber,
                Claims::OfficerName,
                Claims::ItemClaimed,
                Claims::ClaimedAt,
            ])
            .values_panic([
                claim.student_id.as_str().into(),
                claim.day_number.into(),
                claim.officer_name.as_str().into(),
                claim.item_claimed.as_str().into(),
                format_timestamp(&claim.claimed_at).into(),
            ])
            .on_conflict(
                OnConflict::columns([Claims::StudentId, Claims::DayNumber])
                    .do_nothing()
                    .to_owned(),
            )
            .returning_col(Claims::Id)
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let id: i64 = row.get(0);
                debug!(
                    claim_id = id,
                    student_id = %claim.student_id,
                    day_number = claim.day_number,
                    "Claim inserted"
                );
                Ok(Some(claim.committed(id)))
            }
            None => Ok(None),
        }
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ClaimRecord>> {
        let (sql, values) = Query::select()
            .columns(CLAIM_COLUMNS)
            .from(Claims::Table)
            .order_by(Claims::Id, Order::Desc)
            .limit(limit as u64)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        Self::claims_from_rows(&rows)
    }

    async fn claimed_on_day(
        &self,
        day_number: u32,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        if student_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let (sql, values) = Query::select()
            .columns([Claims::StudentId, Claims::OfficerName])
            .from(Claims::Table)
            .and_where(Expr::col(Claims::DayNumber).eq(day_number))
            .and_where(Expr::col(Claims::StudentId).is_in(student_ids.iter().map(|s| s.as_str())))
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;

        let mut claimed = HashMap::with_capacity(rows.len());
        for row in rows {
            let student_id: String = row.get("student_id");
            claimed.insert(StudentId::parse(&student_id)?, row.get("officer_name"));
        }

        Ok(claimed)
    }

    async fn claims_after(&self, after_id: i64, limit: u32) -> Result<Vec<ClaimRecord>> {
        let (sql, values) = Query::select()
            .columns(CLAIM_COLUMNS)
            .from(Claims::Table)
            .and_where(Expr::col(Claims::Id).gt(after_id))
            .order_by(Claims::Id, Order::Asc)
            .limit(limit as u64)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        Self::claims_from_rows(&rows)
    }

    async fn latest_id(&self) -> Result<Option<i64>> {
        let (sql, values) = Query::select()
            .expr(Expr::col(Claims::Id).max())
            .from(Claims::Table)
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|row| row.get::<Option<i64>, _>(0)))
    }

    async fn claims_for_student(&self, student_id: &StudentId) -> Result<Vec<ClaimRecord>> {
        let (sql, values) = Query::select()
            .columns(CLAIM_COLUMNS)
            .from(Claims::Table)
            .and_where(Expr::col(Claims::StudentId).eq(student_id.as_str()))
            .order_by(Claims::Id, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        Self::claims_from_rows(&rows)
    }
}
