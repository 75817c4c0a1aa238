//! SQLite RosterStore implementation.

use std::path::Path;

use async_trait::async_trait;
use sea_query::{Cond, Expr, LikeExpr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::model::{Student, StudentId};
use crate::storage::helpers::{contains_pattern, fold_case, LIKE_ESCAPE};
use crate::storage::schema::Students;
use crate::storage::{Result, RosterStore};

const STUDENT_COLUMNS: [Students; 6] = [
    Students::StudentId,
    Students::FirstName,
    Students::MiddleName,
    Students::LastName,
    Students::Email,
    Students::Program,
];

/// Columns written on import: the roster fields plus their folded search keys.
const INSERT_COLUMNS: [Students; 8] = [
    Students::StudentId,
    Students::FirstName,
    Students::MiddleName,
    Students::LastName,
    Students::Email,
    Students::Program,
    Students::FirstNameFolded,
    Students::LastNameFolded,
];

/// SQLite-backed roster.
pub struct SqliteRosterStore {
    pool: SqlitePool,
}

impl SqliteRosterStore {
    /// Create a new SQLite roster store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh roster rows in one transaction.
    ///
    /// The roster is owned elsewhere; this is only the import path.
    pub async fn upsert(&self, students: &[Student]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        for student in students {
            let (sql, values) = Query::insert()
                .into_table(Students::Table)
                .columns(INSERT_COLUMNS)
                .values_panic([
                    student.student_id.as_str().into(),
                    student.first_name.as_str().into(),
                    student.middle_name.clone().into(),
                    student.last_name.as_str().into(),
                    student.email.as_str().into(),
                    student.program.as_str().into(),
                    fold_case(&student.first_name).into(),
                    fold_case(&student.last_name).into(),
                ])
                .on_conflict(
                    OnConflict::column(Students::StudentId)
                        .update_columns([
                            Students::FirstName,
                            Students::MiddleName,
                            Students::LastName,
                            Students::Email,
                            Students::Program,
                            Students::FirstNameFolded,
                            Students::LastNameFolded,
                        ])
                        .to_owned(),
                )
                .build_sqlx(SqliteQueryBuilder);

            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(students.len())
    }

    /// Load a YAML list of students and upsert it.
    pub async fn import_yaml(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let students: Vec<Student> = serde_yaml::from_str(&raw)?;
        let count = self.upsert(&students).await?;
        info!(path = %path.display(), students = count, "Roster seed imported");
        Ok(count)
    }

    fn student_from_row(row: &SqliteRow) -> Result<Student> {
        let student_id: String = row.get("student_id");
        Ok(Student {
            student_id: StudentId::parse(&student_id)?,
            first_name: row.get("first_name"),
            middle_name: row.get("middle_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            program: row.get("program"),
        })
    }
}

#[async_trait]
impl RosterStore for SqliteRosterStore {
    async fn find(&self, student_id: &StudentId) -> Result<Option<Student>> {
        let (sql, values) = Query::select()
            .columns(STUDENT_COLUMNS)
            .from(Students::Table)
            .and_where(Expr::col(Students::StudentId).eq(student_id.as_str()))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::student_from_row).transpose()
    }

    async fn find_many(&self, student_ids: &[StudentId]) -> Result<Vec<Student>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (sql, values) = Query::select()
            .columns(STUDENT_COLUMNS)
            .from(Students::Table)
            .and_where(Expr::col(Students::StudentId).is_in(student_ids.iter().map(|s| s.as_str())))
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(Self::student_from_row).collect()
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Student>> {
        let pattern = contains_pattern(query);

        let (sql, values) = Query::select()
            .columns(STUDENT_COLUMNS)
            .from(Students::Table)
            .cond_where(
                Cond::any()
                    .add(Expr::col(Students::StudentId).eq(query))
                    .add(
                        Expr::col(Students::FirstNameFolded)
                            .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE)),
                    )
                    .add(
                        Expr::col(Students::LastNameFolded)
                            .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
                    ),
            )
            .order_by(Students::LastName, Order::Asc)
            .order_by(Students::FirstName, Order::Asc)
            .order_by(Students::StudentId, Order::Asc)
            .limit(limit as u64)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(Self::student_from_row).collect()
    }
}
