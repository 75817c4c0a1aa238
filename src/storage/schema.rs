//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Claims table schema.
#[derive(Iden)]
pub enum Claims {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "student_id"]
    StudentId,
    #[iden = "day_number"]
    DayNumber,
    #[iden = "officer_name"]
    OfficerName,
    #[iden = "item_claimed"]
    ItemClaimed,
    #[iden = "claimed_at"]
    ClaimedAt,
}

/// Days table schema.
#[derive(Iden)]
pub enum Days {
    Table,
    #[iden = "day_number"]
    DayNumber,
    #[iden = "item_of_the_day"]
    ItemOfTheDay,
}

/// Key/value settings table schema.
#[derive(Iden)]
pub enum Settings {
    Table,
    #[iden = "setting_key"]
    Key,
    #[iden = "setting_value"]
    Value,
}

/// Students (roster) table schema.
#[derive(Iden)]
pub enum Students {
    Table,
    #[iden = "student_id"]
    StudentId,
    #[iden = "first_name"]
    FirstName,
    #[iden = "middle_name"]
    MiddleName,
    #[iden = "last_name"]
    LastName,
    #[iden = "email"]
    Email,
    #[iden = "program"]
    Program,
    #[iden = "first_name_folded"]
    FirstNameFolded,
    #[iden = "last_name_folded"]
    LastNameFolded,
}

/// Settings key holding the active-day pointer.
pub const CURRENT_DAY_KEY: &str = "current_day";
/// Settings key holding the configuration version counter.
pub const SETTINGS_VERSION_KEY: &str = "settings_version";

/// SQL for creating the claims table.
///
/// The unique constraint on `(student_id, day_number)` is what makes a claim
/// at most once per student per day; AUTOINCREMENT keeps ids monotonic.
pub const CREATE_CLAIMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS claims (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id TEXT NOT NULL,
    day_number INTEGER NOT NULL,
    officer_name TEXT NOT NULL,
    item_claimed TEXT NOT NULL,
    claimed_at TEXT NOT NULL,
    UNIQUE (student_id, day_number)
);

CREATE INDEX IF NOT EXISTS idx_claims_day ON claims(day_number);
"#;

/// SQL for creating the day configuration tables.
pub const CREATE_DAY_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS days (
    day_number INTEGER PRIMARY KEY CHECK (day_number > 0),
    item_of_the_day TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    setting_key TEXT PRIMARY KEY,
    setting_value TEXT NOT NULL
);
"#;

/// SQL for creating the roster table.
pub const CREATE_STUDENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    student_id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    middle_name TEXT,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    program TEXT NOT NULL DEFAULT '',
    first_name_folded TEXT NOT NULL DEFAULT '',
    last_name_folded TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_students_name ON students(last_name, first_name);
"#;
