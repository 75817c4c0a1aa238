//! Shared storage helper functions.
//!
//! Timestamp encoding and LIKE-pattern escaping used across storage
//! backend implementations.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{Result, StorageError};

/// Escape character used in LIKE patterns built by [`contains_pattern`].
pub const LIKE_ESCAPE: char = '\\';

/// Encode a timestamp the way it is stored: RFC3339, UTC, microseconds.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored RFC3339 timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::InvalidTimestamp(raw.to_string()))
}

/// Unicode case folding applied to searchable names and to queries.
///
/// SQLite's `lower()` only folds ASCII, so names are folded here and stored
/// next to the originals.
pub fn fold_case(raw: &str) -> String {
    raw.to_lowercase()
}

/// Build a case-folded `%fragment%` LIKE pattern with wildcards escaped.
///
/// Use with [`LIKE_ESCAPE`] as the escape character, against columns
/// folded with [`fold_case`].
pub fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fold_case(fragment).chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_roundtrip_keeps_micros() {
        let ts = DateTime::parse_from_rfc3339("2024-12-16T08:30:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        let stored = format_timestamp(&ts);
        assert_eq!(stored, "2024-12-16T08:30:00.123456Z");
        assert_eq!(parse_timestamp(&stored).unwrap(), ts);
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        let result = parse_timestamp("yesterday");
        assert!(matches!(result, Err(StorageError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_contains_pattern_lowercases() {
        assert_eq!(contains_pattern("ReYes"), "%reyes%");
    }

    #[test]
    fn test_contains_pattern_folds_non_ascii() {
        assert_eq!(contains_pattern("PEÑA"), "%peña%");
        assert_eq!(fold_case("Niño PEÑA"), "niño peña");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }
}
