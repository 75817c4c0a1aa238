//! Domain types shared by the ledger, the read model and the bus.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted length for a student identifier.
pub const MAX_STUDENT_ID_LEN: usize = 32;

/// A roster identifier that has passed syntactic validation.
///
/// Trimmed, 1 to [`MAX_STUDENT_ID_LEN`] characters, ASCII alphanumerics and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Validate and wrap a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, InvalidStudentId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_STUDENT_ID_LEN {
            return Err(InvalidStudentId(raw.to_string()));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(InvalidStudentId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StudentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        StudentId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Rejected student identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid student id: {0:?}")]
pub struct InvalidStudentId(pub String);

/// One day of the event and the item handed out on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub day_number: u32,
    pub item_of_the_day: String,
}

/// Versioned snapshot of the day configuration.
///
/// Fetched once per claim attempt and passed down the call, so a concurrent
/// admin write can never change the day halfway through a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySettings {
    /// Monotonic counter bumped by every admin write.
    pub version: u64,
    /// All configured days, ascending by day number.
    pub days: Vec<Day>,
    /// The active-day pointer.
    pub current_day: Option<u32>,
}

impl DaySettings {
    /// Resolve the active-day pointer against the configured days.
    ///
    /// `None` when the pointer is unset or references a missing day.
    pub fn active_day(&self) -> Option<&Day> {
        let current = self.current_day?;
        self.days.iter().find(|d| d.day_number == current)
    }
}

/// Admin bulk replacement of the day configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub days: Vec<Day>,
    /// `None` leaves the pointer alone, `Some(None)` clears it.
    #[serde(default, deserialize_with = "present_field")]
    pub current_day: Option<Option<u32>>,
}

/// Maps a present field (including `null`) to `Some`, so an absent one
/// stays distinguishable through `#[serde(default)]`.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SettingsUpdate {
    /// Check the update against the days that will exist after it is applied.
    ///
    /// `existing` are the day numbers already stored; updates upsert days and
    /// never delete them.
    pub fn validate(&self, existing: &[u32]) -> Result<(), String> {
        if let Some(day) = self.days.iter().find(|d| d.day_number == 0) {
            return Err(format!(
                "day_number must be positive (got {})",
                day.day_number
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for day in &self.days {
            if !seen.insert(day.day_number) {
                return Err(format!("day {} listed more than once", day.day_number));
            }
        }

        if let Some(Some(current)) = self.current_day {
            let known = existing.contains(&current) || seen.contains(&current);
            if !known {
                return Err(format!("current_day {current} is not a configured day"));
            }
        }

        Ok(())
    }
}

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub program: String,
}

/// Claim about to be inserted by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
    pub student_id: StudentId,
    pub day_number: u32,
    pub officer_name: String,
    pub item_claimed: String,
    pub claimed_at: DateTime<Utc>,
}

impl NewClaim {
    /// Attach the id assigned by the store.
    pub fn committed(self, id: i64) -> ClaimRecord {
        ClaimRecord {
            id,
            student_id: self.student_id,
            day_number: self.day_number,
            officer_name: self.officer_name,
            item_claimed: self.item_claimed,
            claimed_at: self.claimed_at,
        }
    }
}

/// A committed claim. Never updated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRecord {
    pub id: i64,
    pub student_id: StudentId,
    pub day_number: u32,
    pub officer_name: String,
    pub item_claimed: String,
    pub claimed_at: DateTime<Utc>,
}

/// Claim state of one student on the active day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimStatus {
    Unclaimed,
    ClaimedBy { officer_name: String },
}

impl ClaimStatus {
    pub fn is_claimed(&self) -> bool {
        matches!(self, ClaimStatus::ClaimedBy { .. })
    }

    pub fn officer_name(&self) -> Option<&str> {
        match self {
            ClaimStatus::Unclaimed => None,
            ClaimStatus::ClaimedBy { officer_name } => Some(officer_name),
        }
    }
}

/// Event fanned out to every connected officer after a claim commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimBroadcast {
    pub id: i64,
    pub student_id: StudentId,
    pub officer_name: String,
    pub day_number: u32,
    pub item_claimed: String,
    pub first_name: String,
    pub last_name: String,
}

impl ClaimBroadcast {
    /// Build the event from a committed claim and whatever the roster knows.
    pub fn from_claim(claim: &ClaimRecord, student: Option<&Student>) -> Self {
        Self {
            id: claim.id,
            student_id: claim.student_id.clone(),
            officer_name: claim.officer_name.clone(),
            day_number: claim.day_number,
            item_claimed: claim.item_claimed.clone(),
            first_name: student.map(|s| s.first_name.clone()).unwrap_or_default(),
            last_name: student.map(|s| s.last_name.clone()).unwrap_or_default(),
        }
    }
}

/// Search result row: roster fields annotated with the active-day claim state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentMatch {
    #[serde(flatten)]
    pub student: Student,
    pub is_claimed: bool,
    pub claimed_by_officer: Option<String>,
}

impl StudentMatch {
    pub fn new(student: Student, status: &ClaimStatus) -> Self {
        Self {
            student,
            is_claimed: status.is_claimed(),
            claimed_by_officer: status.officer_name().map(str::to_string),
        }
    }
}

/// Recent-claims feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentClaim {
    #[serde(flatten)]
    pub claim: ClaimRecord,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_id_trims_and_accepts() {
        let id = StudentId::parse("  2021-00417 ").unwrap();
        assert_eq!(id.as_str(), "2021-00417");
    }

    #[test]
    fn test_student_id_rejects_bad_input() {
        assert!(StudentId::parse("").is_err());
        assert!(StudentId::parse("   ").is_err());
        assert!(StudentId::parse("12 34").is_err());
        assert!(StudentId::parse("1234'; DROP").is_err());
        assert!(StudentId::parse(&"9".repeat(MAX_STUDENT_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_student_id_deserialize_validates() {
        let ok: StudentId = serde_json::from_str("\"A-1\"").unwrap();
        assert_eq!(ok.as_str(), "A-1");
        assert!(serde_json::from_str::<StudentId>("\"a b\"").is_err());
    }

    #[test]
    fn test_active_day_unset_and_dangling() {
        let days = vec![Day {
            day_number: 1,
            item_of_the_day: "Cookies".to_string(),
        }];

        let unset = DaySettings {
            version: 1,
            days: days.clone(),
            current_day: None,
        };
        assert!(unset.active_day().is_none());

        let dangling = DaySettings {
            version: 1,
            days: days.clone(),
            current_day: Some(7),
        };
        assert!(dangling.active_day().is_none());

        let ok = DaySettings {
            version: 1,
            days,
            current_day: Some(1),
        };
        assert_eq!(ok.active_day().unwrap().item_of_the_day, "Cookies");
    }

    #[test]
    fn test_settings_update_validation() {
        let day = |n: u32| Day {
            day_number: n,
            item_of_the_day: format!("item {n}"),
        };

        let zero = SettingsUpdate {
            days: vec![day(0)],
            current_day: None,
        };
        assert!(zero.validate(&[]).is_err());

        let dup = SettingsUpdate {
            days: vec![day(2), day(2)],
            current_day: None,
        };
        assert!(dup.validate(&[]).is_err());

        let dangling = SettingsUpdate {
            days: vec![day(1)],
            current_day: Some(Some(3)),
        };
        assert!(dangling.validate(&[2]).is_err());

        let existing = SettingsUpdate {
            days: vec![],
            current_day: Some(Some(2)),
        };
        assert!(existing.validate(&[1, 2]).is_ok());
    }

    #[test]
    fn test_settings_update_tells_absent_from_null() {
        let absent: SettingsUpdate =
            serde_json::from_str(r#"{"days":[{"day_number":1,"item_of_the_day":"Candy"}]}"#)
                .unwrap();
        assert_eq!(absent.current_day, None);
        assert_eq!(absent.days.len(), 1);

        let cleared: SettingsUpdate = serde_json::from_str(r#"{"current_day":null}"#).unwrap();
        assert_eq!(cleared.current_day, Some(None));
        assert!(cleared.days.is_empty());

        let set: SettingsUpdate = serde_json::from_str(r#"{"current_day":2}"#).unwrap();
        assert_eq!(set.current_day, Some(Some(2)));
    }

    #[test]
    fn test_student_match_serializes_flat() {
        let student = Student {
            student_id: StudentId::parse("100").unwrap(),
            first_name: "Ana".to_string(),
            middle_name: None,
            last_name: "Reyes".to_string(),
            email: "ana@example.edu".to_string(),
            program: "BSCS".to_string(),
        };
        let row = StudentMatch::new(
            student,
            &ClaimStatus::ClaimedBy {
                officer_name: "Nik".to_string(),
            },
        );

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["student_id"], "100");
        assert_eq!(json["is_claimed"], true);
        assert_eq!(json["claimed_by_officer"], "Nik");
    }
}
