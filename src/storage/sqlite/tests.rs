//! Unit tests for the SQLite stores (in-memory).

use chrono::Utc;

use super::*;
use crate::interfaces::{ClaimStore, DayStore, RosterStore, StorageError};
use crate::model::{NewClaim, SettingsUpdate};
use crate::test_utils::{day, memory_pool, sample_students, sid, student};

fn new_claim(student_id: &str, day_number: u32, officer: &str, item: &str) -> NewClaim {
    NewClaim {
        student_id: sid(student_id),
        day_number,
        officer_name: officer.to_string(),
        item_claimed: item.to_string(),
        claimed_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_insert_if_absent_assigns_increasing_ids() {
    let store = SqliteClaimStore::new(memory_pool().await);

    let first = store
        .insert_if_absent(new_claim("1001", 1, "Nik", "Cookies"))
        .await
        .unwrap()
        .expect("first insert commits");
    let second = store
        .insert_if_absent(new_claim("1002", 1, "Nik", "Cookies"))
        .await
        .unwrap()
        .expect("second insert commits");

    assert!(second.id > first.id);
    assert_eq!(store.latest_id().await.unwrap(), Some(second.id));
}

#[tokio::test]
async fn test_insert_if_absent_conflict_writes_nothing() {
    let store = SqliteClaimStore::new(memory_pool().await);

    store
        .insert_if_absent(new_claim("1001", 1, "Nik", "Cookies"))
        .await
        .unwrap()
        .expect("first insert commits");

    let duplicate = store
        .insert_if_absent(new_claim("1001", 1, "Bea", "Cookies"))
        .await
        .unwrap();
    assert!(duplicate.is_none());

    let rows = store.claims_for_student(&sid("1001")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].officer_name, "Nik");
}

#[tokio::test]
async fn test_same_student_other_day_is_allowed() {
    let store = SqliteClaimStore::new(memory_pool().await);

    assert!(store
        .insert_if_absent(new_claim("1001", 1, "Nik", "Cookies"))
        .await
        .unwrap()
        .is_some());
    assert!(store
        .insert_if_absent(new_claim("1001", 2, "Nik", "Hot Chocolate"))
        .await
        .unwrap()
        .is_some());

    let rows = store.claims_for_student(&sid("1001")).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].item_claimed, "Hot Chocolate");
}

#[tokio::test]
async fn test_latest_id_empty() {
    let store = SqliteClaimStore::new(memory_pool().await);
    assert_eq!(store.latest_id().await.unwrap(), None);
}

#[tokio::test]
async fn test_recent_is_newest_first_and_bounded() {
    let store = SqliteClaimStore::new(memory_pool().await);
    for id in ["1001", "1002", "1003", "1004"] {
        store
            .insert_if_absent(new_claim(id, 1, "Nik", "Cookies"))
            .await
            .unwrap();
    }

    let recent = store.recent(3).await.unwrap();
    let ids: Vec<&str> = recent.iter().map(|c| c.student_id.as_str()).collect();
    assert_eq!(ids, vec!["1004", "1003", "1002"]);
}

#[tokio::test]
async fn test_claims_after_is_ascending() {
    let store = SqliteClaimStore::new(memory_pool().await);
    let mut ids = Vec::new();
    for student_id in ["1001", "1002", "1003"] {
        let claim = store
            .insert_if_absent(new_claim(student_id, 1, "Nik", "Cookies"))
            .await
            .unwrap()
            .unwrap();
        ids.push(claim.id);
    }

    let after = store.claims_after(ids[0], 10).await.unwrap();
    let got: Vec<i64> = after.iter().map(|c| c.id).collect();
    assert_eq!(got, ids[1..].to_vec());

    let limited = store.claims_after(0, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, ids[0]);
}

#[tokio::test]
async fn test_claimed_on_day_is_scoped_to_day() {
    let store = SqliteClaimStore::new(memory_pool().await);
    store
        .insert_if_absent(new_claim("1001", 1, "Nik", "Cookies"))
        .await
        .unwrap();
    store
        .insert_if_absent(new_claim("1002", 2, "Bea", "Hot Chocolate"))
        .await
        .unwrap();

    let ids = vec![sid("1001"), sid("1002"), sid("1003")];

    let day1 = store.claimed_on_day(1, &ids).await.unwrap();
    assert_eq!(day1.len(), 1);
    assert_eq!(day1.get(&sid("1001")).map(String::as_str), Some("Nik"));

    let day2 = store.claimed_on_day(2, &ids).await.unwrap();
    assert_eq!(day2.len(), 1);
    assert_eq!(day2.get(&sid("1002")).map(String::as_str), Some("Bea"));

    assert!(store.claimed_on_day(1, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_day_settings_empty_by_default() {
    let store = SqliteDayStore::new(memory_pool().await);
    let settings = store.settings().await.unwrap();
    assert_eq!(settings.version, 0);
    assert!(settings.days.is_empty());
    assert!(settings.current_day.is_none());
}

#[tokio::test]
async fn test_replace_settings_upserts_and_bumps_version() {
    let store = SqliteDayStore::new(memory_pool().await);

    let first = store
        .replace_settings(&SettingsUpdate {
            days: vec![day(2, "Hot Chocolate"), day(1, "Cookies")],
            current_day: Some(Some(1)),
        })
        .await
        .unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(first.days, vec![day(1, "Cookies"), day(2, "Hot Chocolate")]);
    assert_eq!(first.active_day(), Some(&day(1, "Cookies")));

    let second = store
        .replace_settings(&SettingsUpdate {
            days: vec![day(1, "Candy")],
            current_day: Some(Some(2)),
        })
        .await
        .unwrap();
    assert_eq!(second.version, 2);
    assert_eq!(second.days, vec![day(1, "Candy"), day(2, "Hot Chocolate")]);
    assert_eq!(second.current_day, Some(2));
}

#[tokio::test]
async fn test_replace_settings_clears_pointer() {
    let store = SqliteDayStore::new(memory_pool().await);
    store
        .replace_settings(&SettingsUpdate {
            days: vec![day(1, "Cookies")],
            current_day: Some(Some(1)),
        })
        .await
        .unwrap();

    let cleared = store
        .replace_settings(&SettingsUpdate {
            days: vec![],
            current_day: Some(None),
        })
        .await
        .unwrap();
    assert!(cleared.current_day.is_none());
    assert!(cleared.active_day().is_none());
    assert_eq!(cleared.days.len(), 1);
}

#[tokio::test]
async fn test_replace_settings_without_pointer_keeps_it() {
    let store = SqliteDayStore::new(memory_pool().await);
    store
        .replace_settings(&SettingsUpdate {
            days: vec![day(1, "Cookies"), day(2, "Hot Chocolate")],
            current_day: Some(Some(2)),
        })
        .await
        .unwrap();

    let edited = store
        .replace_settings(&SettingsUpdate {
            days: vec![day(2, "Candy")],
            current_day: None,
        })
        .await
        .unwrap();
    assert_eq!(edited.current_day, Some(2));
    assert_eq!(edited.active_day(), Some(&day(2, "Candy")));
    assert_eq!(edited.version, 2);
}

#[tokio::test]
async fn test_replace_settings_rejects_dangling_pointer_atomically() {
    let store = SqliteDayStore::new(memory_pool().await);

    let result = store
        .replace_settings(&SettingsUpdate {
            days: vec![day(1, "Cookies")],
            current_day: Some(Some(5)),
        })
        .await;
    assert!(matches!(result, Err(StorageError::Rejected(_))));

    let settings = store.settings().await.unwrap();
    assert!(settings.days.is_empty());
    assert_eq!(settings.version, 0);
}

#[tokio::test]
async fn test_roster_find_and_find_many() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store.upsert(&sample_students()).await.unwrap();

    let ana = store.find(&sid("1001")).await.unwrap().unwrap();
    assert_eq!(ana.first_name, "Ana");
    assert!(store.find(&sid("9999")).await.unwrap().is_none());

    let many = store
        .find_many(&[sid("1002"), sid("9999"), sid("2001")])
        .await
        .unwrap();
    assert_eq!(many.len(), 2);
}

#[tokio::test]
async fn test_roster_upsert_refreshes_rows() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store.upsert(&[student("1001", "Ana", "Reyes")]).await.unwrap();
    store.upsert(&[student("1001", "Anna", "Reyes")]).await.unwrap();

    let row = store.find(&sid("1001")).await.unwrap().unwrap();
    assert_eq!(row.first_name, "Anna");
}

#[tokio::test]
async fn test_roster_search_case_insensitive_substring() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store.upsert(&sample_students()).await.unwrap();

    // "an" appears in Ana, Anderson, Joanna, Santos and Danica.
    let hits = store.search("AN", 50).await.unwrap();
    let last: Vec<&str> = hits.iter().map(|s| s.last_name.as_str()).collect();
    assert_eq!(last, vec!["Anderson", "Cruz", "Lim", "Reyes", "Santos"]);
}

#[tokio::test]
async fn test_roster_search_folds_non_ascii_case() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store
        .upsert(&[student("3001", "Niño", "PEÑA")])
        .await
        .unwrap();

    for query in ["PEÑA", "peña", "Peña", "eñ", "NIÑO"] {
        let hits = store.search(query, 50).await.unwrap();
        assert_eq!(hits.len(), 1, "query {query:?}");
        assert_eq!(hits[0].last_name, "PEÑA");
    }
}

#[tokio::test]
async fn test_roster_upsert_refreshes_search_keys() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store.upsert(&[student("3001", "Niño", "Peña")]).await.unwrap();
    store.upsert(&[student("3001", "Niño", "Ñañez")]).await.unwrap();

    assert!(store.search("peña", 50).await.unwrap().is_empty());
    assert_eq!(store.search("ÑAÑ", 50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_roster_search_exact_id_only() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store.upsert(&sample_students()).await.unwrap();

    let hits = store.search("1004", 50).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name, "Paolo");

    // Ids match exactly, never by substring.
    assert!(store.search("100", 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_roster_search_escapes_wildcards() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store.upsert(&sample_students()).await.unwrap();

    assert!(store.search("%%", 50).await.unwrap().is_empty());
    assert!(store.search("__", 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_roster_search_respects_limit() {
    let store = SqliteRosterStore::new(memory_pool().await);
    store.upsert(&sample_students()).await.unwrap();

    assert_eq!(store.search("a", 2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_roster_import_yaml() {
    let store = SqliteRosterStore::new(memory_pool().await);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.yaml");
    std::fs::write(
        &path,
        r#"
- student_id: "3001"
  first_name: Lea
  last_name: Tan
  email: lea@students.example.edu
  program: BSIT
- student_id: "3002"
  first_name: Ramon
  middle_name: Diaz
  last_name: Uy
  email: ""
  program: BSCS
"#,
    )
    .unwrap();

    let count = store.import_yaml(&path).await.unwrap();
    assert_eq!(count, 2);

    let ramon = store.find(&sid("3002")).await.unwrap().unwrap();
    assert_eq!(ramon.middle_name.as_deref(), Some("Diaz"));
}

#[tokio::test]
async fn test_roster_import_yaml_rejects_bad_id() {
    let store = SqliteRosterStore::new(memory_pool().await);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.yaml");
    std::fs::write(
        &path,
        "- student_id: \"bad id\"\n  first_name: X\n  last_name: Y\n  email: \"\"\n  program: Z\n",
    )
    .unwrap();

    let result = store.import_yaml(&path).await;
    assert!(matches!(result, Err(StorageError::Seed(_))));
}
