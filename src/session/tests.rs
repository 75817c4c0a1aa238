use chrono::TimeZone;
use http::HeaderValue;

use super::*;
use crate::config::Config;

fn gate() -> SessionGate {
    SessionGate::new(&Config::for_test().session)
}

#[test]
fn test_issue_then_verify() {
    let gate = gate();
    let identity = Identity::officer("Nik");

    let token = gate.issue(&identity).unwrap();
    assert!(token.starts_with("v1."));
    assert_eq!(gate.verify(&token).unwrap(), identity);
    assert_eq!(gate.identity_of(&token), Some(identity));
}

#[test]
fn test_tampered_payload_rejected() {
    let gate = gate();
    let token = gate.issue(&Identity::officer("Nik")).unwrap();

    let forged_payload = URL_SAFE_NO_PAD.encode(
        br#"{"officer_name":"Nik","is_logged_in":true,"is_admin":true,"iat":0,"exp":99999999999}"#,
    );
    let parts: Vec<&str> = token.split('.').collect();
    let forged = format!("v1.{}.{}", forged_payload, parts[2]);

    assert!(matches!(gate.verify(&forged), Err(SessionError::BadSignature)));
    assert!(gate.identity_of(&forged).is_none());
}

#[test]
fn test_token_from_other_secret_rejected() {
    let mut other_config = Config::for_test().session;
    other_config.secret = "another-secret-another-secret-xx".to_string();
    let other = SessionGate::new(&other_config);

    let token = other.issue(&Identity::officer("Nik")).unwrap();
    assert!(matches!(gate().verify(&token), Err(SessionError::BadSignature)));
}

#[test]
fn test_expired_token_rejected() {
    let gate = gate();
    let issued = Utc.with_ymd_and_hms(2024, 12, 16, 8, 0, 0).unwrap();
    let token = gate.issue_at(&Identity::officer("Nik"), issued).unwrap();

    let later = issued + chrono::Duration::hours(11);
    assert!(gate.verify_at(&token, later).is_ok());

    let expired = issued + chrono::Duration::hours(12);
    assert!(matches!(
        gate.verify_at(&token, expired),
        Err(SessionError::Expired)
    ));
}

#[test]
fn test_malformed_tokens() {
    let gate = gate();
    assert!(matches!(gate.verify("garbage"), Err(SessionError::Malformed(_))));
    assert!(matches!(
        gate.verify("v2.abc.def"),
        Err(SessionError::UnsupportedVersion(_))
    ));
    assert!(matches!(
        gate.verify("v1.abc.!!!"),
        Err(SessionError::Malformed(_))
    ));
    assert!(gate.verify(&"a".repeat(5000)).is_err());
}

#[test]
fn test_passcodes() {
    let gate = gate();
    assert!(gate.check_officer_passcode("officer-pass"));
    assert!(!gate.check_officer_passcode("officer-pas"));
    assert!(!gate.check_officer_passcode("admin-pass"));
    assert!(gate.check_admin_passcode("admin-pass"));
    assert!(!gate.check_admin_passcode(""));
}

#[test]
fn test_acting_officer() {
    assert_eq!(Identity::officer("Nik").acting_officer(), Some("Nik"));
    assert_eq!(Identity::default().acting_officer(), None);

    let admin_only = Identity {
        officer_name: None,
        is_logged_in: false,
        is_admin: true,
    };
    assert_eq!(admin_only.acting_officer(), None);
}

#[test]
fn test_token_from_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_static("theme=dark; tinsel_session=v1.abc.def; other=1"),
    );
    assert_eq!(token_from_headers(&headers), Some("v1.abc.def"));
}

#[test]
fn test_bearer_header_wins() {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("tinsel_session=from-cookie"));
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
    assert_eq!(token_from_headers(&headers), Some("from-header"));
}

#[test]
fn test_no_token() {
    let mut headers = HeaderMap::new();
    assert_eq!(token_from_headers(&headers), None);

    headers.insert(COOKIE, HeaderValue::from_static("tinsel_session="));
    assert_eq!(token_from_headers(&headers), None);
}

#[test]
fn test_cookie_attributes() {
    let mut config = Config::for_test().session;
    config.secure_cookie = true;
    let gate = SessionGate::new(&config);

    let cookie = gate.session_cookie("tok");
    assert!(cookie.starts_with("tinsel_session=tok;"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=43200"));
    assert!(cookie.ends_with("; Secure"));

    assert!(gate.clear_cookie().contains("Max-Age=0"));
}
