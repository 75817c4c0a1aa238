//! Login, admin elevation, session lookup and logout.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ApiError, SharedState};
use crate::session::Identity;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "officerName")]
    officer_name: Option<String>,
    #[serde(default)]
    passcode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    passcode: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    message: &'static str,
    token: String,
    session: Identity,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (Some(officer_name), Some(passcode)) =
        (non_empty(body.officer_name), non_empty(body.passcode))
    else {
        return Err(ApiError::BadRequest(
            "Officer name and passcode are required.".to_string(),
        ));
    };

    if !state.sessions.check_officer_passcode(&passcode) {
        warn!(officer = %officer_name, "Officer login with wrong passcode");
        return Err(ApiError::Unauthorized("Invalid passcode.".to_string()));
    }

    // Keep admin elevation from an earlier session.
    let mut session = state
        .sessions
        .identity_from_headers(&headers)
        .unwrap_or_default();
    session.officer_name = Some(officer_name);
    session.is_logged_in = true;

    let token = state.sessions.issue(&session)?;
    info!(officer = ?session.officer_name, "Officer logged in");

    Ok((
        [(header::SET_COOKIE, state.sessions.session_cookie(&token))],
        Json(LoginResponse {
            message: "Login successful.",
            token,
            session,
        }),
    ))
}

/// `POST /api/auth/admin/login`
pub async fn admin_login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let Some(passcode) = non_empty(body.passcode) else {
        return Err(ApiError::BadRequest("Passcode is required.".to_string()));
    };

    if !state.sessions.check_admin_passcode(&passcode) {
        warn!("Admin login with wrong passcode");
        return Err(ApiError::Unauthorized("Invalid admin passcode.".to_string()));
    }

    let mut session = state
        .sessions
        .identity_from_headers(&headers)
        .unwrap_or_default();
    session.is_admin = true;

    let token = state.sessions.issue(&session)?;
    info!(officer = ?session.officer_name, "Session elevated to admin");

    Ok((
        [(header::SET_COOKIE, state.sessions.session_cookie(&token))],
        Json(LoginResponse {
            message: "Admin login successful.",
            token,
            session,
        }),
    ))
}

/// `GET /api/auth/session`
///
/// Always 200; an absent or invalid token reads as the empty identity.
pub async fn session(State(state): State<SharedState>, headers: HeaderMap) -> Json<Identity> {
    Json(
        state
            .sessions
            .identity_from_headers(&headers)
            .unwrap_or_default(),
    )
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(serde_json::json!({ "message": "Logged out." })),
    )
}
