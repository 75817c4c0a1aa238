//! Day configuration for admins.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::{Admin, ApiError, SharedState};
use crate::model::{DaySettings, SettingsUpdate};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    message: &'static str,
    settings: DaySettings,
}

/// `GET /api/admin/settings`
pub async fn get_settings(
    State(state): State<SharedState>,
    _admin: Admin,
) -> Result<Json<DaySettings>, ApiError> {
    Ok(Json(state.days.settings().await?))
}

/// `PUT /api/admin/settings`
///
/// Days are upserted, never removed. `current_day: null` clears the pointer;
/// leaving the field out keeps it.
pub async fn put_settings(
    State(state): State<SharedState>,
    Admin(admin): Admin,
    body: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let settings = state.days.replace_settings(&update).await?;
    info!(
        by = ?admin.officer_name,
        version = settings.version,
        current_day = ?settings.current_day,
        "Admin updated day settings"
    );

    Ok(Json(SettingsResponse {
        message: "Settings updated successfully.",
        settings,
    }))
}
