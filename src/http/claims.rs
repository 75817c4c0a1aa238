//! Claim recording and the recent-claims feed.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, Officer, SharedState};
use crate::model::{ClaimRecord, RecentClaim};
use crate::read_model::DEFAULT_RECENT_LIMIT;

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    #[serde(default)]
    student_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    message: &'static str,
    claim: ClaimRecord,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    limit: Option<u32>,
}

/// `POST /api/claims`
pub async fn create(
    State(state): State<SharedState>,
    Officer(officer_name): Officer,
    body: Result<Json<ClaimRequest>, JsonRejection>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let student_id = body
        .student_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("student_id is required.".to_string()))?;

    let claim = state
        .ledger
        .attempt_claim(&student_id, &officer_name)
        .await?;

    // Fan-out happens after commit, off the request path.
    state.relay.notify_committed(claim.id);

    Ok(Json(ClaimResponse {
        message: "Claim processed successfully.",
        claim,
    }))
}

/// `GET /api/claims/recent?limit=`
pub async fn recent(
    State(state): State<SharedState>,
    _officer: Officer,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> Result<Json<Vec<RecentClaim>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);

    Ok(Json(state.read_model.recent_feed(limit).await?))
}
