//! Student search.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ApiError, Officer, SharedState};
use crate::model::StudentMatch;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: Option<String>,
}

/// `GET /api/students/search?query=`
pub async fn search(
    State(state): State<SharedState>,
    _officer: Officer,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<StudentMatch>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = params
        .query
        .ok_or_else(|| ApiError::BadRequest("Search query is required.".to_string()))?;

    Ok(Json(state.read_model.search(&query).await?))
}
