//! HTTP API and live channel.
//!
//! Endpoints:
//! - `POST /api/auth/login`, `POST /api/auth/admin/login`,
//!   `GET /api/auth/session`, `POST /api/auth/logout`
//! - `POST /api/claims`, `GET /api/claims/recent`
//! - `GET /api/students/search`
//! - `GET`/`PUT /api/admin/settings`
//! - `GET /api/live` (websocket)
//! - `GET /api/health`

use std::future::Future;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::bus::{ClaimBus, RelayHandle};
use crate::config::Config;
use crate::interfaces::DayStore;
use crate::storage::Storage;
use crate::ledger::ClaimLedger;
use crate::read_model::ReadModel;
use crate::session::{Identity, SessionGate};

mod admin;
mod auth;
mod claims;
mod error;
mod live;
mod students;

pub use error::ApiError;

/// Shared state for axum handlers.
pub struct AppState {
    pub ledger: ClaimLedger,
    pub read_model: ReadModel,
    pub days: Arc<dyn DayStore>,
    pub sessions: SessionGate,
    pub bus: ClaimBus,
    pub relay: RelayHandle,
}

impl AppState {
    pub fn new(storage: &Storage, config: &Config, bus: ClaimBus, relay: RelayHandle) -> Self {
        let ledger = ClaimLedger::new(storage);
        Self {
            read_model: ReadModel::new(
                ledger.clone(),
                storage.roster.clone(),
                config.search.max_results,
            ),
            ledger,
            days: storage.days.clone(),
            sessions: SessionGate::new(&config.session),
            bus,
            relay,
        }
    }
}

pub type SharedState = Arc<AppState>;

/// A request from a logged-in officer.
pub struct Officer(pub String);

#[async_trait]
impl FromRequestParts<SharedState> for Officer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, ApiError> {
        state
            .sessions
            .identity_from_headers(&parts.headers)
            .and_then(|identity| identity.acting_officer().map(str::to_string))
            .map(Officer)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// A request from an admin session.
pub struct Admin(pub Identity);

#[async_trait]
impl FromRequestParts<SharedState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, ApiError> {
        state
            .sessions
            .identity_from_headers(&parts.headers)
            .filter(|identity| identity.is_admin)
            .map(Admin)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Build the axum router (separated for testing).
pub fn router(state: SharedState, allowed_origins: &[String]) -> Router {
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/admin/login", post(auth::admin_login))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/claims", post(claims::create))
        .route("/api/claims/recent", get(claims::recent))
        .route("/api/students/search", get(students::search))
        .route(
            "/api/admin/settings",
            get(admin::get_settings).put(admin::put_settings),
        )
        .route("/api/live", get(live::upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors_layer(allowed_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}

/// Serve the router until `shutdown` resolves.
///
/// When the configured port is 0, the OS assigns an ephemeral port. The
/// actual bound address is always logged.
pub async fn serve(
    app: Router,
    bind_address: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!(address = %listener.local_addr()?, "HTTP API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> StatusCode {
    StatusCode::OK
}
