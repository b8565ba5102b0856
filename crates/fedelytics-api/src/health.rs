// Liveness and readiness routes
// Decision: /healthz never touches the store; /readyz pings it

use axum::{extract::State, routing::get, Json, Router};
use fedelytics_contracts::{ErrorResponse, HealthResponse};
use fedelytics_storage::TelemetryStore;
use std::sync::Arc;

use crate::error::ApiError;

/// App state for health routes
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TelemetryStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self { store }
    }
}

/// Create health routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

/// GET /healthz - Process liveness
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// GET /readyz - Store reachability
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Store is reachable", body = HealthResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tag = "health"
)]
pub async fn readyz(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.store.ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        ApiError::ServiceUnavailable
    })?;

    Ok(Json(HealthResponse::ready()))
}
