// Telemetry ingestion route

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::post,
    Json, Router,
};
use fedelytics_contracts::{ErrorResponse, IngestRequest, IngestResponse};
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::{IngestError, IngestService, IngestStage};

/// App state for ingest routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<IngestService>,
}

impl AppState {
    pub fn new(service: Arc<IngestService>) -> Self {
        Self { service }
    }
}

/// Create ingest routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/projects/:p_id/ingest", post(ingest_events))
        .with_state(state)
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(msg) => ApiError::BadRequest(msg),
            e @ IngestError::TooManyEvents { .. } => ApiError::PayloadTooLarge(e.to_string()),
            IngestError::Prepare(_) | IngestError::Append { .. } | IngestError::Send(_) => {
                ApiError::Internal
            }
        }
    }
}

/// POST /projects/{p_id}/ingest - Append a batch of CLI telemetry events
#[utoipa::path(
    post,
    path = "/projects/{p_id}/ingest",
    params(
        ("p_id" = String, Path, description = "Project ID the events belong to")
    ),
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Events stored", body = IngestResponse),
        (status = 400, description = "Malformed or incomplete events", body = ErrorResponse),
        (status = 413, description = "Request exceeds ingest limits", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "ingest"
)]
pub async fn ingest_events(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!(project_id = %project_id, error = %rejection, "Rejected ingest body");
        ApiError::from(rejection)
    })?;

    let count = req.events.len();
    match state.service.ingest(&project_id, req.events).await {
        Ok(ingested_events) => {
            tracing::info!(project_id = %project_id, ingested_events, "Batch ingested");
            Ok(Json(IngestResponse { ingested_events }))
        }
        Err(e) => {
            match e.stage() {
                IngestStage::Validation => tracing::warn!(
                    project_id = %project_id,
                    events = count,
                    error = %e,
                    "Ingest validation failed"
                ),
                stage => tracing::error!(
                    project_id = %project_id,
                    events = count,
                    stage = %stage,
                    error = %e,
                    "Ingest failed"
                ),
            }
            Err(e.into())
        }
    }
}
