// Fedelytics API: HTTP ingestion of CLI telemetry into ClickHouse
// Decision: Router assembly lives in the library so integration tests drive
// the same stack the binary serves

pub mod config;
pub mod error;
pub mod health;
pub mod ingest;
pub mod projects;
pub mod services;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use fedelytics_contracts::*;
use fedelytics_storage::TelemetryStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::IngestLimits;
use crate::services::{Enricher, IngestService, ProjectService};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        projects::create_project,
        projects::list_projects,
        ingest::ingest_events,
    ),
    components(
        schemas(
            ErrorResponse, HealthResponse,
            Project, CreateProjectRequest, CreateProjectResponse,
            TelemetryEventInput, IngestRequest, IngestResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "projects", description = "Project registration endpoints"),
        (name = "ingest", description = "Telemetry ingestion endpoints")
    ),
    info(
        title = "Fedelytics API",
        version = "0.1.0",
        description = "Ingestion API for command-line tool telemetry",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router over a store
pub fn build_router(store: Arc<dyn TelemetryStore>, limits: &IngestLimits) -> Router {
    build_router_with_enricher(store, Enricher::system(), limits)
}

/// Build the router with an explicit enricher (pinned clock / ids in tests)
pub fn build_router_with_enricher(
    store: Arc<dyn TelemetryStore>,
    enricher: Enricher,
    limits: &IngestLimits,
) -> Router {
    let project_service = ProjectService::with_clock(store.clone(), enricher.clock().clone());
    let ingest_service = IngestService::new(store.clone(), enricher, limits.clone());

    let health_state = health::AppState::new(store);
    let projects_state = projects::AppState::new(Arc::new(project_service));
    let ingest_state = ingest::AppState::new(Arc::new(ingest_service));

    Router::new()
        .merge(health::routes(health_state))
        .merge(projects::routes(projects_state))
        .merge(ingest::routes(ingest_state))
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
