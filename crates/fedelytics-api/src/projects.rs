// Project HTTP routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use fedelytics_contracts::{CreateProjectRequest, CreateProjectResponse, ErrorResponse, Project};
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::{ProjectError, ProjectService};

/// App state for project routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProjectService>,
}

impl AppState {
    pub fn new(service: Arc<ProjectService>) -> Self {
        Self { service }
    }
}

/// Create project routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .with_state(state)
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::Validation(msg) => ApiError::BadRequest(msg),
            ProjectError::Store(e) => {
                tracing::error!(error = %e, "Project store operation failed");
                ApiError::Internal
            }
        }
    }
}

/// POST /projects - Register a new project
#[utoipa::path(
    post,
    path = "/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = CreateProjectResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), ApiError> {
    let Json(req) = payload?;

    let project = state.service.create(req).await?;
    tracing::info!(
        project_id = %project.project_id,
        name = %project.name,
        "Project created"
    );

    Ok((StatusCode::CREATED, Json(CreateProjectResponse::default())))
}

/// GET /projects - List all projects
#[utoipa::path(
    get,
    path = "/projects",
    responses(
        (status = 200, description = "All projects", body = Vec<Project>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.service.list().await?;
    Ok(Json(projects))
}
