// Project service for business logic

use fedelytics_contracts::{CreateProjectRequest, Project};
use fedelytics_storage::{ProjectRow, StoreError, TelemetryStore};
use std::sync::Arc;
use uuid::Uuid;

use crate::services::enrichment::{Clock, SystemClock};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ProjectService {
    store: Arc<dyn TelemetryStore>,
    clock: Arc<dyn Clock>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn TelemetryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create(&self, req: CreateProjectRequest) -> Result<Project, ProjectError> {
        if req.name.trim().is_empty() {
            return Err(ProjectError::Validation(
                "field `name` must not be empty".to_string(),
            ));
        }
        if req.owner.trim().is_empty() {
            return Err(ProjectError::Validation(
                "field `owner` must not be empty".to_string(),
            ));
        }

        let row = ProjectRow {
            project_id: Uuid::now_v7().to_string(),
            name: req.name,
            owner: req.owner,
            created_at: self.clock.now(),
            description: req.description.unwrap_or_default(),
        };

        self.store.insert_project(row.clone()).await?;
        Ok(Self::row_to_project(row))
    }

    pub async fn list(&self) -> Result<Vec<Project>, ProjectError> {
        let rows = self.store.list_projects().await?;
        Ok(rows.into_iter().map(Self::row_to_project).collect())
    }

    fn row_to_project(row: ProjectRow) -> Project {
        Project {
            project_id: row.project_id,
            name: row.name,
            owner: row.owner,
            created_at: row.created_at,
            description: Some(row.description).filter(|d| !d.is_empty()),
        }
    }
}
