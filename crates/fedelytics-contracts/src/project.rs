// Project DTOs (analytics namespace)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named analytics namespace that telemetry events are grouped under
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Project {
    /// Server-generated identifier (UUID v7).
    #[schema(example = "01936f4e-8a2c-7d3e-9b1a-4f5e6d7c8b9a")]
    pub project_id: String,
    pub name: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    /// `null` when the project was created without a description.
    pub description: Option<String>,
}

/// Request to create a new project
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    #[schema(example = "acme-cli")]
    pub name: String,
    #[schema(example = "platform-team")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of a successful create, serialized as `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CreateProjectResponse {}
