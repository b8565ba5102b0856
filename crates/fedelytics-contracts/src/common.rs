// Common DTOs shared by every endpoint

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic message returned for any store-side failure.
/// Store details are logged, never sent to clients.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error body returned on every failure path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Internal server error")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE)
    }
}

/// Liveness / readiness body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn ready() -> Self {
        Self {
            status: "ready".to_string(),
        }
    }
}
