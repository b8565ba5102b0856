// HTTP error mapping
// Decision: Every failure renders as {"error": <message>}; status carries the class
// Decision: Store failures collapse to a generic message, details go to the log

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fedelytics_contracts::{ErrorResponse, INTERNAL_ERROR_MESSAGE};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or incomplete input, message is safe to echo
    #[error("{0}")]
    BadRequest(String),

    /// Request exceeds a configured bound
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Store is not ready to serve traffic
    #[error("Store unavailable")]
    ServiceUnavailable,

    /// Store or server failure, never carries details
    #[error("{}", INTERNAL_ERROR_MESSAGE)]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Body limit overruns surface through the bytes rejection as 413
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}
