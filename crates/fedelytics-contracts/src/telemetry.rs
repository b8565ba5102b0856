// Telemetry ingestion DTOs
//
// The inbound event shape has no project_id, event_time,
// ingested_at or session_id: those are server-assigned and any client value
// under those keys is dropped during deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// One CLI invocation report as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TelemetryEventInput {
    #[schema(example = "user-42")]
    pub user_id: String,
    #[schema(example = "1.4.2")]
    pub cli_version: String,
    #[schema(example = "deploy")]
    pub command: String,
    pub exit_code: i32,
    #[schema(example = "linux")]
    pub os: String,
    #[schema(example = "x86_64")]
    pub arch: String,
    #[schema(example = 182.5)]
    pub latency_ms: f32,
    /// 1 when the command succeeded, 0 otherwise.
    pub success: u8,
    /// Free-form attributes. Must be a JSON object when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub extra: Option<Map<String, Value>>,
}

impl TelemetryEventInput {
    /// Check the fields serde cannot: required strings must not be blank.
    /// Numeric fields are present by construction and zero is a valid value.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("user_id", &self.user_id),
            ("cli_version", &self.cli_version),
            ("command", &self.command),
            ("os", &self.os),
            ("arch", &self.arch),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("field `{}` must not be empty", field));
            }
        }

        if !self.latency_ms.is_finite() {
            return Err("field `latency_ms` must be a finite number".to_string());
        }

        Ok(())
    }
}

/// Body of `POST /projects/{p_id}/ingest`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct IngestRequest {
    /// Events to ingest as one atomic batch. May be empty, must be present.
    pub events: Vec<TelemetryEventInput>,
}

/// Successful ingestion result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct IngestResponse {
    pub ingested_events: usize,
}
