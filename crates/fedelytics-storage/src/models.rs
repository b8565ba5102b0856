// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use clickhouse::Row;
use serde::{Deserialize, Serialize};

// ============================================
// Telemetry events
// ============================================

/// One enriched telemetry record (telemetry.events)
///
/// ```sql
/// CREATE TABLE telemetry.events (
///     event_time  DateTime64(3, 'UTC'),
///     ingested_at DateTime64(3, 'UTC'),
///     project_id  String,
///     user_id     String,
///     session_id  String,
///     cli_version LowCardinality(String),
///     command     LowCardinality(String),
///     exit_code   Int32,
///     os          LowCardinality(String),
///     arch        LowCardinality(String),
///     latency_ms  Float32,
///     success     UInt8,
///     extra       String
/// ) ENGINE = MergeTree()
/// PARTITION BY toYYYYMM(event_time)
/// ORDER BY (project_id, event_time);
/// ```
#[derive(Debug, Clone, PartialEq, Row, Serialize, Deserialize)]
pub struct EventRow {
    #[serde(with = "clickhouse::serde::chrono::datetime64::millis")]
    pub event_time: DateTime<Utc>,

    #[serde(with = "clickhouse::serde::chrono::datetime64::millis")]
    pub ingested_at: DateTime<Utc>,

    pub project_id: String,
    pub user_id: String,

    /// One generated value per record, not per CLI session
    pub session_id: String,

    pub cli_version: String,
    pub command: String,
    pub exit_code: i32,
    pub os: String,
    pub arch: String,
    pub latency_ms: f32,
    pub success: u8,

    /// JSON-encoded object, `{}` when the client sent none
    pub extra: String,
}

// ============================================
// Projects
// ============================================

/// Project row (projects.list)
///
/// ```sql
/// CREATE TABLE projects.list (
///     project_id  String,
///     name        String,
///     owner       String,
///     created_at  DateTime64(3, 'UTC'),
///     description String
/// ) ENGINE = MergeTree()
/// ORDER BY (created_at, project_id);
/// ```
#[derive(Debug, Clone, PartialEq, Row, Serialize, Deserialize)]
pub struct ProjectRow {
    pub project_id: String,
    pub name: String,
    pub owner: String,

    #[serde(with = "clickhouse::serde::chrono::datetime64::millis")]
    pub created_at: DateTime<Utc>,

    /// Empty string when not provided
    pub description: String,
}
