// Integration tests against a live ClickHouse server
// Run with: cargo test --test clickhouse_integration -- --ignored
//
// Expects the telemetry.events and projects.list tables to exist and
// CLICKHOUSE_URL / CLICKHOUSE_USER / CLICKHOUSE_PASSWORD to point at the
// server's HTTP port.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use fedelytics_api::{build_router, config::AppConfig};
use fedelytics_storage::{ClickHouseStore, EventRow, TelemetryStore};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

async fn connect() -> (AppConfig, ClickHouseStore) {
    let config = AppConfig::from_env();
    let store = ClickHouseStore::connect(&config.store)
        .await
        .expect("ClickHouse must be reachable for integration tests");
    (config, store)
}

#[tokio::test]
#[ignore]
async fn test_ping() {
    let (_, store) = connect().await;
    store.ping().await.expect("ping failed");
}

#[tokio::test]
#[ignore]
async fn test_ingest_commits_batch() {
    let (config, store) = connect().await;
    let app = build_router(Arc::new(store.clone()), &config.ingest);

    let project_id = format!("it-{}", Uuid::new_v4());
    let events: Vec<_> = (0..3)
        .map(|i| {
            json!({
                "user_id": "it-user",
                "cli_version": "0.0.1",
                "command": format!("cmd-{}", i),
                "exit_code": i,
                "os": "linux",
                "arch": "x86_64",
                "latency_ms": 1.5,
                "success": 1,
                "extra": { "run": i }
            })
        })
        .collect();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/projects/{}/ingest", project_id))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "events": events }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["ingested_events"], 3);

    let sql = format!(
        "SELECT ?fields FROM {} WHERE project_id = ? ORDER BY command",
        store.tables().events.quoted()
    );
    let rows: Vec<EventRow> = store
        .client()
        .query(&sql)
        .bind(&project_id)
        .fetch_all()
        .await
        .expect("query failed");

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.project_id == project_id));
    assert_eq!(rows[0].command, "cmd-0");
}

#[tokio::test]
#[ignore]
async fn test_project_round_trip() {
    let (config, store) = connect().await;
    let app = build_router(Arc::new(store), &config.ingest);

    let name = format!("it-project-{}", Uuid::new_v4());
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/projects")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "name": name, "owner": "integration" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(Request::builder().uri("/projects").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let projects: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert!(projects.iter().any(|p| p["name"] == name.as_str()));
}
