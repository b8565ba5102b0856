// Telemetry ingestion service
//
// Drives one request through
//   Received -> Validated -> Enriched -> Batched -> Sent -> Acknowledged
// and fails with the stage that broke. A request maps to exactly one store
// batch; the batch is released on every exit path (explicit abort on append
// failure, drop on timeout or cancellation).

use fedelytics_contracts::TelemetryEventInput;
use fedelytics_storage::{EventRow, StoreError, TelemetryStore};
use std::sync::Arc;

use crate::config::IngestLimits;
use crate::services::enrichment::Enricher;

/// Where an ingestion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Validation,
    Prepare,
    Append,
    Send,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestStage::Validation => write!(f, "validation"),
            IngestStage::Prepare => write!(f, "prepare"),
            IngestStage::Append => write!(f, "append"),
            IngestStage::Send => write!(f, "send"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Input rejected before touching the store
    #[error("{0}")]
    Validation(String),

    /// More events than one batch may carry
    #[error("too many events in one request: {count} (max {max})")]
    TooManyEvents { count: usize, max: usize },

    #[error("failed to prepare batch: {0}")]
    Prepare(#[source] StoreError),

    #[error("failed to append event {index} to batch: {source}")]
    Append {
        index: usize,
        #[source]
        source: StoreError,
    },

    #[error("failed to send batch: {0}")]
    Send(#[source] StoreError),
}

impl IngestError {
    pub fn stage(&self) -> IngestStage {
        match self {
            IngestError::Validation(_) | IngestError::TooManyEvents { .. } => {
                IngestStage::Validation
            }
            IngestError::Prepare(_) => IngestStage::Prepare,
            IngestError::Append { .. } => IngestStage::Append,
            IngestError::Send(_) => IngestStage::Send,
        }
    }
}

pub struct IngestService {
    store: Arc<dyn TelemetryStore>,
    enricher: Enricher,
    limits: IngestLimits,
}

impl IngestService {
    pub fn new(store: Arc<dyn TelemetryStore>, enricher: Enricher, limits: IngestLimits) -> Self {
        Self {
            store,
            enricher,
            limits,
        }
    }

    /// Persist every event under `project_id` as one atomic batch.
    /// Returns the number of events written, always `events.len()`.
    pub async fn ingest(
        &self,
        project_id: &str,
        events: Vec<TelemetryEventInput>,
    ) -> Result<usize, IngestError> {
        self.validate(project_id, &events)?;

        let rows: Vec<EventRow> = events
            .into_iter()
            .map(|event| self.enricher.enrich(event, project_id))
            .collect();

        self.write_batch(project_id, &rows).await?;

        Ok(rows.len())
    }

    fn validate(&self, project_id: &str, events: &[TelemetryEventInput]) -> Result<(), IngestError> {
        if project_id.trim().is_empty() {
            return Err(IngestError::Validation(
                "project id must not be empty".to_string(),
            ));
        }

        if events.len() > self.limits.max_events {
            return Err(IngestError::TooManyEvents {
                count: events.len(),
                max: self.limits.max_events,
            });
        }

        for (index, event) in events.iter().enumerate() {
            event
                .validate()
                .map_err(|msg| IngestError::Validation(format!("events[{}]: {}", index, msg)))?;
        }

        Ok(())
    }

    async fn write_batch(&self, project_id: &str, rows: &[EventRow]) -> Result<(), IngestError> {
        let mut batch = self
            .store
            .prepare_event_batch()
            .await
            .map_err(IngestError::Prepare)?;

        for (index, row) in rows.iter().enumerate() {
            tracing::debug!(
                project_id = %project_id,
                session_id = %row.session_id,
                command = %row.command,
                exit_code = row.exit_code,
                "ingesting telemetry event"
            );

            if let Err(source) = batch.append(row).await {
                batch.abort();
                return Err(IngestError::Append { index, source });
            }
        }

        // The batch moves into the send future; on timeout that future is
        // dropped, which aborts the insert before it commits.
        let timeout = self.limits.send_timeout;
        match tokio::time::timeout(timeout, batch.send()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(IngestError::Send(e)),
            Err(_) => Err(IngestError::Send(StoreError::Timeout(timeout))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::enrichment::{Clock, SessionIdGenerator};
    use chrono::{DateTime, TimeZone, Utc};
    use fedelytics_storage::{FaultPoint, InMemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
        }
    }

    #[derive(Default)]
    struct SequentialIds(AtomicUsize);

    impl SessionIdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("s{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn event(command: &str) -> TelemetryEventInput {
        TelemetryEventInput {
            user_id: "u1".into(),
            cli_version: "1.0.0".into(),
            command: command.into(),
            exit_code: 0,
            os: "linux".into(),
            arch: "x86_64".into(),
            latency_ms: 3.5,
            success: 1,
            extra: None,
        }
    }

    fn service(store: &InMemoryStore, limits: IngestLimits) -> IngestService {
        let enricher = Enricher::new(Arc::new(FixedClock), Arc::new(SequentialIds::default()));
        IngestService::new(Arc::new(store.clone()), enricher, limits)
    }

    #[tokio::test]
    async fn test_ingest_writes_rows_in_order() {
        let store = InMemoryStore::new();
        let svc = service(&store, IngestLimits::default());

        let count = svc
            .ingest("p1", vec![event("a"), event("b"), event("c")])
            .await
            .unwrap();

        assert_eq!(count, 3);
        let rows = store.events();
        let commands: Vec<&str> = rows.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, vec!["a", "b", "c"]);
        let sessions: Vec<&str> = rows.iter().map(|r| r.session_id.as_str()).collect();
        assert_eq!(sessions, vec!["s0", "s1", "s2"]);
        assert!(rows.iter().all(|r| r.project_id == "p1"));
        assert_eq!(store.sent_batches(), 1);
        assert_eq!(store.open_batches(), 0);
    }

    #[tokio::test]
    async fn test_empty_list_sends_one_empty_batch() {
        let store = InMemoryStore::new();
        let svc = service(&store, IngestLimits::default());

        assert_eq!(svc.ingest("p1", vec![]).await.unwrap(), 0);
        assert_eq!(store.sent_batches(), 1);
        assert_eq!(store.event_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_event_touches_nothing() {
        let store = InMemoryStore::new();
        let svc = service(&store, IngestLimits::default());

        let mut bad = event("b");
        bad.user_id = String::new();

        let err = svc
            .ingest("p1", vec![event("a"), bad])
            .await
            .unwrap_err();

        assert_eq!(err.stage(), IngestStage::Validation);
        assert!(err.to_string().contains("events[1]"));
        assert!(err.to_string().contains("user_id"));
        assert_eq!(store.event_count(), 0);
        assert_eq!(store.sent_batches(), 0);
        assert_eq!(store.open_batches(), 0);
    }

    #[tokio::test]
    async fn test_blank_project_id_rejected() {
        let store = InMemoryStore::new();
        let svc = service(&store, IngestLimits::default());

        let err = svc.ingest("  ", vec![event("a")]).await.unwrap_err();
        assert_eq!(err.stage(), IngestStage::Validation);
    }

    #[tokio::test]
    async fn test_too_many_events() {
        let store = InMemoryStore::new();
        let limits = IngestLimits {
            max_events: 2,
            ..IngestLimits::default()
        };
        let svc = service(&store, limits);

        let err = svc
            .ingest("p1", vec![event("a"), event("b"), event("c")])
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::TooManyEvents { count: 3, max: 2 }));
        assert_eq!(store.sent_batches(), 0);
    }

    #[tokio::test]
    async fn test_prepare_failure() {
        let store = InMemoryStore::new();
        store.inject(FaultPoint::Prepare);
        let svc = service(&store, IngestLimits::default());

        let err = svc.ingest("p1", vec![event("a")]).await.unwrap_err();
        assert_eq!(err.stage(), IngestStage::Prepare);
        assert_eq!(store.open_batches(), 0);
    }

    #[tokio::test]
    async fn test_append_failure_aborts_batch() {
        let store = InMemoryStore::new();
        store.inject(FaultPoint::Append { at: 1 });
        let svc = service(&store, IngestLimits::default());

        let err = svc
            .ingest("p1", vec![event("a"), event("b"), event("c")])
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Append { index: 1, .. }));
        assert_eq!(store.event_count(), 0);
        assert_eq!(store.open_batches(), 0);
        assert_eq!(store.sent_batches(), 0);
    }

    #[tokio::test]
    async fn test_send_failure_commits_nothing() {
        let store = InMemoryStore::new();
        store.inject(FaultPoint::Send);
        let svc = service(&store, IngestLimits::default());

        let err = svc
            .ingest("p1", vec![event("a"), event("b")])
            .await
            .unwrap_err();

        assert_eq!(err.stage(), IngestStage::Send);
        assert_eq!(store.event_count(), 0);
        assert_eq!(store.open_batches(), 0);
    }

    #[tokio::test]
    async fn test_send_timeout_commits_nothing() {
        let store = InMemoryStore::new();
        store.set_send_delay(Some(Duration::from_millis(200)));
        let limits = IngestLimits {
            send_timeout: Duration::from_millis(20),
            ..IngestLimits::default()
        };
        let svc = service(&store, limits);

        let err = svc.ingest("p1", vec![event("a")]).await.unwrap_err();

        assert!(matches!(err, IngestError::Send(StoreError::Timeout(_))));
        assert_eq!(store.event_count(), 0);
        assert_eq!(store.open_batches(), 0);
    }

    #[tokio::test]
    async fn test_identical_payloads_are_not_deduplicated() {
        let store = InMemoryStore::new();
        let svc = service(&store, IngestLimits::default());

        svc.ingest("p1", vec![event("a"), event("b")]).await.unwrap();
        svc.ingest("p1", vec![event("a"), event("b")]).await.unwrap();

        assert_eq!(store.event_count(), 4);
        assert_eq!(store.sent_batches(), 2);
    }
}
