// Event enrichment
// Decision: Server-assigned fields are written from injected capabilities so
// tests can pin time and ids
// Decision: One clock reading per event feeds both event_time and ingested_at

use chrono::{DateTime, Utc};
use fedelytics_contracts::TelemetryEventInput;
use fedelytics_storage::EventRow;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of per-event session ids
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random UUID v4 ids (122 random bits), hyphenated lowercase
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSessionIds;

impl SessionIdGenerator for UuidSessionIds {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Turns a validated client event into a storable row
#[derive(Clone)]
pub struct Enricher {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn SessionIdGenerator>,
}

impl Enricher {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn SessionIdGenerator>) -> Self {
        Self { clock, ids }
    }

    /// Wall clock and random UUIDs
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidSessionIds))
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Overwrite every server-owned field; client fields pass through untouched
    pub fn enrich(&self, event: TelemetryEventInput, project_id: &str) -> EventRow {
        let now = self.clock.now();

        EventRow {
            event_time: now,
            ingested_at: now,
            project_id: project_id.to_string(),
            user_id: event.user_id,
            session_id: self.ids.generate(),
            cli_version: event.cli_version,
            command: event.command,
            exit_code: event.exit_code,
            os: event.os,
            arch: event.arch,
            latency_ms: event.latency_ms,
            success: event.success,
            extra: encode_extra(event.extra),
        }
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::system()
    }
}

fn encode_extra(extra: Option<Map<String, Value>>) -> String {
    Value::Object(extra.unwrap_or_default()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Default)]
    struct SequentialIds(AtomicUsize);

    impl SessionIdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("session-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn input() -> TelemetryEventInput {
        TelemetryEventInput {
            user_id: "u1".into(),
            cli_version: "2.0.1".into(),
            command: "deploy".into(),
            exit_code: 2,
            os: "darwin".into(),
            arch: "arm64".into(),
            latency_ms: 845.25,
            success: 0,
            extra: None,
        }
    }

    fn fixed_enricher() -> Enricher {
        Enricher::new(
            Arc::new(FixedClock(fixed_time())),
            Arc::new(SequentialIds::default()),
        )
    }

    #[test]
    fn test_enrich_sets_server_fields() {
        let row = fixed_enricher().enrich(input(), "proj-7");

        assert_eq!(row.project_id, "proj-7");
        assert_eq!(row.event_time, fixed_time());
        assert_eq!(row.ingested_at, fixed_time());
        assert_eq!(row.session_id, "session-0");
    }

    #[test]
    fn test_enrich_preserves_client_fields() {
        let row = fixed_enricher().enrich(input(), "proj-7");

        assert_eq!(row.user_id, "u1");
        assert_eq!(row.cli_version, "2.0.1");
        assert_eq!(row.command, "deploy");
        assert_eq!(row.exit_code, 2);
        assert_eq!(row.os, "darwin");
        assert_eq!(row.arch, "arm64");
        assert_eq!(row.latency_ms, 845.25);
        assert_eq!(row.success, 0);
    }

    #[test]
    fn test_each_event_gets_its_own_session_id() {
        let enricher = fixed_enricher();
        let first = enricher.enrich(input(), "p");
        let second = enricher.enrich(input(), "p");
        assert_ne!(first.session_id, second.session_id);
    }

    #[test]
    fn test_extra_encoding() {
        let enricher = fixed_enricher();

        let row = enricher.enrich(input(), "p");
        assert_eq!(row.extra, "{}");

        let mut event = input();
        let mut extra = Map::new();
        extra.insert("shell".into(), Value::String("fish".into()));
        extra.insert("ci".into(), Value::Bool(true));
        event.extra = Some(extra);

        let row = enricher.enrich(event, "p");
        let decoded: Value = serde_json::from_str(&row.extra).unwrap();
        assert_eq!(decoded["shell"], "fish");
        assert_eq!(decoded["ci"], true);
    }

    #[test]
    fn test_uuid_session_ids_do_not_collide() {
        let ids = UuidSessionIds;
        let generated: HashSet<String> = (0..10_000).map(|_| ids.generate()).collect();
        assert_eq!(generated.len(), 10_000);
    }

    #[test]
    fn test_uuid_session_id_format() {
        let id = UuidSessionIds.generate();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id, id.to_lowercase());
    }
}
