// Application configuration loaded from environment variables.
// Decision: Keep CLICKHOUSE_* names for the store connection
// Decision: Read the environment once in main and pass values into constructors

use std::convert::Infallible;
use std::str::FromStr;
use std::time::Duration;

use fedelytics_storage::{config as store_defaults, StoreConfig, TableNames, TableRef};

/// Default maximum number of events accepted in one ingest request
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

/// Default maximum request body size (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default deadline for committing one batch
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Which store implementation to run against
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// ClickHouse over HTTP
    #[default]
    ClickHouse,
    /// Process-local store, data lost on restart
    Memory,
}

/// Unknown values select ClickHouse
impl FromStr for StoreBackend {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "memory" | "in-memory" => StoreBackend::Memory,
            _ => StoreBackend::ClickHouse,
        })
    }
}

/// Bounds applied to every ingest request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestLimits {
    /// Maximum events per request
    pub max_events: usize,
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
    /// Deadline for the batch send
    pub send_timeout: Duration,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub backend: StoreBackend,
    pub store: StoreConfig,
    pub ingest: IngestLimits,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend = lookup("FEDELYTICS_STORE")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let table = |key: &str, default: TableRef| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| TableRef::parse(&v))
                .unwrap_or(default)
        };
        let defaults = TableNames::default();
        let store = StoreConfig::default()
            .with_url(var("CLICKHOUSE_URL", store_defaults::DEFAULT_URL))
            .with_database(var("CLICKHOUSE_DB", store_defaults::DEFAULT_DATABASE))
            .with_credentials(
                var("CLICKHOUSE_USER", store_defaults::DEFAULT_USERNAME),
                var("CLICKHOUSE_PASSWORD", store_defaults::DEFAULT_PASSWORD),
            )
            .with_tables(TableNames {
                events: table("CLICKHOUSE_EVENTS_TABLE", defaults.events),
                projects: table("CLICKHOUSE_PROJECTS_TABLE", defaults.projects),
            });

        let max_events = lookup("INGEST_MAX_EVENTS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_EVENTS);

        let max_body_bytes = lookup("INGEST_MAX_BODY_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let send_timeout = lookup("INGEST_SEND_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SEND_TIMEOUT);

        Self {
            backend,
            store,
            ingest: IngestLimits {
                max_events,
                max_body_bytes,
                send_timeout,
            },
        }
    }
}
