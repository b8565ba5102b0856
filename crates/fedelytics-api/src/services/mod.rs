// Services layer for business logic
// Services own validation and orchestration, calling the store directly

pub mod enrichment;
pub mod ingest;
pub mod project;

pub use enrichment::{Clock, Enricher, SessionIdGenerator, SystemClock, UuidSessionIds};
pub use ingest::{IngestError, IngestService, IngestStage};
pub use project::{ProjectError, ProjectService};
