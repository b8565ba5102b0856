// ClickHouse storage layer
//
// This crate provides the store collaborator used by the API:
// - TelemetryStore / EventBatch: the contract the handlers program against
// - ClickHouseStore: production implementation over the HTTP interface
// - InMemoryStore: test double and local dev backend with fault injection

pub mod clickhouse;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod store;

pub use self::clickhouse::{ClickHouseEventBatch, ClickHouseStore};
pub use config::{StoreConfig, TableNames, TableRef};
pub use error::{Result, StoreError};
pub use memory::{FaultPoint, InMemoryStore};
pub use models::*;
pub use store::{EventBatch, TelemetryStore};
