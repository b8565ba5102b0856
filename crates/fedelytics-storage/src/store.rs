//! Store traits
//!
//! These traits let the API run against different backends:
//! - ClickHouse for production
//! - In-memory for tests and local development

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{EventRow, ProjectRow};

// ============================================================================
// TelemetryStore - shared, long-lived store handle
// ============================================================================

/// Store collaborator used by the HTTP handlers
///
/// Implementations are opened once at startup, wrapped in an `Arc` and shared
/// by every request task, so they must tolerate concurrent batch and query
/// operations without external locking.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Round-trip to the server
    async fn ping(&self) -> Result<()>;

    /// Insert one project row
    async fn insert_project(&self, row: ProjectRow) -> Result<()>;

    /// All project rows in store order
    async fn list_projects(&self) -> Result<Vec<ProjectRow>>;

    /// Open a batch bound to the events table
    ///
    /// Nothing appended becomes visible until [`EventBatch::send`] succeeds.
    async fn prepare_event_batch(&self) -> Result<Box<dyn EventBatch>>;
}

// ============================================================================
// EventBatch - per-request, all-or-nothing insert
// ============================================================================

/// An atomic, ordered collection of rows committed as one unit
///
/// `send` and `abort` consume the handle, so a batch is closed exactly once.
/// Dropping an unsent batch aborts it; this covers early returns and
/// cancelled request futures.
#[async_trait]
pub trait EventBatch: Send {
    /// Append a row; may flush buffered data but never commits it
    async fn append(&mut self, row: &EventRow) -> Result<()>;

    /// Number of rows appended so far
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commit every appended row, or none of them
    async fn send(self: Box<Self>) -> Result<()>;

    /// Discard the batch and release store-side resources
    fn abort(self: Box<Self>);
}
