// In-memory store implementation
// Decision: Use parking_lot for thread-safe access
// Decision: Rows become visible only when a batch is sent, mirroring ClickHouse
//
// Used by tests and by local runs without a ClickHouse server. Faults can be
// injected at each store interaction to exercise the failure paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::error::{Result, StoreError};
use crate::models::{EventRow, ProjectRow};
use crate::store::{EventBatch, TelemetryStore};

/// Store interaction that should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    Ping,
    InsertProject,
    ListProjects,
    Prepare,
    /// Fail the append of the row at this zero-based index
    Append { at: usize },
    Send,
}

#[derive(Default)]
struct MemoryState {
    projects: RwLock<Vec<ProjectRow>>,
    events: RwLock<Vec<EventRow>>,
    faults: Mutex<Vec<FaultPoint>>,
    send_delay: Mutex<Option<Duration>>,
    open_batches: AtomicUsize,
    sent_batches: AtomicUsize,
}

impl MemoryState {
    fn check(&self, point: FaultPoint) -> Result<()> {
        if self.faults.lock().contains(&point) {
            return Err(StoreError::write(format!("injected fault at {:?}", point)));
        }
        Ok(())
    }
}

/// In-memory store
/// All data is held in memory and lost on restart
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given interaction fail until cleared
    pub fn inject(&self, point: FaultPoint) {
        self.state.faults.lock().push(point);
    }

    pub fn clear_faults(&self) {
        self.state.faults.lock().clear();
    }

    /// Delay every batch send, for timeout and cancellation tests
    pub fn set_send_delay(&self, delay: Option<Duration>) {
        *self.state.send_delay.lock() = delay;
    }

    /// Committed event rows in commit order
    pub fn events(&self) -> Vec<EventRow> {
        self.state.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.state.events.read().len()
    }

    pub fn projects(&self) -> Vec<ProjectRow> {
        self.state.projects.read().clone()
    }

    /// Batches prepared but not yet sent, aborted or dropped
    pub fn open_batches(&self) -> usize {
        self.state.open_batches.load(Ordering::SeqCst)
    }

    /// Batches committed successfully
    pub fn sent_batches(&self) -> usize {
        self.state.sent_batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetryStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        self.state
            .check(FaultPoint::Ping)
            .map_err(|_| StoreError::unavailable("in-memory store marked unavailable"))
    }

    async fn insert_project(&self, row: ProjectRow) -> Result<()> {
        self.state.check(FaultPoint::InsertProject)?;
        self.state.projects.write().push(row);
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRow>> {
        self.state.check(FaultPoint::ListProjects)?;
        Ok(self.state.projects.read().clone())
    }

    async fn prepare_event_batch(&self) -> Result<Box<dyn EventBatch>> {
        self.state.check(FaultPoint::Prepare)?;
        self.state.open_batches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryEventBatch {
            state: Arc::clone(&self.state),
            rows: Vec::new(),
        }))
    }
}

/// Buffers rows locally and publishes them under one write lock on send
struct MemoryEventBatch {
    state: Arc<MemoryState>,
    rows: Vec<EventRow>,
}

#[async_trait]
impl EventBatch for MemoryEventBatch {
    async fn append(&mut self, row: &EventRow) -> Result<()> {
        self.state.check(FaultPoint::Append {
            at: self.rows.len(),
        })?;
        self.rows.push(row.clone());
        Ok(())
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    async fn send(self: Box<Self>) -> Result<()> {
        let mut this = self;

        let delay = *this.state.send_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        this.state.check(FaultPoint::Send)?;

        let rows = std::mem::take(&mut this.rows);
        this.state.events.write().extend(rows);
        this.state.sent_batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn abort(self: Box<Self>) {
        drop(self);
    }
}

impl Drop for MemoryEventBatch {
    fn drop(&mut self) {
        self.state.open_batches.fetch_sub(1, Ordering::SeqCst);
    }
}
