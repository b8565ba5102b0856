//! ClickHouse store implementation
//!
//! Talks to ClickHouse over its HTTP interface. The underlying client keeps a
//! pooled hyper connector and is cheap to clone, so one `ClickHouseStore` is
//! safe to share across all request tasks.

use async_trait::async_trait;
use clickhouse::{insert::Insert, query::Query, sql::Identifier, Client};

use crate::config::{StoreConfig, TableNames, TableRef};
use crate::error::{Result, StoreError};
use crate::models::{EventRow, ProjectRow};
use crate::store::{EventBatch, TelemetryStore};

// =============================================================================
// ClickHouseStore
// =============================================================================

#[derive(Clone)]
pub struct ClickHouseStore {
    client: Client,
    tables: TableNames,
}

impl ClickHouseStore {
    /// Build a store without contacting the server
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_client(config.build_client(), config.tables.clone())
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client, tables: TableNames) -> Self {
        Self { client, tables }
    }

    /// Build a store and verify the server answers
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let store = Self::new(config);

        if let Err(e) = store.ping().await {
            tracing::error!(
                url = %config.endpoint(),
                database = %config.database,
                error = %e,
                "clickhouse ping failed"
            );
            return Err(e);
        }

        tracing::info!(
            url = %config.endpoint(),
            database = %config.database,
            "connected to clickhouse"
        );
        Ok(store)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// `SELECT ?fields FROM <table>` with database and table bound as
    /// separate identifiers
    fn select_all(&self, table: &TableRef) -> Query {
        match &table.database {
            Some(database) => self
                .client
                .query("SELECT ?fields FROM ?.?")
                .bind(Identifier(database))
                .bind(Identifier(&table.table)),
            None => self
                .client
                .query("SELECT ?fields FROM ?")
                .bind(Identifier(&table.table)),
        }
    }

    /// `client.insert` would quote `db.table` as one identifier
    async fn insert<T: clickhouse::Row>(&self, table: &TableRef) -> Result<Insert<T>> {
        Ok(self.client.insert_unescaped(&table.quoted()).await?)
    }
}

#[async_trait]
impl TelemetryStore for ClickHouseStore {
    async fn ping(&self) -> Result<()> {
        self.client.query("SELECT 1").execute().await?;
        Ok(())
    }

    async fn insert_project(&self, row: ProjectRow) -> Result<()> {
        let mut insert: Insert<ProjectRow> = self.insert(&self.tables.projects).await?;
        insert.write(&row).await?;
        insert.end().await?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRow>> {
        let rows = self
            .select_all(&self.tables.projects)
            .fetch_all::<ProjectRow>()
            .await?;
        Ok(rows)
    }

    async fn prepare_event_batch(&self) -> Result<Box<dyn EventBatch>> {
        let insert: Insert<EventRow> = self.insert(&self.tables.events).await?;
        tracing::debug!(table = %self.tables.events, "prepared event batch");
        Ok(Box::new(ClickHouseEventBatch::new(insert)))
    }
}

// =============================================================================
// ClickHouseEventBatch
// =============================================================================

/// One streaming INSERT
///
/// Rows are written into the request body as they are appended. The server
/// only commits once `end()` finishes the request; dropping the `Insert`
/// before that terminates the request and nothing is stored.
pub struct ClickHouseEventBatch {
    insert: Insert<EventRow>,
    rows: usize,
}

impl ClickHouseEventBatch {
    fn new(insert: Insert<EventRow>) -> Self {
        Self { insert, rows: 0 }
    }
}

#[async_trait]
impl EventBatch for ClickHouseEventBatch {
    async fn append(&mut self, row: &EventRow) -> Result<()> {
        self.insert
            .write(row)
            .await
            .map_err(|e| StoreError::write(format!("row {}: {}", self.rows, e)))?;
        self.rows += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.rows
    }

    async fn send(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.insert.end().await?;
        tracing::debug!(rows = this.rows, "event batch committed");
        Ok(())
    }

    fn abort(self: Box<Self>) {
        tracing::debug!(rows = self.rows, "event batch aborted");
        // Dropping the unfinished insert cancels the HTTP request
        drop(self);
    }
}
