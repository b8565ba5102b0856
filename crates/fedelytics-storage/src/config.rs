//! Store connection configuration
//!
//! Plain values only; environment loading lives in the API binary so the
//! storage crate stays free of process-global state.

use clickhouse::Client;

/// Default connection address
pub const DEFAULT_URL: &str = "localhost:9000";

/// Default database name
pub const DEFAULT_DATABASE: &str = "default";

/// Default credentials
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

/// Product name reported to the server with every request
const PRODUCT_NAME: &str = "fedelytics";

/// A table, optionally qualified by its database
///
/// `telemetry.events` names table `events` in database `telemetry`; a bare
/// name resolves against the client's default database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub database: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            table: table.into(),
        }
    }

    /// Split `db.table` on the first dot
    pub fn parse(name: &str) -> Self {
        match name.trim().split_once('.') {
            Some((database, table)) if !database.is_empty() => Self::new(database, table),
            Some((_, table)) => Self {
                database: None,
                table: table.to_string(),
            },
            None => Self {
                database: None,
                table: name.trim().to_string(),
            },
        }
    }

    /// Backtick-quoted name with each part escaped separately,
    /// e.g. `` `telemetry`.`events` ``
    pub fn quoted(&self) -> String {
        let mut out = String::new();
        if let Some(database) = &self.database {
            quote_identifier(database, &mut out);
            out.push('.');
        }
        quote_identifier(&self.table, &mut out);
        out
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.database {
            Some(database) => write!(f, "{}.{}", database, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

/// ClickHouse identifier quoting: backtick-wrapped, backslash escapes
fn quote_identifier(name: &str, out: &mut String) {
    out.push('`');
    for c in name.chars() {
        match c {
            '\\' | '\'' | '`' => {
                out.push('\\');
                out.push(c);
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('`');
}

/// Tables the store reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Telemetry events table
    pub events: TableRef,
    /// Projects table
    pub projects: TableRef,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            events: TableRef::new("telemetry", "events"),
            projects: TableRef::new("projects", "list"),
        }
    }
}

/// Configuration for the ClickHouse store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Server address. A bare `host:port` is treated as plain HTTP.
    pub url: String,

    /// Database name
    pub database: String,

    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,

    /// Table names
    pub tables: TableNames,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            database: DEFAULT_DATABASE.into(),
            username: DEFAULT_USERNAME.into(),
            password: DEFAULT_PASSWORD.into(),
            tables: TableNames::default(),
        }
    }
}

impl StoreConfig {
    /// Set the server URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set custom table names
    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    /// URL with a scheme, as the HTTP client requires one
    pub fn endpoint(&self) -> String {
        if self.url.contains("://") {
            self.url.clone()
        } else {
            format!("http://{}", self.url)
        }
    }

    /// Build the ClickHouse client from this config
    pub fn build_client(&self) -> Client {
        Client::default()
            .with_url(self.endpoint())
            .with_database(&self.database)
            .with_user(&self.username)
            .with_password(&self.password)
            .with_product_info(PRODUCT_NAME, env!("CARGO_PKG_VERSION"))
    }
}
