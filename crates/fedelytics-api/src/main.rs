// Fedelytics API server
// Decision: Configuration is read once here and handed to constructors
// Decision: Startup fails fast when the store cannot be reached

use anyhow::{Context, Result};
use clap::Parser;
use fedelytics_api::config::{AppConfig, StoreBackend};
use fedelytics_storage::{ClickHouseStore, InMemoryStore, TelemetryStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fedelytics-api")]
#[command(about = "Fedelytics - CLI telemetry ingestion API")]
#[command(version)]
struct Cli {
    /// Verbose, human-readable logs
    #[arg(long, env = "FEDELYTICS_DEBUG")]
    debug: bool,

    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "fedelytics_api=debug,fedelytics_storage=debug,tower_http=debug"
    } else {
        "fedelytics_api=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if debug {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::info!("fedelytics-api starting...");

    let config = AppConfig::from_env();
    tracing::info!(
        backend = ?config.backend,
        max_events = config.ingest.max_events,
        max_body_bytes = config.ingest.max_body_bytes,
        send_timeout_secs = config.ingest.send_timeout.as_secs(),
        "Configuration loaded"
    );

    let store: Arc<dyn TelemetryStore> = match config.backend {
        StoreBackend::ClickHouse => {
            let store = ClickHouseStore::connect(&config.store)
                .await
                .context("Failed to connect to ClickHouse")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let app = fedelytics_api::build_router(store, &config.ingest);

    let listener = tokio::net::TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.listen))?;
    tracing::info!("Listening on {}", cli.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
