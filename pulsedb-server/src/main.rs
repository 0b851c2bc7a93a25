//! PulseDB Server - HTTP ingest and read surface for the storage engine

mod api;

use pulsedb_core::storage::{Engine, StorageConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// Base directory for the WAL and segment files
    pub data_dir: PathBuf,
    /// Periodic memtable overview logging
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:9090".parse().unwrap(),
            data_dir: PathBuf::from("data"),
            debug: false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = ServerConfig::default();

    info!("Starting PulseDB server...");
    info!("Data directory: {:?}", config.data_dir);

    let storage_config = StorageConfig {
        wal_path: config.data_dir.join("data.wal"),
        segment_dir: config.data_dir.join("sstables"),
        debug: config.debug,
        ..Default::default()
    };

    let engine = Engine::open(storage_config)?;
    let engine = Arc::new(engine);

    let app = api::create_router(engine);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("PulseDB server listening on http://{}", config.http_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
