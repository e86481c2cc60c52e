mod auth;
mod config;
mod db;
mod error;
mod extractors;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Config, DatabaseBackend};
use crate::state::AppState;
use crate::storage::{seed, DynStorage, MemStorage, SqliteStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Ensure uploads directory exists
    std::fs::create_dir_all(config.uploads_path())?;

    // Select the storage backend
    let storage: DynStorage = match config.database.backend {
        DatabaseBackend::Memory => {
            tracing::info!("Using in-memory storage");
            Arc::new(MemStorage::new())
        }
        DatabaseBackend::Sqlite => {
            let pool = db::create_pool(config.db_path())?;
            db::run_migrations(&pool)?;
            tracing::info!("Using SQLite storage at {}", config.db_path().display());
            Arc::new(SqliteStorage::new(pool))
        }
    };

    // First-run population; no-op when the catalog already has classes
    if seed::run(storage.as_ref()).await? {
        tracing::info!("Seeded default catalog data");
    }

    let state = AppState {
        storage,
        config: config.clone(),
    };
    let app = routes::build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
