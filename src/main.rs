use std::sync::Arc;

use dotenvy::dotenv;
use log::{info, warn};
use thiserror::Error;

use stockroom::{
    config::{Config, ConfigError},
    create_router,
    database::{create_database_pool, run_migrations},
    errors::{RepositoryError, ServiceError},
    repository::{DynInventoryStore, MemoryStore, PgStore},
    AppState,
};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] RepositoryError),

    #[error("could not create bootstrap manager: {0}")]
    Bootstrap(#[from] ServiceError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    if let Err(err) = run().await {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let store: DynInventoryStore = match &config.database_url {
        Some(database_url) => {
            let db = create_database_pool(database_url).await?;
            if config.run_migrations {
                run_migrations(&db).await?;
            }
            Arc::new(PgStore::new(db))
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config.auth.clone());

    if let Some(manager) = &config.bootstrap_manager {
        state.auth.ensure_manager(&manager.username, &manager.password).await?;
    }

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Stockroom server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
    }
}
