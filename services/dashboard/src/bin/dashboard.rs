//! services/dashboard/src/bin/dashboard.rs

use dashboard_lib::{
    adapters::PgDocumentStore,
    config::{Config, StoreBackend},
    error::ApiError,
    web::{router, state::AppState},
};
use pregnancy_tracker_core::lookup::GuidanceTables;
use pregnancy_tracker_core::ports::DocumentStore;
use pregnancy_tracker_core::MemoryDocumentStore;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect the Document Store ---
    let store: Option<Arc<dyn DocumentStore>> = match &config.store_backend {
        StoreBackend::Postgres { database_url } => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let pg_store = PgDocumentStore::new(db_pool);
            info!("Running database migrations...");
            pg_store.run_migrations().await?;
            info!("Database migrations complete.");
            Some(Arc::new(pg_store))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory document store; data is lost on restart.");
            Some(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Unconfigured => {
            warn!("No document store configured; sign-in is disabled and sessions are local-only.");
            None
        }
    };

    // --- 3. Load the Guidance Tables ---
    let guidance = match &config.guidance_path {
        Some(path) => {
            info!("Loading guidance tables from {}", path.display());
            GuidanceTables::from_json_file(path)?
        }
        None => GuidanceTables::builtin(),
    };

    // --- 4. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState::new(config.clone(), store, guidance));
    let app = router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
