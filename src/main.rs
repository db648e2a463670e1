mod config;
mod db;
mod error;
mod handlers;
mod metadata;
mod middleware;
mod models;
mod retry;
mod services;
mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::metadata::{MetadataStore, SqliteMetadataStore};
use crate::storage::BlobStore;

/// Application state shared across handlers
///
/// Built once at startup; everything in here is read-only afterwards and safe
/// to share across concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn MetadataStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabvault=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting tabvault...");

    // Load configuration
    let config = Config::load()?;
    let config = Arc::new(config);
    tracing::info!("Configuration loaded");

    // Initialize metadata database
    let db = Database::new(&config.database.path).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    // Initialize blob store
    let storage = storage::build_blob_store(&config.storage)?;
    tracing::info!("Blob store backend: {}", storage.backend());

    let metadata: Arc<dyn MetadataStore> = Arc::new(SqliteMetadataStore::new(db));

    // Create app state
    let state = AppState {
        config: config.clone(),
        storage,
        metadata,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // All routes require authentication
    let protected_routes = Router::new()
        .route("/files", get(handlers::file::list_files))
        .route("/files/upload", post(handlers::file::upload_files))
        .route("/files/:id", delete(handlers::file::delete_file))
        .route("/files/:id/view", get(handlers::file::view_file))
        .route("/maintenance/sweep", post(handlers::maintenance::sweep))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", protected_routes)
        // Room for a multi-file batch of 10 MiB uploads.
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
