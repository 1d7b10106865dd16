//! # Expense Tracker Backend
//!
//! Imports expenses from CSV, resolving group, category, payer and payment
//! mode names to ids with a request-coalescing resolver, and exports stored
//! expenses back to CSV.
//!
//! ## Layers
//!
//! - **io**: axum handlers, one router per concern
//! - **domain**: parsing, resolution, import/export and lookup services
//! - **storage**: repository traits and their SQLite implementation

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod storage;

use config::AppConfig;
use domain::{ExportService, ImportService, LookupService};
use storage::DbConnection;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub import_service: ImportService<DbConnection>,
    pub export_service: ExportService<DbConnection>,
    pub lookup_service: LookupService<DbConnection>,
}

impl AppState {
    /// Wire every service to the same connection
    pub fn new(connection: Arc<DbConnection>, import_concurrency: usize) -> Self {
        Self {
            import_service: ImportService::new(Arc::clone(&connection), import_concurrency),
            export_service: ExportService::new(Arc::clone(&connection)),
            lookup_service: LookupService::new(connection),
        }
    }
}

/// Open the database and build the application state
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!(url = %config.database.url, "Setting up database");
    let connection = DbConnection::new(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.url))?;

    Ok(AppState::new(Arc::new(connection), config.import_concurrency))
}

/// Build the HTTP router with CORS, tracing and the upload size limit
pub fn create_router(state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin '{}'", config.cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let expense_routes = Router::new()
        .merge(io::rest::import_apis::router())
        .merge(io::rest::export_apis::router());

    let api_routes = Router::new()
        .nest("/expenses", expense_routes)
        .nest("/lookups", io::rest::lookup_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
