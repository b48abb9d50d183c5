//! `api` crate — HTTP REST API layer.
//!
//! Exposes:
//!   GET    /health
//!   GET    /ads
//!   POST   /ads
//!   GET    /ads/:id
//!   PATCH  /ads/:id
//!   POST   /ads/:id/repair-request
//!   GET    /ads/:id/repair-request
//!   DELETE /ads/:id/repair-request
//!   GET    /repair-requests
//!   PATCH  /repair-requests/:id
//!
//! The acting user is named by the `x-user-id` header.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use db::PgStore;
use store::RecordStore;

pub use config::ServerConfig;
pub use error::{ApiError, ServeError};
pub use handlers::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ads", get(handlers::ads::list).post(handlers::ads::create))
        .route("/ads/:id", get(handlers::ads::get).patch(handlers::ads::update))
        .route(
            "/ads/:id/repair-request",
            post(handlers::repair::request)
                .get(handlers::repair::lookup)
                .delete(handlers::repair::cancel),
        )
        .route("/repair-requests", get(handlers::repair::list))
        .route("/repair-requests/:id", patch(handlers::repair::advance))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `store` on `bind` until the process is stopped.
pub async fn serve(bind: &str, store: Arc<dyn RecordStore>) -> Result<(), ServeError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(AppState::new(store))).await?;
    Ok(())
}

/// Connect to Postgres as described by `config` and serve it.
pub async fn run(config: ServerConfig) -> Result<(), ServeError> {
    let pool = db::pool::create_pool(&config.database_url, config.max_connections).await?;
    if config.migrate {
        db::pool::run_migrations(&pool).await?;
    }
    serve(&config.bind, Arc::new(PgStore::new(pool))).await
}
