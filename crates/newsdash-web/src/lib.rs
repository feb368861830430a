//! Request/response interface for newsdash.
//!
//! Every route reads the shared, already-loaded [`Dataset`]; nothing here
//! mutates it.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use newsdash_core::Dataset;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, ServeError};

#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Dataset>,
    table_limit: usize,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, table_limit: usize) -> Self {
        Self {
            dataset,
            table_limit,
        }
    }

    fn source(&self) -> String {
        self.dataset.source().display().to_string()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/options", get(handlers::options))
        .route("/api/records/:news_id", get(handlers::record))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    let local_addr = listener.local_addr().map_err(ServeError::Serve)?;
    info!(
        addr = %local_addr,
        rows = state.dataset.len(),
        source = %state.source(),
        "serving dashboard"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
