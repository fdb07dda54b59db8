//! HTTP API for users, loans and their amortization figures.

pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::service::LoanService;
use crate::config::ServerConfig;

/// The loan HTTP server.
pub struct Server {
    config: ServerConfig,
    service: Arc<LoanService>,
}

impl Server {
    pub fn new(config: ServerConfig, service: Arc<LoanService>) -> Self {
        Self { config, service }
    }

    /// Build the router with tracing and CORS layers.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router(self.service.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Serve until Ctrl-C.
    pub async fn start(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
