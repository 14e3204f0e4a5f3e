//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the built-in handlers
//! - Wire up middleware (access log, timeout, correlation stack)
//! - Bind server to listener
//! - Stop gracefully when the shutdown signal fires

use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::handlers::{correlation_snapshot, health};
use crate::http::layers;

/// HTTP server exposing the correlation snapshot endpoint.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the built-in routes.
    pub fn new(config: AppConfig) -> Self {
        Self::with_routes(config, Router::new())
    }

    /// Create a server that also serves `routes`, wrapped in the same stack.
    pub fn with_routes(config: AppConfig, routes: Router) -> Self {
        let router = Self::build_router(&config, routes);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, routes: Router) -> Router {
        // Access log inside the correlation stack so its events carry the id.
        let router = routes
            .route("/correlation", get(correlation_snapshot))
            .route("/health", get(health))
            .layer(TraceLayer::new_for_http());

        layers::apply(router, config)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
