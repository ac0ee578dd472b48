//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the healthz handlers
//! - Wire up middleware (request ID, tracing, inbound deadline)
//! - Serve until the shutdown signal fires

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::health::HealthzCheck;
use crate::http::healthz::install_handler;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};

/// HTTP server exposing the health endpoint.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server serving `checks` under `/healthz`.
    pub fn new(config: &ListenerConfig, checks: Vec<Arc<dyn HealthzCheck>>) -> Self {
        let router = Self::build_router(config, checks);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The inbound deadline drops the handler future when it expires, which
    /// also drops any in-flight status probe and its socket.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, checks: Vec<Arc<dyn HealthzCheck>>) -> Router {
        install_handler(Router::new(), checks)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router, for mounting elsewhere or testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Health server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}
