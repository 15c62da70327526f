//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Take the routing table produced by the domain
//! - Wrap it with the per-request deadline, request IDs and tracing
//! - Bind the configured address and serve until the process ends

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ConfigurationRecord;
use crate::resilience::with_request_deadline;

/// HTTP server for the notifications service.
pub struct HttpServer {
    router: Router,
    bind_address: String,
}

impl HttpServer {
    /// Create a server around a finished routing table.
    pub fn new(routes: Router, config: &ConfigurationRecord) -> Self {
        Self {
            router: Self::build_router(routes, config.service_timeout()),
            bind_address: config.bind_address(),
        }
    }

    /// Wrap the routes with middleware. The deadline sits innermost so it
    /// only measures handler time.
    fn build_router(routes: Router, request_timeout: Duration) -> Router {
        with_request_deadline(routes, request_timeout)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, std::io::Error> {
        TcpListener::bind(&self.bind_address).await
    }

    /// Serve on `listener`. Only returns on a listener error.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
