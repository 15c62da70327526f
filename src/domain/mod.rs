//! Contracts for the domain subsystem.
//!
//! The bootstrap only knows the domain through these two traits: one call
//! to prepare domain state, one call to obtain the routing table.

use async_trait::async_trait;
use axum::Router;

use crate::config::ConfigurationRecord;
use crate::observability::DiagnosticsClient;

/// Error returned by a domain that could not initialize.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{0}")]
    Init(String),
}

/// Prepares domain state from the final configuration.
#[async_trait]
pub trait DomainInitializer: Send {
    async fn init(
        &mut self,
        config: &ConfigurationRecord,
        diagnostics: &DiagnosticsClient,
    ) -> Result<(), DomainError>;
}

/// Produces the routing table served by the HTTP layer.
pub trait RouteProvider {
    fn routes(&self) -> Router;
}
