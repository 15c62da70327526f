//! Built-in notifications domain.
//!
//! Exposes the endpoints every service of the platform answers; the
//! notification handlers themselves plug in behind the same traits.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};

use crate::config::ConfigurationRecord;
use crate::domain::{DomainError, DomainInitializer, RouteProvider};
use crate::observability::DiagnosticsClient;

/// Name the service reports before its configuration is known.
pub const SERVICE_NAME: &str = "support-notifications";

pub const PING_PATH: &str = "/api/v1/ping";
pub const CONFIG_PATH: &str = "/api/v1/config";

#[derive(Clone)]
struct AppState {
    config: Arc<ConfigurationRecord>,
}

/// Notifications domain. Routes beyond ping are only available once
/// `init` has run.
#[derive(Default)]
pub struct NotificationsService {
    state: Option<AppState>,
}

impl NotificationsService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainInitializer for NotificationsService {
    async fn init(
        &mut self,
        config: &ConfigurationRecord,
        diagnostics: &DiagnosticsClient,
    ) -> Result<(), DomainError> {
        if self.state.is_some() {
            return Err(DomainError::Init("notifications domain already initialized".into()));
        }

        self.state = Some(AppState {
            config: Arc::new(config.clone()),
        });
        diagnostics.debug("Notifications domain initialized");
        Ok(())
    }
}

impl RouteProvider for NotificationsService {
    fn routes(&self) -> Router {
        let router = Router::new().route(PING_PATH, get(ping));

        match &self.state {
            Some(state) => router.merge(
                Router::new()
                    .route(CONFIG_PATH, get(get_config))
                    .with_state(state.clone()),
            ),
            None => router,
        }
    }
}

async fn ping() -> &'static str {
    "pong"
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigurationRecord> {
    Json(state.config.as_ref().clone())
}
