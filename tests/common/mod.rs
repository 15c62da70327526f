//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{routing::get, Router};
use tokio::net::{TcpListener, TcpStream};

use support_notifications::config::{
    ConfigOverlay, ConfigurationRecord, RemoteConfigError, RemoteConfigSource,
};
use support_notifications::domain::{DomainError, DomainInitializer, RouteProvider};
use support_notifications::DiagnosticsClient;

/// Write `configuration.toml` for the default profile and return the path
/// of the diagnostics file it points at.
#[allow(dead_code)]
pub fn write_default_profile(dir: &Path, port: u16, timeout_ms: u64, heartbeat_ms: u64) -> PathBuf {
    let log_file = dir.join("edgex-notifications.log");
    let content = format!(
        r#"
application_name = "support-notifications"
service_host = "127.0.0.1"
bind_host = "127.0.0.1"
service_port = {port}
service_timeout_ms = {timeout_ms}
enable_remote_logging = false
logging_remote_url = "http://unused:48061/api/v1/logs"
logging_file = "{log}"
heartbeat_msg = "Support Notifications heart beat"
heartbeat_interval_ms = {heartbeat_ms}
app_open_msg = "This is the Support Notifications Microservice"
"#,
        log = log_file.display(),
    );
    std::fs::write(dir.join("configuration.toml"), content).unwrap();
    log_file
}

/// Domain stand-in with a fast and a slow route.
#[allow(dead_code)]
pub struct TestDomain {
    pub init_calls: Arc<AtomicUsize>,
    pub fail_init: bool,
    pub slow_delay: Duration,
}

#[allow(dead_code)]
impl TestDomain {
    pub fn new(slow_delay: Duration) -> Self {
        Self {
            init_calls: Arc::new(AtomicUsize::new(0)),
            fail_init: false,
            slow_delay,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::new(Duration::ZERO)
        }
    }
}

#[async_trait]
impl DomainInitializer for TestDomain {
    async fn init(
        &mut self,
        _config: &ConfigurationRecord,
        diagnostics: &DiagnosticsClient,
    ) -> Result<(), DomainError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(DomainError::Init("database unreachable".into()));
        }
        diagnostics.info("test domain ready");
        Ok(())
    }
}

impl RouteProvider for TestDomain {
    fn routes(&self) -> Router {
        let slow_delay = self.slow_delay;
        Router::new()
            .route(
                "/fast",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    "fast"
                }),
            )
            .route(
                "/slow",
                get(move || async move {
                    tokio::time::sleep(slow_delay).await;
                    "slow"
                }),
            )
    }
}

/// Remote source that counts calls and returns a fixed overlay, or fails
/// when it has none.
#[allow(dead_code)]
pub struct CountingSource {
    pub calls: Arc<AtomicUsize>,
    pub overlay: Option<ConfigOverlay>,
}

#[allow(dead_code)]
impl CountingSource {
    pub fn returning(overlay: ConfigOverlay) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            overlay: Some(overlay),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            overlay: None,
        }
    }
}

#[async_trait]
impl RemoteConfigSource for CountingSource {
    async fn fetch(
        &self,
        _config: &ConfigurationRecord,
        _profile: &str,
    ) -> Result<ConfigOverlay, RemoteConfigError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.overlay
            .clone()
            .ok_or_else(|| RemoteConfigError::Status {
                endpoint: "http://consul:8500/v1/kv/config".into(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
    }
}

/// Serve `router` on `addr` in the background.
#[allow(dead_code)]
pub async fn start_mock_server(addr: SocketAddr, router: Router) {
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
}

/// Wait until something accepts connections on `addr`.
#[allow(dead_code)]
pub async fn wait_for_listener(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("nothing listening on {addr}");
}

#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
