//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration, optionally overlay it from the remote source
//! - Resolve the diagnostics target and build the diagnostics client
//! - Initialize the domain, start the heartbeat, bind and serve
//!
//! # Design Decisions
//! - Fail fast: any startup error is reported once and is fatal
//! - Steps run in order, never concurrently, never retried
//! - Failures before the diagnostics client exists go to the fallback client
//! - Listener starts last (traffic only when ready)

use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::remote::override_from_remote;
use crate::config::{
    load_profile, ConfigError, ConfigurationRecord, RemoteConfigError, RemoteConfigSource,
    DEFAULT_CONFIG_DIR, DEFAULT_PROFILE,
};
use crate::domain::{DomainError, DomainInitializer, RouteProvider};
use crate::health::heartbeat;
use crate::http::HttpServer;
use crate::observability::{resolve_logging_target, DiagnosticsClient};
use crate::VERSION;

/// Value of the remote flag that requests the remote override.
pub const REMOTE_CONFIG_TOKEN: &str = "y";

/// Fatal startup failures, one per step that can fail.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    ConfigLoad(#[from] ConfigError),

    #[error(transparent)]
    RemoteOverride(#[from] RemoteConfigError),

    #[error("call to init() failed: {0}")]
    DomainInit(#[source] DomainError),

    #[error("listener on {address} failed: {source}")]
    ServerStart {
        address: String,
        source: std::io::Error,
    },
}

/// Startup options taken from the command line.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub profile: String,
    /// Raw remote flag; only [`REMOTE_CONFIG_TOKEN`] enables the override.
    pub remote_flag: String,
    pub config_dir: PathBuf,
}

impl StartupOptions {
    pub fn remote_requested(&self) -> bool {
        self.remote_flag == REMOTE_CONFIG_TOKEN
    }
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            remote_flag: String::new(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
        }
    }
}

/// Which configuration path bootstrap took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPath {
    Local,
    Remote,
}

impl ConfigPath {
    pub fn message(self) -> &'static str {
        match self {
            ConfigPath::Local => "Bypassing Consul configuration...",
            ConfigPath::Remote => "Loading configuration from Consul...",
        }
    }
}

/// Steps a and b: local load, then the remote overlay when requested.
///
/// The remote source is not touched unless the flag asks for it. Once it is
/// asked for, its failure is fatal.
pub async fn load_configuration<R>(
    options: &StartupOptions,
    remote: &R,
) -> Result<(ConfigurationRecord, ConfigPath), StartupError>
where
    R: RemoteConfigSource + ?Sized,
{
    let config = load_profile(&options.config_dir, &options.profile)?;

    if !options.remote_requested() {
        return Ok((config, ConfigPath::Local));
    }

    let config = override_from_remote(remote, &config, &options.profile).await?;
    Ok((config, ConfigPath::Remote))
}

/// Steps c and d: resolve the target and build the real client.
pub fn diagnostics_for(config: &ConfigurationRecord) -> DiagnosticsClient {
    let target = resolve_logging_target(
        config.enable_remote_logging,
        &config.logging_remote_url,
        &config.logging_file,
    );
    DiagnosticsClient::new(
        config.application_name.as_str(),
        config.enable_remote_logging,
        target,
    )
}

/// The startup sequencer.
pub struct Bootstrap<D, R> {
    service_name: String,
    options: StartupOptions,
    domain: D,
    remote: R,
    started: Instant,
}

impl<D, R> Bootstrap<D, R>
where
    D: DomainInitializer + RouteProvider,
    R: RemoteConfigSource,
{
    pub fn new(service_name: impl Into<String>, options: StartupOptions, domain: D, remote: R) -> Self {
        Self {
            service_name: service_name.into(),
            options,
            domain,
            remote,
            started: Instant::now(),
        }
    }

    /// Measure the reported startup time from `started` instead of from
    /// construction.
    pub fn started_at(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    /// Run every step in order. Serves until the listener fails; every
    /// error is reported before it is returned.
    pub async fn run(self) -> Result<Infallible, StartupError> {
        let Self {
            service_name,
            options,
            mut domain,
            remote,
            started,
        } = self;

        let (config, path) = match load_configuration(&options, &remote).await {
            Ok(loaded) => loaded,
            Err(e) => {
                DiagnosticsClient::fallback(service_name).error(e.to_string());
                return Err(e);
            }
        };

        let diagnostics = diagnostics_for(&config);
        diagnostics.info(path.message());
        diagnostics.info(format!("Starting {} {}", service_name, VERSION));

        let result = serve(config, &diagnostics, &mut domain, started).await;
        if let Err(e) = &result {
            diagnostics.error(e.to_string());
        }
        result
    }
}

/// Steps f to j, all reported through the real client.
async fn serve<D>(
    config: ConfigurationRecord,
    diagnostics: &DiagnosticsClient,
    domain: &mut D,
    started: Instant,
) -> Result<Infallible, StartupError>
where
    D: DomainInitializer + RouteProvider,
{
    domain
        .init(&config, diagnostics)
        .await
        .map_err(StartupError::DomainInit)?;

    let server = HttpServer::new(domain.routes(), &config);
    diagnostics.info(config.app_open_msg.as_str());

    heartbeat::start(
        config.heartbeat_msg.as_str(),
        config.heartbeat_interval(),
        diagnostics.clone(),
    );

    diagnostics.info(format!("Service started in: {:?}", started.elapsed()));
    diagnostics.info(format!("Listening on port: {}", config.service_port));

    let address = server.bind_address().to_string();
    let listener = match server.bind().await {
        Ok(listener) => listener,
        Err(source) => return Err(StartupError::ServerStart { address, source }),
    };
    let source = match server.run(listener).await {
        Ok(()) => stopped_serving(),
        Err(source) => source,
    };
    Err(StartupError::ServerStart { address, source })
}

/// The server only returns cleanly if it stopped accepting connections.
fn stopped_serving() -> std::io::Error {
    std::io::Error::other("server stopped serving")
}
