use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use support_notifications::config::{ConsulSource, DEFAULT_CONFIG_DIR, DEFAULT_PROFILE};
use support_notifications::lifecycle::{Bootstrap, StartupOptions};
use support_notifications::notifications::{NotificationsService, SERVICE_NAME};
use support_notifications::observability::logging::init_logging;
use support_notifications::DiagnosticsClient;

/// Timeout for each call to the remote configuration source.
const REMOTE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "support-notifications")]
#[command(version, about = "Support notifications microservice", long_about = None)]
struct Cli {
    /// Load configuration overrides from Consul ("y" to enable)
    #[arg(short, long, default_value = "")]
    consul: String,

    /// Configuration profile
    #[arg(short, long, default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Directory holding the profile files
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    confdir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let started = Instant::now();
    let cli = Cli::parse();

    init_logging();

    let remote = match ConsulSource::new(REMOTE_REQUEST_TIMEOUT) {
        Ok(remote) => remote,
        Err(e) => {
            DiagnosticsClient::fallback(SERVICE_NAME)
                .error(format!("cannot build remote configuration client: {e}"));
            return ExitCode::FAILURE;
        }
    };

    let options = StartupOptions {
        profile: cli.profile,
        remote_flag: cli.consul,
        config_dir: cli.confdir,
    };

    let bootstrap = Bootstrap::new(SERVICE_NAME, options, NotificationsService::new(), remote)
        .started_at(started);

    match bootstrap.run().await {
        Ok(never) => match never {},
        Err(_) => ExitCode::FAILURE,
    }
}
