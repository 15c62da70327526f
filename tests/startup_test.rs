//! End-to-end tests for the startup sequence.

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};

use support_notifications::config::ConfigOverlay;
use support_notifications::lifecycle::startup::load_configuration;
use support_notifications::lifecycle::{
    Bootstrap, ConfigPath, StartupError, StartupOptions, REMOTE_CONFIG_TOKEN,
};
use support_notifications::resilience::TIMEOUT_MESSAGE;

mod common;

use common::{CountingSource, TestDomain};

fn options_for(dir: &std::path::Path, remote_flag: &str) -> StartupOptions {
    StartupOptions {
        remote_flag: remote_flag.into(),
        config_dir: dir.to_path_buf(),
        ..StartupOptions::default()
    }
}

#[tokio::test]
async fn test_local_path_never_calls_remote() {
    let dir = tempfile::tempdir().unwrap();
    common::write_default_profile(dir.path(), 28400, 5000, 1000);

    for flag in ["", "n", "yes"] {
        let source = CountingSource::failing();
        let (config, path) = load_configuration(&options_for(dir.path(), flag), &source)
            .await
            .unwrap();

        assert_eq!(path, ConfigPath::Local);
        assert_eq!(config.service_port, 28400);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0, "flag {flag:?} reached the remote source");
    }
}

#[tokio::test]
async fn test_remote_overlay_applied_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    common::write_default_profile(dir.path(), 28401, 5000, 1000);

    let source = CountingSource::returning(ConfigOverlay::from([
        ("ServicePort".to_string(), "28411".to_string()),
        ("HeartBeatMsg".to_string(), "remote beat".to_string()),
        ("ServiceTimeout".to_string(), "7000".to_string()),
    ]));
    let (config, path) = load_configuration(&options_for(dir.path(), REMOTE_CONFIG_TOKEN), &source)
        .await
        .unwrap();

    assert_eq!(path, ConfigPath::Remote);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(config.service_port, 28411);
    assert_eq!(config.heartbeat_msg, "remote beat");
    assert_eq!(config.service_timeout_ms, 7000);
    assert_eq!(config.heartbeat_interval_ms, 1000);
}

#[tokio::test]
async fn test_missing_configuration_stops_before_domain() {
    let dir = tempfile::tempdir().unwrap();
    let domain = TestDomain::new(Duration::ZERO);
    let init_calls = domain.init_calls.clone();
    let source = CountingSource::failing();
    let remote_calls = source.calls.clone();

    let result = Bootstrap::new("support-notifications", options_for(dir.path(), REMOTE_CONFIG_TOKEN), domain, source)
        .run()
        .await;

    assert!(matches!(result, Err(StartupError::ConfigLoad(_))));
    assert_eq!(init_calls.load(Ordering::SeqCst), 0);
    assert_eq!(remote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remote_failure_is_fatal_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = common::write_default_profile(dir.path(), 28402, 5000, 1000);
    let domain = TestDomain::new(Duration::ZERO);
    let init_calls = domain.init_calls.clone();

    let result = Bootstrap::new(
        "support-notifications",
        options_for(dir.path(), REMOTE_CONFIG_TOKEN),
        domain,
        CountingSource::failing(),
    )
    .run()
    .await;

    assert!(matches!(result, Err(StartupError::RemoteOverride(_))));
    assert_eq!(init_calls.load(Ordering::SeqCst), 0);
    // The configured diagnostics file belongs to the real client, which is never built.
    assert!(!log_file.exists());
    let addr: SocketAddr = "127.0.0.1:28402".parse().unwrap();
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_domain_failure_reported_and_not_served() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = common::write_default_profile(dir.path(), 28403, 5000, 1000);

    let result = Bootstrap::new(
        "support-notifications",
        options_for(dir.path(), ""),
        TestDomain::failing(),
        CountingSource::failing(),
    )
    .run()
    .await;

    assert!(matches!(result, Err(StartupError::DomainInit(_))));

    let log = std::fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("call to init() failed: database unreachable"));
    assert!(!log.contains("Listening on port"));

    let addr: SocketAddr = "127.0.0.1:28403".parse().unwrap();
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_port_in_use_is_server_start_failure() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = common::write_default_profile(dir.path(), 28404, 5000, 1000);
    let _occupied = TcpListener::bind("127.0.0.1:28404").await.unwrap();

    let result = Bootstrap::new(
        "support-notifications",
        options_for(dir.path(), ""),
        TestDomain::new(Duration::ZERO),
        CountingSource::failing(),
    )
    .run()
    .await;

    assert!(matches!(result, Err(StartupError::ServerStart { .. })));
    let log = std::fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("listener on 127.0.0.1:28404 failed"));
}

#[tokio::test]
async fn test_default_profile_serves_with_request_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = common::write_default_profile(dir.path(), 28482, 300, 50);
    let addr: SocketAddr = "127.0.0.1:28482".parse().unwrap();

    let source = CountingSource::failing();
    let remote_calls = source.calls.clone();
    let bootstrap = Bootstrap::new(
        "support-notifications",
        options_for(dir.path(), ""),
        TestDomain::new(Duration::from_millis(600)),
        source,
    );
    tokio::spawn(async move {
        let _ = bootstrap.run().await;
    });
    common::wait_for_listener(addr).await;

    let client = common::http_client();
    let (slow, fast) = tokio::join!(
        client.get(format!("http://{addr}/slow")).send(),
        client.get(format!("http://{addr}/fast")).send(),
    );

    let slow = slow.unwrap();
    assert_eq!(slow.status(), 503);
    assert!(slow.headers().contains_key("x-request-id"));
    assert_eq!(slow.text().await.unwrap(), TIMEOUT_MESSAGE);

    let fast = fast.unwrap();
    assert_eq!(fast.status(), 200);
    assert_eq!(fast.text().await.unwrap(), "fast");

    assert_eq!(remote_calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(150)).await;
    let log = std::fs::read_to_string(&log_file).unwrap();
    let banner = format!("Starting support-notifications {}", support_notifications::VERSION);
    for expected in [
        "Bypassing Consul configuration...",
        banner.as_str(),
        "This is the Support Notifications Microservice",
        "Service started in: ",
        "Listening on port: 28482",
        "Support Notifications heart beat",
    ] {
        assert!(log.contains(expected), "missing {expected:?} in diagnostics");
    }
    let beats = log.matches("Support Notifications heart beat").count();
    assert!(beats >= 2, "expected repeated heartbeats, got {beats}");
}
