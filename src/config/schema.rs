//! Configuration schema definitions.
//!
//! `ConfigurationRecord` is the single configuration entity of the service.
//! The keys without a serde default are required: a profile file missing one
//! of them fails to load.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the notifications service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigurationRecord {
    /// Service name reported in every diagnostics record.
    pub application_name: String,

    /// Host advertised to the remote configuration source.
    #[serde(default = "default_service_host")]
    pub service_host: String,

    /// Host the listener binds to. All interfaces unless set.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Port the listener binds to.
    pub service_port: u16,

    /// Per-request deadline in milliseconds.
    pub service_timeout_ms: u64,

    /// Send diagnostics to the remote sink instead of the local file.
    pub enable_remote_logging: bool,

    /// Remote diagnostics sink URL. May be empty.
    pub logging_remote_url: String,

    /// Local diagnostics file path.
    pub logging_file: String,

    /// Message emitted on every heartbeat.
    pub heartbeat_msg: String,

    /// Heartbeat period in milliseconds.
    pub heartbeat_interval_ms: u64,

    /// Banner emitted once the routes are in place.
    pub app_open_msg: String,

    /// Remote configuration host.
    #[serde(default = "default_consul_host")]
    pub consul_host: String,

    /// Remote configuration port.
    #[serde(default = "default_consul_port")]
    pub consul_port: u16,

    /// Health check interval advertised when registering (e.g. "10s").
    #[serde(default = "default_consul_check_interval")]
    pub consul_check_interval: String,

    /// Health check URL advertised when registering. Empty means the ping
    /// endpoint of this service.
    #[serde(default)]
    pub consul_check_address: String,
}

fn default_service_host() -> String {
    "localhost".to_string()
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_consul_host() -> String {
    "localhost".to_string()
}

fn default_consul_port() -> u16 {
    8500
}

fn default_consul_check_interval() -> String {
    "10s".to_string()
}

impl ConfigurationRecord {
    pub fn service_timeout(&self) -> Duration {
        Duration::from_millis(self.service_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.service_port)
    }

    /// Base URL of the remote configuration source.
    pub fn consul_url(&self) -> String {
        format!("http://{}:{}", self.consul_host, self.consul_port)
    }

    /// Health check URL advertised to the remote configuration source.
    pub fn check_address(&self) -> String {
        if self.consul_check_address.is_empty() {
            format!(
                "http://{}:{}/api/v1/ping",
                self.service_host, self.service_port
            )
        } else {
            self.consul_check_address.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        application_name = "support-notifications"
        service_port = 48082
        service_timeout_ms = 5000
        enable_remote_logging = false
        logging_remote_url = ""
        logging_file = "edgex-notifications.log"
        heartbeat_msg = "Support Notifications heart beat"
        heartbeat_interval_ms = 300000
        app_open_msg = "This is the Support Notifications Microservice"
    "#;

    #[test]
    fn test_optional_keys_take_defaults() {
        let config: ConfigurationRecord = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.service_host, "localhost");
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.consul_host, "localhost");
        assert_eq!(config.consul_port, 8500);
        assert_eq!(config.consul_check_interval, "10s");
        assert_eq!(config.service_timeout(), Duration::from_millis(5000));
        assert_eq!(config.bind_address(), "0.0.0.0:48082");
    }

    #[test]
    fn test_advertised_host_does_not_narrow_listener() {
        let config: ConfigurationRecord =
            toml::from_str(&format!("service_host = \"localhost\"\n{MINIMAL}")).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:48082");
        assert_eq!(config.check_address(), "http://localhost:48082/api/v1/ping");
    }

    #[test]
    fn test_shipped_default_profile_listens_on_all_interfaces() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("res/configuration.toml");
        let config: ConfigurationRecord =
            toml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        let addr: std::net::SocketAddr = config.bind_address().parse().unwrap();
        assert!(addr.ip().is_unspecified());
        assert!(!addr.ip().is_loopback());
    }

    #[test]
    fn test_missing_required_key_rejected() {
        let without_port = MINIMAL.replace("service_port = 48082", "");
        assert!(toml::from_str::<ConfigurationRecord>(&without_port).is_err());
    }

    #[test]
    fn test_check_address_derived_from_listener() {
        let mut config: ConfigurationRecord = toml::from_str(MINIMAL).unwrap();
        config.service_host = "notifications".into();
        assert_eq!(config.check_address(), "http://notifications:48082/api/v1/ping");

        config.consul_check_address = "http://probe:1/health".into();
        assert_eq!(config.check_address(), "http://probe:1/health");
    }
}
