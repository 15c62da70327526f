//! Remote configuration override.
//!
//! # Responsibilities
//! - Register the service with the remote configuration source
//! - Fetch the key/value folder for `{application_name};{profile}`
//! - Overlay known keys onto the locally loaded record
//!
//! # Design Decisions
//! - Only keys the record already has are applied; unknown keys are skipped
//! - Values are parsed to the type of the key they replace
//! - The overlaid record is validated again before it is accepted

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::schema::ConfigurationRecord;
use crate::config::loader::join_errors;
use crate::config::validation::{validate_config, ValidationError};

/// Raw key/value pairs fetched from the remote source, keyed by record key.
pub type ConfigOverlay = BTreeMap<String, String>;

/// Error type for the remote override step.
#[derive(Debug, thiserror::Error)]
pub enum RemoteConfigError {
    #[error("remote configuration request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("remote configuration endpoint {endpoint} returned {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("remote configuration key {key} is not valid base64")]
    Decode { key: String },

    #[error("remote configuration value {value:?} is not valid for {key}")]
    InvalidValue { key: String, value: String },

    #[error("could not encode configuration for overlay: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("overlaid configuration is malformed: {0}")]
    Overlay(#[from] toml::de::Error),

    #[error("overlaid configuration failed validation: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A source of configuration values that override the local profile.
#[async_trait]
pub trait RemoteConfigSource: Send + Sync {
    /// Contact the source and return the values it holds for this service.
    async fn fetch(
        &self,
        config: &ConfigurationRecord,
        profile: &str,
    ) -> Result<ConfigOverlay, RemoteConfigError>;
}

/// Fetch from `source` and return `config` with the overlay applied.
pub async fn override_from_remote<R>(
    source: &R,
    config: &ConfigurationRecord,
    profile: &str,
) -> Result<ConfigurationRecord, RemoteConfigError>
where
    R: RemoteConfigSource + ?Sized,
{
    let overlay = source.fetch(config, profile).await?;
    tracing::info!(keys = overlay.len(), "Remote configuration fetched");

    let overridden = apply_overlay(config, &overlay)?;
    validate_config(&overridden).map_err(RemoteConfigError::Validation)?;
    Ok(overridden)
}

/// Key names the platform stores in its KV folder, mapped to record keys.
const REMOTE_KEY_ALIASES: &[(&str, &str)] = &[
    ("ApplicationName", "application_name"),
    ("ServiceHost", "service_host"),
    ("ServicePort", "service_port"),
    ("ServiceTimeout", "service_timeout_ms"),
    ("EnableRemoteLogging", "enable_remote_logging"),
    ("LoggingRemoteURL", "logging_remote_url"),
    ("LoggingFile", "logging_file"),
    ("HeartBeatMsg", "heartbeat_msg"),
    ("HeartBeatTime", "heartbeat_interval_ms"),
    ("AppOpenMsg", "app_open_msg"),
    ("ConsulHost", "consul_host"),
    ("ConsulPort", "consul_port"),
    ("CheckInterval", "consul_check_interval"),
    ("CheckAddress", "consul_check_address"),
];

/// Record key for a remote key. Record keys pass through unchanged.
fn record_key(remote_key: &str) -> &str {
    REMOTE_KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == remote_key)
        .map_or(remote_key, |&(_, key)| key)
}

/// Apply `overlay` on top of `config`.
///
/// Keys may be given as record keys (`service_port`) or as the platform's
/// KV names (`ServicePort`, `HeartBeatTime`).
pub fn apply_overlay(
    config: &ConfigurationRecord,
    overlay: &ConfigOverlay,
) -> Result<ConfigurationRecord, RemoteConfigError> {
    let mut table = toml::Table::try_from(config)?;

    for (raw_key, raw_value) in overlay {
        let key = record_key(raw_key).to_string();
        let Some(current) = table.get(&key) else {
            tracing::debug!(key = %raw_key, "Ignoring unknown remote configuration key");
            continue;
        };

        let invalid = || RemoteConfigError::InvalidValue {
            key: key.clone(),
            value: raw_value.clone(),
        };
        let value = match current {
            toml::Value::Integer(_) => {
                toml::Value::Integer(raw_value.trim().parse().map_err(|_| invalid())?)
            }
            toml::Value::Boolean(_) => {
                toml::Value::Boolean(raw_value.trim().parse().map_err(|_| invalid())?)
            }
            toml::Value::String(_) => toml::Value::String(raw_value.clone()),
            _ => return Err(invalid()),
        };
        table.insert(key, value);
    }

    Ok(toml::Value::Table(table).try_into()?)
}

/// Consul agent backed configuration source.
pub struct ConsulSource {
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceRegistration<'a> {
    name: &'a str,
    address: &'a str,
    port: u16,
    check: HealthCheck,
}

#[derive(Serialize)]
struct HealthCheck {
    #[serde(rename = "HTTP")]
    http: String,
    #[serde(rename = "Interval")]
    interval: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvPair {
    key: String,
    value: Option<String>,
}

impl ConsulSource {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn register(&self, config: &ConfigurationRecord) -> Result<(), RemoteConfigError> {
        let endpoint = format!("{}/v1/agent/service/register", config.consul_url());
        let registration = ServiceRegistration {
            name: &config.application_name,
            address: &config.service_host,
            port: config.service_port,
            check: HealthCheck {
                http: config.check_address(),
                interval: config.consul_check_interval.clone(),
            },
        };

        let response = self
            .client
            .put(&endpoint)
            .json(&registration)
            .send()
            .await
            .map_err(|source| RemoteConfigError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(RemoteConfigError::Status {
                endpoint,
                status: response.status(),
            });
        }

        tracing::info!(service = %config.application_name, "Registered with remote configuration source");
        Ok(())
    }

    async fn read_folder(
        &self,
        config: &ConfigurationRecord,
        profile: &str,
    ) -> Result<ConfigOverlay, RemoteConfigError> {
        let folder = format!("config/{};{}", config.application_name, profile);
        let endpoint = format!("{}/v1/kv/{}?recurse", config.consul_url(), folder);

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| RemoteConfigError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        // An absent folder means nothing to override.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::info!(folder = %folder, "No remote configuration folder, keeping local values");
            return Ok(ConfigOverlay::new());
        }
        if !response.status().is_success() {
            return Err(RemoteConfigError::Status {
                endpoint,
                status: response.status(),
            });
        }

        let pairs: Vec<KvPair> =
            response
                .json()
                .await
                .map_err(|source| RemoteConfigError::Request {
                    endpoint: endpoint.clone(),
                    source,
                })?;

        let mut overlay = ConfigOverlay::new();
        for pair in pairs {
            let Some(encoded) = pair.value else { continue };
            let Some(name) = pair.key.rsplit('/').next().filter(|n| !n.is_empty()) else {
                continue;
            };
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .ok_or_else(|| RemoteConfigError::Decode {
                    key: pair.key.clone(),
                })?;
            overlay.insert(name.to_string(), decoded);
        }
        Ok(overlay)
    }
}

#[async_trait]
impl RemoteConfigSource for ConsulSource {
    async fn fetch(
        &self,
        config: &ConfigurationRecord,
        profile: &str,
    ) -> Result<ConfigOverlay, RemoteConfigError> {
        self.register(config).await?;
        self.read_folder(config, profile).await
    }
}
