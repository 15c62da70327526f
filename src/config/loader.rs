//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ConfigurationRecord;
use crate::config::validation::{validate_config, ValidationError};

/// Profile selected when none is given on the command line.
pub const DEFAULT_PROFILE: &str = "default";

/// Directory searched for profile files when none is given.
pub const DEFAULT_CONFIG_DIR: &str = "res";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse configuration {}: {}", .path.display(), .source.message())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("configuration validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// File holding the given profile inside `config_dir`.
///
/// The default profile lives in `configuration.toml`, every other profile
/// `p` in `configuration-p.toml`.
pub fn profile_path(config_dir: &Path, profile: &str) -> PathBuf {
    if profile.is_empty() || profile == DEFAULT_PROFILE {
        config_dir.join("configuration.toml")
    } else {
        config_dir.join(format!("configuration-{}.toml", profile))
    }
}

/// Load and validate the configuration for `profile`.
pub fn load_profile(config_dir: &Path, profile: &str) -> Result<ConfigurationRecord, ConfigError> {
    load_config(&profile_path(config_dir, profile))
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ConfigurationRecord, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ConfigurationRecord =
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), "Configuration file loaded");
    Ok(config)
}
