//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConfigurationRecord → Result<(), Vec<ValidationError>>
//! - Runs again after a remote overlay

use crate::config::schema::ConfigurationRecord;

/// A single semantic problem in a configuration record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("application_name must not be empty")]
    EmptyApplicationName,

    #[error("service_port must not be 0")]
    ZeroServicePort,

    #[error("service_timeout_ms must be greater than 0")]
    ZeroServiceTimeout,

    #[error("heartbeat_interval_ms must be greater than 0")]
    ZeroHeartbeatInterval,

    #[error("logging_file must be set when remote logging is disabled")]
    MissingLoggingFile,
}

/// Check a record, collecting every problem found.
pub fn validate_config(config: &ConfigurationRecord) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.application_name.trim().is_empty() {
        errors.push(ValidationError::EmptyApplicationName);
    }
    if config.service_port == 0 {
        errors.push(ValidationError::ZeroServicePort);
    }
    if config.service_timeout_ms == 0 {
        errors.push(ValidationError::ZeroServiceTimeout);
    }
    if config.heartbeat_interval_ms == 0 {
        errors.push(ValidationError::ZeroHeartbeatInterval);
    }
    if !config.enable_remote_logging && config.logging_file.trim().is_empty() {
        errors.push(ValidationError::MissingLoggingFile);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
