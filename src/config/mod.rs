//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! {confdir}/configuration[-{profile}].toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → [--consul y] remote.rs (register, fetch, overlay, re-validate)
//!     → ConfigurationRecord (validated, immutable)
//!     → shared via Arc once the server starts
//! ```
//!
//! # Design Decisions
//! - Config is mutable only during bootstrap
//! - Required keys have no defaults; a missing key fails the load
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod remote;
pub mod schema;
pub mod validation;

pub use loader::{load_profile, ConfigError, DEFAULT_CONFIG_DIR, DEFAULT_PROFILE};
pub use remote::{ConfigOverlay, ConsulSource, RemoteConfigError, RemoteConfigSource};
pub use schema::ConfigurationRecord;
