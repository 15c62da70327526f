//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load profile → [remote overlay] → Resolve diagnostics target
//!     → Diagnostics client → Domain init → Routes → Heartbeat → Serve
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then diagnostics, then domain, then listener
//! - No shutdown coordination: the process ends when the listener fails
//!   or the process is stopped externally

pub mod startup;

pub use startup::{Bootstrap, ConfigPath, StartupError, StartupOptions, REMOTE_CONFIG_TOKEN};
