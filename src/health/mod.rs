//! Liveness subsystem.
//!
//! # Data Flow
//! ```text
//! heartbeat.rs:
//!     tokio interval (heartbeat_interval_ms)
//!     → DiagnosticsClient::info(heartbeat_msg)
//! ```
//!
//! # Design Decisions
//! - Started after domain init succeeds, before the listener binds
//! - Detached: no join point, no supervision

pub mod heartbeat;
