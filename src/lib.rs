//! Support notifications service: startup sequencer.
//!
//! # Architecture Overview
//!
//! ```text
//!   args ──▶ config::loader ──▶ [config::remote] ──▶ observability::target
//!                                                         │
//!                                                         ▼
//!            domain::init ◀── DiagnosticsClient ◀─────────┘
//!                 │
//!                 ▼
//!           domain::routes ──▶ resilience::timeouts ──▶ http::server ──▶ clients
//!                 │
//!                 └──▶ health::heartbeat (detached)
//! ```

// Core subsystems
pub mod config;
pub mod domain;
pub mod http;
pub mod notifications;

// Cross-cutting concerns
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

/// Version reported in the startup banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::ConfigurationRecord;
pub use http::HttpServer;
pub use lifecycle::{Bootstrap, StartupError, StartupOptions};
pub use observability::DiagnosticsClient;
