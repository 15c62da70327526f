//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → timeouts.rs (race the routed handler against service_timeout_ms)
//!     → handler response, or 503 "Request timed out"
//! ```
//!
//! # Design Decisions
//! - One blanket deadline for every route, not configurable per route
//! - Timeouts are an expected outcome under load, not a system error

pub mod timeouts;

pub use timeouts::{with_request_deadline, TIMEOUT_MESSAGE};
