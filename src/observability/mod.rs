//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap, heartbeat, domain:
//!     → diagnostics.rs (DiagnosticsClient: level + message + detail)
//!         → local file (one JSON line per record)  or  remote sink (HTTP POST)
//!         → tracing event (logging.rs subscriber, stdout)
//!
//! Target selection:
//!     target.rs (remote flag, remote URL, local file) → target
//! ```
//!
//! # Design Decisions
//! - One DiagnosticsClient handle, cloned into every component; no global
//! - A fallback client exists for failures before the target is known
//! - Write/post failures are logged, never propagated

pub mod diagnostics;
pub mod logging;
pub mod target;

pub use diagnostics::{DiagnosticsClient, LogEntry, LogLevel};
pub use target::resolve_logging_target;
