//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve)
//!     → SetRequestId → Trace → PropagateRequestId (tower-http)
//!     → request deadline (resilience::timeouts)
//!     → domain routing table
//! ```

pub mod server;

pub use server::HttpServer;
