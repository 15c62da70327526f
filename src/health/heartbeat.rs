//! Periodic liveness signal.
//!
//! The heartbeat runs as a detached task: nothing joins it, nothing
//! restarts it, and whatever happens inside it never reaches the caller or
//! affects request serving.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::observability::DiagnosticsClient;

/// Spawn the heartbeat. The first beat is emitted immediately.
///
/// Must be called from within a tokio runtime.
pub fn start(message: impl Into<String>, interval: Duration, diagnostics: DiagnosticsClient) {
    let message = message.into();

    tracing::info!(interval_ms = interval.as_millis() as u64, "Heartbeat starting");

    // Dropping the JoinHandle detaches the task.
    drop(tokio::spawn(beat(message, interval, diagnostics)));
}

async fn beat(message: String, interval: Duration, diagnostics: DiagnosticsClient) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        diagnostics.info(message.as_str());
    }
}
