//! Per-request deadline.
//!
//! # Responsibilities
//! - Wrap the whole routing table with one deadline per request
//! - Answer with a fixed timeout response when the deadline passes
//!
//! # Design Decisions
//! - The handler runs in its own task and is raced against the deadline
//! - On timeout the wrapper stops waiting but does not cancel the handler
//! - Timed-out requests return 503 with "Request timed out"
//! - A panicking handler returns 500

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tokio::time;

/// Body of the response sent when a request runs past its deadline.
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Wrap every route of `router` with the same `deadline`.
pub fn with_request_deadline(router: Router, deadline: Duration) -> Router {
    router.layer(middleware::from_fn_with_state(deadline, dispatch_with_deadline))
}

async fn dispatch_with_deadline(
    State(deadline): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let received = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let handler = tokio::spawn(next.run(request));

    match time::timeout(deadline, handler).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(method = %method, path = %path, error = %e, "Request handler failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(_) => {
            tracing::warn!(
                method = %method,
                path = %path,
                elapsed_ms = received.elapsed().as_millis() as u64,
                "Request timed out"
            );
            timed_out()
        }
    }
}

fn timed_out() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, TIMEOUT_MESSAGE).into_response()
}
