// src/logging_middleware.rs
//! Request logging middleware
//!
//! Query strings are never logged: the OAuth callback carries the
//! authorization code there and the landing page carries the issued token.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Log method, path, status and latency of every request
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    debug!(method = %method, path = %path, "📥 Request");

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        warn!(method = %method, path = %path, status = %status, latency_ms, "📤 Response");
    } else {
        info!(method = %method, path = %path, status = %status, latency_ms, "📤 Response");
    }

    response
}
