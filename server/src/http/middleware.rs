use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::error::AppError;
use crate::telemetry::panic_message;

/// Emit one `info` event per request, inside a span carrying a fresh
/// request id.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = Uuid::new_v4();
    let span = info_span!("request", %method, %path, %request_id);

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        info!(
            status = response.status().as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "HTTP request"
        );
        response
    }
    .instrument(span)
    .await
}

/// Last-resort boundary: a panicking handler becomes a logged 500 instead
/// of a dropped connection. Location and backtrace are logged by the hook
/// from `telemetry::install_panic_hook`.
pub async fn catch_panic(req: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            error!(panic = %panic_message(payload.as_ref()), "unhandled fault in handler");
            AppError::Internal.into_response()
        }
    }
}
