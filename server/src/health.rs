//! Health reporting: a trivial storage read turned into a status document.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::http::AppState;
use crate::store::TodoStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub message: String,
    pub database: StorageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Ping the store. Never mutates anything and never fails: an unreachable
/// store is reported, not propagated.
pub async fn check(store: &dyn TodoStore) -> HealthReport {
    match store.ping().await {
        Ok(()) => HealthReport {
            status: HealthStatus::Ok,
            message: "Backend is healthy".to_string(),
            database: StorageStatus::Connected,
            error: None,
        },
        Err(err) => {
            error!(error = %err, "storage health check failed");
            HealthReport {
                status: HealthStatus::Unhealthy,
                message: "Backend is unhealthy".to_string(),
                database: StorageStatus::Disconnected,
                error: Some("storage unavailable".to_string()),
            }
        }
    }
}

/// `GET /health`: 200 when storage answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    info!("health check requested");
    let report = check(state.store.as_ref()).await;
    (
        report.status_code(),
        [(header::CACHE_CONTROL, "no-store")],
        Json(report),
    )
        .into_response()
}
