//! Conversion of every handler failure into a JSON error response.
//!
//! Client errors carry a message the caller can act on. Storage faults are
//! logged with their full source chain and answered with a fixed,
//! per-operation message so no internal detail reaches the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::model::ValidationError;
use crate::store::StoreError;

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid todo id")]
    InvalidId,

    #[error("todo {0} not found")]
    NotFound(i64),

    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("no route for request")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Adapter for `map_err`: `NotFound` stays a 404, anything else becomes
    /// a 500 answered with `message`.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |err| match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            source => Self::Storage { message, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Storage { .. } | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::InvalidId => "Invalid todo id".to_string(),
            Self::NotFound(_) => "Todo not found".to_string(),
            Self::Storage { message, .. } => (*message).to_string(),
            Self::RouteNotFound => "Not found".to_string(),
            Self::MethodNotAllowed => "Method not allowed".to_string(),
            Self::Internal => "Internal server error".to_string(),
        }
    }

    fn log(&self) {
        match self {
            Self::Validation(err) => warn!(reason = %err, "rejected invalid request"),
            Self::InvalidId => warn!("rejected non-numeric todo id"),
            Self::NotFound(id) => warn!(todo_id = id, "todo not found"),
            Self::Storage { message, source } => error!(error = %source, "{message}"),
            Self::RouteNotFound | Self::MethodNotAllowed => {}
            // Already logged where the fault was caught.
            Self::Internal => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_404() {
        let err = AppError::store("Failed to fetch todo")(StoreError::NotFound(9));
        assert!(matches!(err, AppError::NotFound(9)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Todo not found");
    }

    #[test]
    fn store_fault_maps_to_generic_500() {
        let err = AppError::store("Failed to fetch todos")(StoreError::Unavailable(
            sqlx::Error::PoolTimedOut,
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to fetch todos");
    }

    #[test]
    fn validation_errors_are_400_with_their_message() {
        let err = AppError::from(ValidationError::MissingTitle);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Title is required");
    }

    #[test]
    fn unsupported_method_is_405() {
        let err = AppError::MethodNotAllowed;
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.public_message(), "Method not allowed");
    }
}
