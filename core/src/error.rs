//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because callers act on
//! them directly: a missing todo is dropped from view, a rejected payload is
//! shown to the user. Every other non-success response lands in `HttpError`
//! with the raw status and body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404; the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 400 with this message.
    #[error("request rejected: {0}")]
    Validation(String),

    /// The server returned any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
