//! Synchronous client contract for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the six
//! service operations (health, list, get, create, update, delete) without
//! touching the network. The embedding UI executes the round-trip.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and both halves are testable with plain data.
//! - Wire types are defined independently of the server crate.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, HealthReport, Todo, UpdateTodo};
