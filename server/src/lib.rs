//! Todo tracking service: CRUD over a single `todos` resource plus a
//! storage-backed health probe.
//!
//! # Overview
//! - `store`: the `TodoStore` contract and its in-memory and PostgreSQL
//!   implementations.
//! - `http`: the axum router, handlers and error mapping.
//! - `health`: the `/health` probe.
//! - `config` / `telemetry`: environment configuration and log setup used by
//!   the binary.

pub mod config;
pub mod health;
pub mod http;
pub mod model;
pub mod store;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

pub use http::{router, AppState, ErrorBody};
pub use model::Todo;
pub use store::{MemoryStore, PgStore, StoreError, TodoStore};

/// Router over a fresh, empty in-memory store.
pub fn app() -> Router {
    router(Arc::new(MemoryStore::new()))
}

/// Serve the in-memory app on `listener` until the process exits.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `store` on `listener`, draining in-flight requests once `shutdown`
/// resolves.
pub async fn serve<F>(
    listener: TcpListener,
    store: Arc<dyn TodoStore>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}
