//! HTTP surface: routes, shared state and middleware.
//!
//! Handlers never touch todos directly. They validate input, call the
//! `TodoStore` held in `AppState`, and map the outcome to a status code and
//! JSON body. Every failure goes through `AppError`.

pub mod error;
pub mod extract;
pub mod middleware;
pub mod todos;

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware as axum_middleware, Router};

use crate::health;
use crate::store::TodoStore;

pub use error::{AppError, ErrorBody};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

/// Build the full router over `store`.
pub fn router(store: Arc<dyn TodoStore>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(AppState { store })
        .layer(axum_middleware::from_fn(middleware::catch_panic))
        .layer(axum_middleware::from_fn(middleware::log_request))
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
