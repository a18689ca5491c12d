//! Persistence for todos.
//!
//! # Design
//! `TodoStore` is the single seam between the HTTP layer and storage. Two
//! implementations satisfy the same contract: `MemoryStore` (process-local,
//! no timestamps) and `PgStore` (a `todos` table). One of them is chosen at
//! startup and handed to the router as `Arc<dyn TodoStore>`.
//!
//! Ids are assigned by the store, strictly increasing, and never reused
//! after a delete. `list` is always ordered by ascending id.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{NewTodo, Todo, TodoPatch};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No todo with this id exists (or it was deleted).
    #[error("todo {0} not found")]
    NotFound(i64),

    /// The backing database could not be reached or the query failed.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Short name used in startup logs.
    fn backend(&self) -> &'static str;

    async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    async fn get(&self, id: i64) -> Result<Todo, StoreError>;

    /// Merge `patch` into the stored todo. An empty patch returns the todo
    /// as stored, without refreshing `updated_at`.
    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError>;

    /// Remove the todo and return it as it was before removal.
    async fn delete(&self, id: i64) -> Result<Todo, StoreError>;

    /// Trivial read used by the health probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
