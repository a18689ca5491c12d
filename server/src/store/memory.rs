use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{StoreError, TodoStore};
use crate::model::{NewTodo, Todo, TodoPatch};

/// Process-local store. Todos live in a `BTreeMap` keyed by id so iteration
/// order is already ascending.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    todos: BTreeMap<i64, Todo>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let todo = Todo {
            id: state.last_id,
            title: todo.title,
            completed: todo.completed,
            created_at: None,
            updated_at: None,
        };
        state.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let state = self.state.read().await;
        Ok(state.todos.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        let state = self.state.read().await;
        state.todos.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError> {
        let mut state = self.state.write().await;
        let todo = state.todos.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !patch.apply(todo) {
            debug!(todo_id = id, "empty patch, returning stored todo");
        }
        Ok(todo.clone())
    }

    async fn delete(&self, id: i64) -> Result<Todo, StoreError> {
        let mut state = self.state.write().await;
        state.todos.remove(&id).ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
