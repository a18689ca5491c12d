use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use super::error::AppError;
use super::extract::{JsonBody, TodoId};
use super::AppState;
use crate::model::{CreateTodoRequest, Todo, UpdateTodoRequest};

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = state
        .store
        .list()
        .await
        .map_err(AppError::store("Failed to fetch todos"))?;
    info!(count = todos.len(), "fetched all todos");
    Ok(Json(todos))
}

pub async fn get_todo(
    State(state): State<AppState>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>, AppError> {
    debug!(todo_id = id, "fetching todo");
    let todo = state
        .store
        .get(id)
        .await
        .map_err(AppError::store("Failed to fetch todo"))?;
    info!(todo_id = id, title = %todo.title, "todo retrieved");
    Ok(Json(todo))
}

pub async fn create_todo(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let new_todo = input.validate()?;
    let todo = state
        .store
        .create(new_todo)
        .await
        .map_err(AppError::store("Failed to create todo"))?;
    info!(
        todo_id = todo.id,
        title = %todo.title,
        completed = todo.completed,
        "todo created"
    );
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    TodoId(id): TodoId,
    JsonBody(input): JsonBody<UpdateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    let patch = input.validate()?;
    debug!(todo_id = id, ?patch, "updating todo");
    let todo = state
        .store
        .update(id, patch)
        .await
        .map_err(AppError::store("Failed to update todo"))?;
    info!(
        todo_id = id,
        title = %todo.title,
        completed = todo.completed,
        "todo updated"
    );
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    TodoId(id): TodoId,
) -> Result<StatusCode, AppError> {
    debug!(todo_id = id, "deleting todo");
    let removed = state
        .store
        .delete(id)
        .await
        .map_err(AppError::store("Failed to delete todo"))?;
    info!(todo_id = id, title = %removed.title, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
