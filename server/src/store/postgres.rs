use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::{StoreError, TodoStore};
use crate::config::DatabaseConfig;
use crate::model::{NewTodo, Todo, TodoPatch};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

const CREATE_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_todos_id ON todos(id)";

const SELECT_ALL: &str =
    "SELECT id, title, completed, created_at, updated_at FROM todos ORDER BY id ASC";

const SELECT_ONE: &str =
    "SELECT id, title, completed, created_at, updated_at FROM todos WHERE id = $1";

const INSERT: &str = "INSERT INTO todos (title, completed) VALUES ($1, $2) \
     RETURNING id, title, completed, created_at, updated_at";

const DELETE: &str = "DELETE FROM todos WHERE id = $1";

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i32,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: i64::from(row.id),
            title: row.title,
            completed: row.completed,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// `todos` table behind a sqlx connection pool.
///
/// `update` and `delete` look the row up first and write second, as two
/// statements. A concurrent delete landing between the two is reported as
/// `NotFound`; two concurrent updates are last-write-wins.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool sized and timed by `config`. Fails if the first
    /// connection cannot be established within `connect_timeout`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the table and its index if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        info!("database schema ready");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch(&self, key: i32) -> Result<Option<TodoRow>, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(SELECT_ONE)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

/// `SERIAL` ids are `int4`; anything outside that range cannot exist.
fn row_key(id: i64) -> Result<i32, StoreError> {
    i32::try_from(id).map_err(|_| StoreError::NotFound(id))
}

/// `UPDATE` setting only the supplied columns, plus `updated_at`.
fn update_query(key: i32, patch: TodoPatch) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::<Postgres>::new("UPDATE todos SET ");
    let mut fields = query.separated(", ");
    if let Some(title) = patch.title {
        fields.push("title = ").push_bind_unseparated(title);
    }
    if let Some(completed) = patch.completed {
        fields.push("completed = ").push_bind_unseparated(completed);
    }
    fields.push("updated_at = now()");
    query
        .push(" WHERE id = ")
        .push_bind(key)
        .push(" RETURNING id, title, completed, created_at, updated_at");
    query
}

#[async_trait]
impl TodoStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(INSERT)
            .bind(&todo.title)
            .bind(todo.completed)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query_as::<_, TodoRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        let key = row_key(id)?;
        self.fetch(key)
            .await?
            .map(Todo::from)
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError> {
        let key = row_key(id)?;
        let existing = self.fetch(key).await?.ok_or(StoreError::NotFound(id))?;
        if patch.is_empty() {
            debug!(todo_id = id, "empty patch, returning stored row");
            return Ok(existing.into());
        }

        let mut query = update_query(key, patch);
        let row = query
            .build_query_as::<TodoRow>()
            .fetch_optional(&self.pool)
            .await?;
        row.map(Todo::from).ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<Todo, StoreError> {
        let key = row_key(id)?;
        let existing = self.fetch(key).await?.ok_or(StoreError::NotFound(id))?;
        let result = sqlx::query(DELETE).bind(key).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(existing.into())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
