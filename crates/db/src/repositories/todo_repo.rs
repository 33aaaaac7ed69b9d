//! Repository for the `todos` table.
//!
//! Deletes are soft: they stamp `deleted_at`, and every other query skips
//! rows where it is set. Updates use `COALESCE` so only supplied fields
//! change.

use async_trait::async_trait;
use futures::StreamExt;
use prototodo_core::error::CoreError;
use prototodo_core::repository::ToDoRepository;
use prototodo_core::stream::ToDoStream;
use prototodo_core::todo::{NewToDo, ToDoItem, ToDoPatch};
use prototodo_core::types::ToDoId;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::models::todo::ToDoRow;

/// Column list for `todos` queries.
const COLUMNS: &str = "id, title, description, reminder, created_at, updated_at, deleted_at";

/// [`ToDoRepository`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgToDoRepository {
    pool: PgPool,
}

impl PgToDoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage_err(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

/// Ids above `i64::MAX` cannot exist in a `BIGSERIAL` column.
fn db_id(id: ToDoId) -> Result<i64, CoreError> {
    i64::try_from(id).map_err(|_| CoreError::todo_not_found(id))
}

#[async_trait]
impl ToDoRepository for PgToDoRepository {
    async fn create(&self, todo: NewToDo) -> Result<ToDoItem, CoreError> {
        let query = format!(
            "INSERT INTO todos (title, description, reminder) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ToDoRow>(&query)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.reminder)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?
            .into_item()
    }

    async fn get_by_id(&self, id: ToDoId) -> Result<ToDoItem, CoreError> {
        let query =
            format!("SELECT {COLUMNS} FROM todos WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, ToDoRow>(&query)
            .bind(db_id(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| CoreError::todo_not_found(id))?
            .into_item()
    }

    async fn get_all(&self, cancel: CancellationToken) -> Result<ToDoStream, CoreError> {
        // Acquire up front so connection failures surface before any item.
        let mut conn = self.pool.acquire().await.map_err(storage_err)?;

        Ok(ToDoStream::spawn(cancel, |sender| async move {
            let query =
                format!("SELECT {COLUMNS} FROM todos WHERE deleted_at IS NULL ORDER BY id");
            let mut rows = sqlx::query_as::<_, ToDoRow>(&query).fetch(&mut *conn);
            let mut sent = 0usize;

            loop {
                let next = tokio::select! {
                    biased;
                    _ = sender.cancellation().cancelled() => {
                        tracing::debug!(sent, "ToDo cursor cancelled by consumer");
                        break;
                    }
                    row = rows.next() => row,
                };

                let Some(row) = next else {
                    break;
                };

                let item = row.map_err(storage_err).and_then(ToDoRow::into_item);
                let failed = item.is_err();
                if !sender.send(item).await || failed {
                    break;
                }
                sent += 1;
            }

            // Closes the cursor before the connection goes back to the pool.
            drop(rows);
            tracing::debug!(sent, "ToDo cursor released");
        }))
    }

    async fn update(&self, id: ToDoId, patch: ToDoPatch) -> Result<ToDoItem, CoreError> {
        let query = format!(
            "UPDATE todos SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 reminder = COALESCE($4, reminder), \
                 updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ToDoRow>(&query)
            .bind(db_id(id)?)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(patch.reminder)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| CoreError::todo_not_found(id))?
            .into_item()
    }

    async fn delete(&self, id: ToDoId) -> Result<ToDoId, CoreError> {
        let deleted: Option<i64> = sqlx::query_scalar(
            "UPDATE todos SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING id",
        )
        .bind(db_id(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match deleted {
            Some(_) => Ok(id),
            None => Err(CoreError::todo_not_found(id)),
        }
    }
}
