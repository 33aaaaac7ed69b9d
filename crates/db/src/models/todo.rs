//! Row mapping for the `todos` table.

use prototodo_core::error::CoreError;
use prototodo_core::todo::ToDoItem;
use prototodo_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `todos` table.
#[derive(Debug, Clone, FromRow)]
pub struct ToDoRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub reminder: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ToDoRow {
    /// Convert into the domain item. `BIGSERIAL` ids are always positive,
    /// anything else means the table was tampered with.
    pub fn into_item(self) -> Result<ToDoItem, CoreError> {
        let id = u64::try_from(self.id)
            .map_err(|_| CoreError::Internal(format!("todos row has invalid id {}", self.id)))?;

        Ok(ToDoItem {
            id,
            title: self.title,
            description: self.description,
            reminder: self.reminder,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}
