use crate::types::ToDoId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: ToDoId },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing to-do item.
    pub fn todo_not_found(id: ToDoId) -> Self {
        CoreError::NotFound { entity: "ToDo", id }
    }
}
