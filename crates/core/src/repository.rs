//! Persistence contract consumed by [`ToDoService`](crate::service::ToDoService).
//!
//! Implemented by storage engines outside this crate (PostgreSQL in
//! `prototodo-db`) and by [`MemoryToDoRepository`](crate::memory::MemoryToDoRepository).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::stream::ToDoStream;
use crate::todo::{NewToDo, ToDoItem, ToDoPatch};
use crate::types::ToDoId;

/// Abstract CRUD capability over [`ToDoItem`]s.
///
/// Lookups of an absent id fail with [`CoreError::NotFound`]. Any other
/// failure is reported as [`CoreError::Storage`] or [`CoreError::Internal`].
#[async_trait]
pub trait ToDoRepository: Send + Sync {
    /// Persist a new item, returning it with its id and timestamps.
    async fn create(&self, todo: NewToDo) -> Result<ToDoItem, CoreError>;

    async fn get_by_id(&self, id: ToDoId) -> Result<ToDoItem, CoreError>;

    /// Stream every live item in id order.
    ///
    /// The returned stream owns `cancel`. Implementations must stop
    /// producing and release their resources once it fires.
    async fn get_all(&self, cancel: CancellationToken) -> Result<ToDoStream, CoreError>;

    /// Field-level merge: only the `Some` fields of `patch` are written.
    async fn update(&self, id: ToDoId, patch: ToDoPatch) -> Result<ToDoItem, CoreError>;

    /// Delete an item, returning its id.
    async fn delete(&self, id: ToDoId) -> Result<ToDoId, CoreError>;
}
