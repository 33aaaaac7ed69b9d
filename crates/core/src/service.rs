//! Orchestration between the request handler and the repository.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::repository::ToDoRepository;
use crate::stream::ToDoStream;
use crate::todo::{NewToDo, ToDoItem, ToDoPatch};
use crate::types::ToDoId;

/// Forwards every CRUD call to the configured [`ToDoRepository`] unchanged.
///
/// Cheaply cloneable; no retries, no caching.
#[derive(Clone)]
pub struct ToDoService {
    repo: Arc<dyn ToDoRepository>,
}

impl ToDoService {
    pub fn new(repo: Arc<dyn ToDoRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, todo: NewToDo) -> Result<ToDoItem, CoreError> {
        self.repo.create(todo).await
    }

    pub async fn read(&self, id: ToDoId) -> Result<ToDoItem, CoreError> {
        self.repo.get_by_id(id).await
    }

    pub async fn read_all(&self, cancel: CancellationToken) -> Result<ToDoStream, CoreError> {
        self.repo.get_all(cancel).await
    }

    pub async fn update(&self, id: ToDoId, patch: ToDoPatch) -> Result<ToDoItem, CoreError> {
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: ToDoId) -> Result<ToDoId, CoreError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;
    use crate::memory::MemoryToDoRepository;

    fn service() -> ToDoService {
        ToDoService::new(Arc::new(MemoryToDoRepository::new()))
    }

    #[tokio::test]
    async fn forwards_crud_to_repository() {
        let svc = service();
        let created = svc
            .create(NewToDo {
                title: "Buy milk".into(),
                description: String::new(),
                reminder: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(svc.read(created.id).await.unwrap(), created);

        let updated = svc
            .update(
                created.id,
                ToDoPatch {
                    description: Some("semi-skimmed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.description, "semi-skimmed");

        let mut all = svc.read_all(CancellationToken::new()).await.unwrap();
        assert_eq!(all.next().await.unwrap().unwrap().id, created.id);
        assert!(all.next().await.is_none());

        assert_eq!(svc.delete(created.id).await.unwrap(), created.id);
        assert_matches!(svc.read(created.id).await, Err(CoreError::NotFound { .. }));
    }
}
