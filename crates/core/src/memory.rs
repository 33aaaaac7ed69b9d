//! In-memory [`ToDoRepository`] backed by a `BTreeMap`.
//!
//! Follows the same contract as the PostgreSQL repository: ids start at 1,
//! deletes are soft and deleted items are invisible afterwards. Suitable
//! for tests and local development.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::repository::ToDoRepository;
use crate::stream::ToDoStream;
use crate::todo::{NewToDo, ToDoItem, ToDoPatch};
use crate::types::ToDoId;

pub struct MemoryToDoRepository {
    items: RwLock<BTreeMap<ToDoId, ToDoItem>>,
    next_id: AtomicU64,
}

impl Default for MemoryToDoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryToDoRepository {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Seed the repository with fully formed items, keeping their ids.
    pub fn with_items(items: impl IntoIterator<Item = ToDoItem>) -> Self {
        let items: BTreeMap<_, _> = items.into_iter().map(|t| (t.id, t)).collect();
        let next_id = items.keys().next_back().map_or(1, |id| id + 1);

        Self {
            items: RwLock::new(items),
            next_id: AtomicU64::new(next_id),
        }
    }

    /// Raw lookup that also sees soft-deleted items.
    pub async fn get_including_deleted(&self, id: ToDoId) -> Option<ToDoItem> {
        self.items.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl ToDoRepository for MemoryToDoRepository {
    async fn create(&self, todo: NewToDo) -> Result<ToDoItem, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let item = ToDoItem {
            id,
            title: todo.title,
            description: todo.description,
            reminder: todo.reminder,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.items.write().await.insert(id, item.clone());
        Ok(item)
    }

    async fn get_by_id(&self, id: ToDoId) -> Result<ToDoItem, CoreError> {
        self.items
            .read()
            .await
            .get(&id)
            .filter(|t| t.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| CoreError::todo_not_found(id))
    }

    async fn get_all(&self, cancel: CancellationToken) -> Result<ToDoStream, CoreError> {
        let snapshot: Vec<ToDoItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|t| t.deleted_at.is_none())
            .cloned()
            .collect();

        Ok(ToDoStream::from_items(cancel, snapshot))
    }

    async fn update(&self, id: ToDoId, patch: ToDoPatch) -> Result<ToDoItem, CoreError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&id)
            .filter(|t| t.deleted_at.is_none())
            .ok_or_else(|| CoreError::todo_not_found(id))?;

        patch.apply(item, Utc::now());
        Ok(item.clone())
    }

    async fn delete(&self, id: ToDoId) -> Result<ToDoId, CoreError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&id)
            .filter(|t| t.deleted_at.is_none())
            .ok_or_else(|| CoreError::todo_not_found(id))?;

        item.deleted_at = Some(Utc::now());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn new_todo(title: &str) -> NewToDo {
        NewToDo {
            title: title.to_string(),
            description: "from the shop".to_string(),
            reminder: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
        }
    }

    async fn drain(repo: &MemoryToDoRepository) -> Vec<ToDoId> {
        let mut stream = repo.get_all(CancellationToken::new()).await.unwrap();
        let mut ids = Vec::new();
        while let Some(item) = stream.next().await {
            ids.push(item.unwrap().id);
        }
        ids
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = MemoryToDoRepository::new();
        let a = repo.create(new_todo("a")).await.unwrap();
        let b = repo.create(new_todo("b")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
        assert!(a.deleted_at.is_none());
    }

    #[tokio::test]
    async fn delete_is_soft_and_hides_item() {
        let repo = MemoryToDoRepository::new();
        let item = repo.create(new_todo("a")).await.unwrap();

        assert_eq!(repo.delete(item.id).await.unwrap(), item.id);
        assert_matches!(
            repo.get_by_id(item.id).await,
            Err(CoreError::NotFound { id: 1, .. })
        );
        assert_matches!(repo.delete(item.id).await, Err(CoreError::NotFound { .. }));

        let raw = repo.get_including_deleted(item.id).await.unwrap();
        assert!(raw.deleted_at.is_some());
        assert!(drain(&repo).await.is_empty());
    }

    #[tokio::test]
    async fn update_missing_item_is_not_found() {
        let repo = MemoryToDoRepository::new();
        let result = repo.update(9, ToDoPatch::default()).await;
        assert_matches!(result, Err(CoreError::NotFound { id: 9, .. }));
    }

    #[tokio::test]
    async fn get_all_returns_live_items_in_id_order() {
        let repo = MemoryToDoRepository::new();
        for title in ["a", "b", "c"] {
            repo.create(new_todo(title)).await.unwrap();
        }
        repo.delete(2).await.unwrap();

        assert_eq!(drain(&repo).await, vec![1, 3]);
    }

    #[tokio::test]
    async fn with_items_continues_id_sequence() {
        let seeded = MemoryToDoRepository::new().create(new_todo("x")).await.unwrap();
        let repo = MemoryToDoRepository::with_items([ToDoItem { id: 7, ..seeded }]);

        let next = repo.create(new_todo("y")).await.unwrap();
        assert_eq!(next.id, 8);
    }
}
