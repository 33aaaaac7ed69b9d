//! To-do item domain model and its create/update inputs.

use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, ToDoId};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A stored to-do item.
///
/// `id`, `created_at` and `updated_at` are assigned by the repository.
/// `deleted_at` is only set on soft-deleted items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDoItem {
    pub id: ToDoId,
    pub title: String,
    pub description: String,
    pub reminder: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Fields supplied by a caller when creating an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToDo {
    pub title: String,
    pub description: String,
    pub reminder: Timestamp,
}

/// Field-level partial update.
///
/// Only `Some` fields overwrite the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToDoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reminder: Option<Timestamp>,
}

impl ToDoPatch {
    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.reminder.is_none()
    }

    /// Merge the supplied fields into `item`, refreshing `updated_at`.
    pub fn apply(self, item: &mut ToDoItem, now: Timestamp) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(reminder) = self.reminder {
            item.reminder = reminder;
        }
        item.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn item() -> ToDoItem {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        ToDoItem {
            id: 1,
            title: "Buy milk".to_string(),
            description: "two litres".to_string(),
            reminder: t0,
            created_at: t0,
            updated_at: t0,
            deleted_at: None,
        }
    }

    #[test]
    fn apply_title_only_keeps_other_fields() {
        let mut todo = item();
        let before = todo.clone();
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();

        ToDoPatch {
            title: Some("Buy oat milk".to_string()),
            ..Default::default()
        }
        .apply(&mut todo, now);

        assert_eq!(todo.title, "Buy oat milk");
        assert_eq!(todo.description, before.description);
        assert_eq!(todo.reminder, before.reminder);
        assert_eq!(todo.created_at, before.created_at);
        assert_eq!(todo.updated_at, now);
    }

    #[test]
    fn empty_patch_only_touches_updated_at() {
        let mut todo = item();
        let patch = ToDoPatch::default();
        assert!(patch.is_empty());

        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        patch.apply(&mut todo, now);

        let mut expected = item();
        expected.updated_at = now;
        assert_eq!(todo, expected);
    }
}
