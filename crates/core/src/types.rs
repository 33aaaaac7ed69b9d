/// Store-assigned identity of a to-do item.
pub type ToDoId = u64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
