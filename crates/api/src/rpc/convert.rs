//! Translation between wire messages and the domain model.
//!
//! Timestamps convert exactly, down to the nanosecond. A domain timestamp
//! that does not fit the portable range is an `Internal` failure naming the
//! field; a malformed wire timestamp on input is `InvalidArgument`.

use chrono::{DateTime, Utc};
use prototodo_core::todo::{NewToDo, ToDoItem, ToDoPatch};
use prototodo_core::types::{Timestamp, ToDoId};

use crate::error::Status;
use crate::rpc::messages::{self, ToDo};

/// `0001-01-01T00:00:00Z` in Unix seconds.
const MIN_SECONDS: i64 = -62_135_596_800;

/// `9999-12-31T23:59:59Z` in Unix seconds.
const MAX_SECONDS: i64 = 253_402_300_799;

const NANOS_PER_SECOND: i32 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamp ({seconds}, {nanos}) before 0001-01-01")]
    TooEarly { seconds: i64, nanos: i32 },

    #[error("timestamp ({seconds}, {nanos}) after 9999-12-31")]
    TooLate { seconds: i64, nanos: i32 },

    #[error("timestamp ({seconds}, {nanos}): nanos not in range [0, 1e9)")]
    InvalidNanos { seconds: i64, nanos: i32 },
}

/// Check that a wire timestamp lies in the portable range.
pub fn validate_timestamp(ts: &messages::Timestamp) -> Result<(), TimestampError> {
    let messages::Timestamp { seconds, nanos } = *ts;
    if seconds < MIN_SECONDS {
        return Err(TimestampError::TooEarly { seconds, nanos });
    }
    if seconds > MAX_SECONDS {
        return Err(TimestampError::TooLate { seconds, nanos });
    }
    if !(0..NANOS_PER_SECOND).contains(&nanos) {
        return Err(TimestampError::InvalidNanos { seconds, nanos });
    }
    Ok(())
}

pub fn timestamp_to_wire(t: &Timestamp) -> Result<messages::Timestamp, TimestampError> {
    let seconds = t.timestamp();
    let subsec = t.timestamp_subsec_nanos();
    // chrono encodes leap seconds as nanos >= 1e9; i32 holds up to 2e9.
    let nanos = i32::try_from(subsec).unwrap_or(i32::MAX);

    let ts = messages::Timestamp { seconds, nanos };
    validate_timestamp(&ts)?;
    Ok(ts)
}

pub fn timestamp_from_wire(ts: &messages::Timestamp) -> Result<Timestamp, TimestampError> {
    validate_timestamp(ts)?;
    // Validation guarantees 0 <= nanos < 1e9 and an in-range second.
    DateTime::<Utc>::from_timestamp(ts.seconds, ts.nanos as u32).ok_or(TimestampError::TooLate {
        seconds: ts.seconds,
        nanos: ts.nanos,
    })
}

fn encode_field(field: &str, t: &Timestamp) -> Result<messages::Timestamp, Status> {
    timestamp_to_wire(t).map_err(|e| {
        Status::internal(format!(
            "failed to convert {field} to a portable timestamp, resulting timestamp is invalid: {e}"
        ))
    })
}

/// Domain id to wire id. Ids beyond `i64::MAX` cannot be represented.
pub fn id_to_wire(id: ToDoId) -> Result<i64, Status> {
    i64::try_from(id).map_err(|_| Status::internal(format!("todo id {id} does not fit the wire id")))
}

/// Wire id to domain id. Negative ids cannot name a stored item.
pub fn id_from_wire(id: i64) -> Option<ToDoId> {
    ToDoId::try_from(id).ok()
}

/// Encode a stored item, including its store-assigned id and timestamps.
pub fn encode_todo(item: &ToDoItem) -> Result<ToDo, Status> {
    let deleted_at = item
        .deleted_at
        .as_ref()
        .map(|t| encode_field("deleted_at", t))
        .transpose()?;

    Ok(ToDo {
        id: id_to_wire(item.id)?,
        title: item.title.clone(),
        description: item.description.clone(),
        reminder: Some(encode_field("reminder", &item.reminder)?),
        created_at: Some(encode_field("created_at", &item.created_at)?),
        updated_at: Some(encode_field("updated_at", &item.updated_at)?),
        deleted_at,
    })
}

/// Caller-supplied fields of a wire item. Id and store-assigned timestamps
/// are never read from input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFields {
    pub title: String,
    pub description: String,
    pub reminder: Option<Timestamp>,
}

pub fn decode_fields(todo: &ToDo) -> Result<DecodedFields, Status> {
    let reminder = todo
        .reminder
        .as_ref()
        .map(timestamp_from_wire)
        .transpose()
        .map_err(|e| Status::invalid_argument(format!("Request field todo.reminder is invalid: {e}")))?;

    Ok(DecodedFields {
        title: todo.title.clone(),
        description: todo.description.clone(),
        reminder,
    })
}

impl DecodedFields {
    /// Create input; the reminder is mandatory on a new item.
    pub fn into_new(self) -> Result<NewToDo, Status> {
        let reminder = self
            .reminder
            .ok_or_else(|| Status::invalid_argument("Request field todo.reminder is required"))?;

        Ok(NewToDo {
            title: self.title,
            description: self.description,
            reminder,
        })
    }

    /// Update input; empty text and an absent reminder mean "keep".
    pub fn into_patch(self) -> ToDoPatch {
        ToDoPatch {
            title: Some(self.title).filter(|s| !s.is_empty()),
            description: Some(self.description).filter(|s| !s.is_empty()),
            reminder: self.reminder,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::error::Code;

    fn item() -> ToDoItem {
        let t0 = Utc.with_ymd_and_hms(2024, 2, 29, 7, 15, 0).unwrap() + Duration::nanoseconds(123);
        ToDoItem {
            id: 1,
            title: "Buy milk".into(),
            description: "2 litres".into(),
            reminder: t0,
            created_at: t0,
            updated_at: t0,
            deleted_at: None,
        }
    }

    #[test]
    fn encode_then_decode_preserves_fields() {
        let original = item();
        let wire = encode_todo(&original).unwrap();
        let decoded = decode_fields(&wire).unwrap();

        assert_eq!(decoded.title, original.title);
        assert_eq!(decoded.description, original.description);
        assert_eq!(decoded.reminder, Some(original.reminder));
    }

    #[test]
    fn encode_sets_store_fields_and_omits_deleted_at() {
        let wire = encode_todo(&item()).unwrap();

        assert_eq!(wire.id, 1);
        assert!(wire.created_at.is_some());
        assert!(wire.updated_at.is_some());
        assert!(wire.deleted_at.is_none());

        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("deleted_at").is_none());
    }

    #[test]
    fn encode_keeps_deleted_at_when_set() {
        let mut todo = item();
        todo.deleted_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let wire = encode_todo(&todo).unwrap();
        assert_eq!(
            wire.deleted_at,
            Some(messages::Timestamp {
                seconds: 1_709_251_200,
                nanos: 0
            })
        );
    }

    #[test]
    fn unrepresentable_reminder_is_internal_and_named() {
        let mut todo = item();
        todo.reminder = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();

        let status = encode_todo(&todo).unwrap_err();
        assert_eq!(status.code, Code::Internal);
        assert!(status.message.contains("reminder"), "{}", status.message);
    }

    #[test]
    fn unrepresentable_updated_at_is_named() {
        let mut todo = item();
        todo.updated_at = Utc.with_ymd_and_hms(10_001, 6, 1, 0, 0, 0).unwrap();

        let status = encode_todo(&todo).unwrap_err();
        assert!(status.message.contains("updated_at"), "{}", status.message);
    }

    #[test]
    fn oversized_id_is_internal() {
        let mut todo = item();
        todo.id = u64::MAX;
        assert_eq!(encode_todo(&todo).unwrap_err().code, Code::Internal);
    }

    #[test]
    fn wire_range_limits() {
        let first = messages::Timestamp {
            seconds: MIN_SECONDS,
            nanos: 0,
        };
        let last = messages::Timestamp {
            seconds: MAX_SECONDS,
            nanos: 999_999_999,
        };
        assert!(validate_timestamp(&first).is_ok());
        assert!(validate_timestamp(&last).is_ok());

        assert!(matches!(
            validate_timestamp(&messages::Timestamp {
                seconds: MIN_SECONDS - 1,
                nanos: 0
            }),
            Err(TimestampError::TooEarly { .. })
        ));
        assert!(matches!(
            validate_timestamp(&messages::Timestamp {
                seconds: MAX_SECONDS + 1,
                nanos: 0
            }),
            Err(TimestampError::TooLate { .. })
        ));
        assert!(matches!(
            validate_timestamp(&messages::Timestamp {
                seconds: 0,
                nanos: -1
            }),
            Err(TimestampError::InvalidNanos { .. })
        ));
    }

    #[test]
    fn timestamp_from_wire_is_exact() {
        let ts = messages::Timestamp {
            seconds: 1_700_000_000,
            nanos: 42,
        };
        let t = timestamp_from_wire(&ts).unwrap();
        assert_eq!(t.timestamp(), 1_700_000_000);
        assert_eq!(t.timestamp_subsec_nanos(), 42);
        assert_eq!(timestamp_to_wire(&t).unwrap(), ts);
    }

    #[test]
    fn malformed_reminder_is_invalid_argument() {
        let wire = ToDo {
            reminder: Some(messages::Timestamp {
                seconds: 0,
                nanos: NANOS_PER_SECOND,
            }),
            ..Default::default()
        };

        let status = decode_fields(&wire).unwrap_err();
        assert_eq!(status.code, Code::InvalidArgument);
        assert!(status.message.contains("todo.reminder"));
    }

    #[test]
    fn decode_ignores_id_and_store_timestamps() {
        let wire = ToDo {
            id: 99,
            title: "t".into(),
            created_at: Some(messages::Timestamp {
                seconds: i64::MAX,
                nanos: 0,
            }),
            ..Default::default()
        };

        let decoded = decode_fields(&wire).unwrap();
        assert_eq!(decoded.title, "t");
        assert_eq!(decoded.reminder, None);
    }

    #[test]
    fn create_requires_reminder() {
        let fields = DecodedFields {
            title: "t".into(),
            description: String::new(),
            reminder: None,
        };
        assert_eq!(fields.into_new().unwrap_err().code, Code::InvalidArgument);
    }

    #[test]
    fn patch_treats_empty_text_as_absent() {
        let patch = DecodedFields {
            title: "Buy oat milk".into(),
            description: String::new(),
            reminder: None,
        }
        .into_patch();

        assert_eq!(patch.title.as_deref(), Some("Buy oat milk"));
        assert_eq!(patch.description, None);
        assert_eq!(patch.reminder, None);
    }

    #[test]
    fn negative_wire_id_has_no_domain_id() {
        assert_eq!(id_from_wire(-1), None);
        assert_eq!(id_from_wire(5), Some(5));
    }
}
