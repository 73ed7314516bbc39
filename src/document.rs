//! Document capability and identifier extraction.
//!
//! Record types opt in by implementing [`Document`]: serde round-tripping
//! plus a declared collection name. Identifiers are not part of the trait;
//! they are read off the record's serialized form by field name, so the
//! identifier field stays a runtime setting and a record without a usable
//! identifier is simply skipped by mutating operations.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Capability required of stored record types.
///
/// `NAME` is the collection name and the file stem of the backing file.
pub trait Document: Serialize + DeserializeOwned {
    /// Declared collection name.
    const NAME: &'static str;
}

/// Encode a record to its stored JSON form.
pub(crate) fn to_record_value<T: Document>(item: &T) -> StoreResult<Value> {
    serde_json::to_value(item).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Extract a record's identifier from its stored form.
///
/// Looks up `id_field` on the top-level object, case-sensitive exact match.
/// Only a non-empty JSON string qualifies; a missing field, `null`, an empty
/// string, a non-string value, or a non-object record all yield `None`.
pub(crate) fn extract_id<'a>(record: &'a Value, id_field: &str) -> Option<&'a str> {
    match record.get(id_field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}
