//! The public store API.
//!
//! [`CollectionStore`] exposes `store` / `get` / `update` / `delete` /
//! `query` over typed collections. Mutating calls resolve the record's
//! identifier, enqueue the mutation, and drain the queue before returning;
//! reads load the collection directly and bypass the queue.

use std::fs;
use std::io;
use std::sync::Arc;

use crate::config::{StoreConfig, COLLECTION_EXTENSION};
use crate::document::{extract_id, to_record_value, Document};
use crate::error::{StoreError, StoreResult};
use crate::storage::{CollectionFile, WriteQueue};

/// Embedded JSON document store, one collection file per record type.
///
/// Cloning produces another handle to the same store; handles share the
/// write queue, so mutations through any handle serialize with each other.
/// Within a process, load-modify-save cycles therefore never interleave.
/// Across processes sharing a storage root there is no such guarantee:
/// transiently locked files are retried up to the configured bound, but two
/// processes can still both load, both mutate, and the later save wins.
///
/// Records participate by implementing [`Document`] and exposing a
/// non-empty string in the configured identifier field. Mutating calls on
/// records without a usable identifier are silent no-ops. Within a
/// collection, identifier values are unique: `store` refuses to insert a
/// duplicate id (also silently).
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<Inner>,
}

struct Inner {
    config: StoreConfig,
    queue: WriteQueue,
}

impl CollectionStore {
    /// Create a store handle over the given configuration.
    ///
    /// No I/O happens here; directories and collection files materialize on
    /// first access.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                queue: WriteQueue::new(),
            }),
        }
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Insert a record into its collection.
    ///
    /// A record whose identifier is already present is discarded: no
    /// overwrite, no error.
    pub fn store<T: Document>(&self, item: &T) -> StoreResult<()> {
        let Some((record, id)) = self.identified(item, "store")? else {
            return Ok(());
        };
        let file = self.file::<T>();
        let id_field = self.inner.config.id_field().to_owned();
        self.inner.queue.enqueue(Box::new(move || {
            let mut records = file.load()?;
            if records
                .iter()
                .any(|r| extract_id(r, &id_field) == Some(id.as_str()))
            {
                tracing::debug!("Id {:?} already present in {}, skipping store", id, T::NAME);
                return Ok(());
            }
            records.push(record);
            file.save(&records)
        }));
        self.inner.queue.drain()
    }

    /// Fetch the single record with the given identifier, if present.
    ///
    /// Reads the collection directly; operations enqueued by other threads
    /// and not yet drained are not visible. More than one match is reported
    /// as [`StoreError::AmbiguousId`] rather than resolved arbitrarily.
    pub fn get<T: Document>(&self, id: &str) -> StoreResult<Option<T>> {
        let file = self.file::<T>();
        let records = file.load()?;
        let id_field = self.inner.config.id_field();
        let mut matches = records.iter().filter(|r| extract_id(r, id_field) == Some(id));
        let Some(found) = matches.next() else {
            return Ok(None);
        };
        let extra = matches.count();
        if extra > 0 {
            return Err(StoreError::AmbiguousId {
                collection: T::NAME.to_owned(),
                id: id.to_owned(),
                count: extra + 1,
            });
        }
        let item = serde_json::from_value(found.clone())
            .map_err(|e| StoreError::decode(file.path(), e.to_string()))?;
        Ok(Some(item))
    }

    /// Replace the record with the same identifier, preserving its position
    /// among other records. Absent target → silent no-op.
    pub fn update<T: Document>(&self, item: &T) -> StoreResult<()> {
        let Some((record, id)) = self.identified(item, "update")? else {
            return Ok(());
        };
        let file = self.file::<T>();
        let id_field = self.inner.config.id_field().to_owned();
        self.inner.queue.enqueue(Box::new(move || {
            let mut records = file.load()?;
            let Some(index) = records
                .iter()
                .position(|r| extract_id(r, &id_field) == Some(id.as_str()))
            else {
                tracing::debug!("Id {:?} not found in {}, skipping update", id, T::NAME);
                return Ok(());
            };
            records[index] = record;
            file.save(&records)
        }));
        self.inner.queue.drain()
    }

    /// Remove the record with the same identifier, and nothing else.
    /// Absent target → silent no-op.
    pub fn delete<T: Document>(&self, item: &T) -> StoreResult<()> {
        let Some((_, id)) = self.identified(item, "delete")? else {
            return Ok(());
        };
        let file = self.file::<T>();
        let id_field = self.inner.config.id_field().to_owned();
        self.inner.queue.enqueue(Box::new(move || {
            let mut records = file.load()?;
            let Some(index) = records
                .iter()
                .position(|r| extract_id(r, &id_field) == Some(id.as_str()))
            else {
                tracing::debug!("Id {:?} not found in {}, skipping delete", id, T::NAME);
                return Ok(());
            };
            records.remove(index);
            file.save(&records)
        }));
        self.inner.queue.drain()
    }

    /// The full collection as a decoded snapshot, in stored order.
    pub fn query<T: Document>(&self) -> StoreResult<Vec<T>> {
        let file = self.file::<T>();
        let records = file.load()?;
        records
            .into_iter()
            .map(|r| {
                serde_json::from_value(r).map_err(|e| StoreError::decode(file.path(), e.to_string()))
            })
            .collect()
    }

    /// Names of all collections currently present in the database directory.
    ///
    /// An absent database directory is an empty store, not an error.
    pub fn collections(&self) -> StoreResult<Vec<String>> {
        let dir = self.inner.config.database_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some(COLLECTION_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn file<T: Document>(&self) -> CollectionFile {
        CollectionFile::new(&self.inner.config, T::NAME)
    }

    /// Encode a record and extract its identifier for a mutating call.
    ///
    /// `None` means the record has no usable identifier and the call is a
    /// silent no-op.
    fn identified<T: Document>(
        &self,
        item: &T,
        operation: &str,
    ) -> StoreResult<Option<(serde_json::Value, String)>> {
        let record = to_record_value(item)?;
        match extract_id(&record, self.inner.config.id_field()) {
            Some(id) => {
                let id = id.to_owned();
                Ok(Some((record, id)))
            }
            None => {
                tracing::debug!(
                    "Record in {} has no usable {:?} field, skipping {}",
                    T::NAME,
                    self.inner.config.id_field(),
                    operation
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "Id")]
        id: String,
        text: String,
    }

    impl Document for Note {
        const NAME: &'static str = "Note";
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_owned(),
            text: text.to_owned(),
        }
    }

    fn test_store(dir: &TempDir) -> CollectionStore {
        CollectionStore::new(StoreConfig::new(dir.path(), "testdb"))
    }

    // ── Store / get ────────────────────────────────────────────────────

    #[test]
    fn test_store_then_get() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.store(&note("a", "hello")).unwrap();
        let fetched = store.get::<Note>("a").unwrap();
        assert_eq!(fetched, Some(note("a", "hello")));
    }

    #[test]
    fn test_get_absent_is_none() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        assert_eq!(store.get::<Note>("missing").unwrap(), None);
    }

    #[test]
    fn test_duplicate_store_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.store(&note("a", "original")).unwrap();
        store.store(&note("a", "imposter")).unwrap();
        let all = store.query::<Note>().unwrap();
        assert_eq!(all, vec![note("a", "original")]);
    }

    #[test]
    fn test_store_without_id_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.store(&note("", "no id")).unwrap();
        assert!(store.query::<Note>().unwrap().is_empty());
    }

    // ── Update ─────────────────────────────────────────────────────────

    #[test]
    fn test_update_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.store(&note("a", "1")).unwrap();
        store.store(&note("b", "2")).unwrap();
        store.store(&note("c", "3")).unwrap();
        store.update(&note("b", "two")).unwrap();
        let all = store.query::<Note>().unwrap();
        assert_eq!(all, vec![note("a", "1"), note("b", "two"), note("c", "3")]);
    }

    #[test]
    fn test_update_absent_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.store(&note("a", "1")).unwrap();
        store.update(&note("z", "ghost")).unwrap();
        assert_eq!(store.query::<Note>().unwrap(), vec![note("a", "1")]);
    }

    // ── Delete ─────────────────────────────────────────────────────────

    #[test]
    fn test_delete_removes_exactly_one() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.store(&note("a", "1")).unwrap();
        store.store(&note("b", "2")).unwrap();
        store.delete(&note("a", "1")).unwrap();
        assert_eq!(store.query::<Note>().unwrap(), vec![note("b", "2")]);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.store(&note("a", "1")).unwrap();
        store.delete(&note("z", "ghost")).unwrap();
        assert_eq!(store.query::<Note>().unwrap().len(), 1);
    }

    // ── Ambiguity ──────────────────────────────────────────────────────

    #[test]
    fn test_get_with_duplicate_ids_is_ambiguous() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let path = dir.path().join("testdb").join("Note.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            json!([
                {"Id": "a", "text": "1"},
                {"Id": "a", "text": "2"},
                {"Id": "b", "text": "3"}
            ])
            .to_string(),
        )
        .unwrap();

        match store.get::<Note>("a") {
            Err(StoreError::AmbiguousId { id, count, .. }) => {
                assert_eq!(id, "a");
                assert_eq!(count, 2);
            }
            other => panic!("expected AmbiguousId, got {:?}", other),
        }
        // The unique id is still retrievable.
        assert_eq!(store.get::<Note>("b").unwrap(), Some(note("b", "3")));
    }
}
