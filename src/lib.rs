//! # docsdb
//!
//! Embeddable JSON document store. Each record type is persisted as a single
//! JSON array file under `<root>/<database>/<Name>.json`, and records are
//! addressed by a configurable identifier field.
//!
//! The store holds no in-memory cache: the file is the sole source of truth
//! and is fully materialized on every access. Mutations are funneled through
//! a per-store FIFO queue drained on the calling thread, so writes through
//! the same store never interleave within a process. Across processes the
//! only shield is a bounded retry on transient file errors; concurrent
//! load-modify-save cycles can still race, and the later save wins.

/// Defaults and per-instance store configuration.
pub mod config;
/// The [`Document`](document::Document) capability trait and identifier extraction.
pub mod document;
/// Error taxonomy for store operations.
pub mod error;
/// Storage layer: collection files on disk and the write queue.
pub mod storage;
/// The public [`CollectionStore`](store::CollectionStore) API.
pub mod store;

pub use config::{RetryPolicy, StoreConfig};
pub use document::Document;
pub use error::{StoreError, StoreResult};
pub use store::CollectionStore;
