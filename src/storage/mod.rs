//! Storage layer: collection files on disk and the write queue.
//!
//! Collections live entirely on disk as JSON arrays, one file per record
//! type. [`CollectionFile`] performs whole-file load/save with a bounded
//! retry on transient access failures; mutations are serialized through a
//! [`WriteQueue`] drained on the calling thread.

/// Collection file lifecycle: create-if-absent, whole-file load/save.
pub mod persistence;
/// FIFO write serialization for mutating operations.
pub mod queue;

pub use persistence::CollectionFile;
pub use queue::{WriteOp, WriteQueue};
