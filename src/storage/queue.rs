//! Write serialization.
//!
//! Mutating operations are captured as closures, appended to a FIFO queue,
//! and executed by draining the queue on the calling thread; there is no
//! background worker. The pending queue accepts producers from any thread;
//! at most one thread drains at a time, so load-modify-save cycles against
//! the same store never overlap within a process.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::error::StoreResult;

/// A queued mutation. Runs exactly once; `Ok(())` covers both applied
/// mutations and internally absorbed no-ops.
pub type WriteOp = Box<dyn FnOnce() -> StoreResult<()> + Send>;

/// FIFO queue of pending write operations with a single-drainer gate.
#[derive(Default)]
pub struct WriteQueue {
    pending: Mutex<VecDeque<WriteOp>>,
    drainer: Mutex<()>,
}

impl WriteQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation to the queue.
    pub fn enqueue(&self, op: WriteOp) {
        self.pending.lock().push_back(op);
    }

    /// Number of operations currently queued.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Pop and run queued operations until none remain.
    ///
    /// Only one thread drains at a time; a second caller blocks on the gate
    /// and then drains whatever is left (often nothing, since its own
    /// operation may already have run on the first drainer's thread). The
    /// first fatal error stops the drain and propagates to the draining
    /// caller; operations still queued stay queued for the next drain.
    pub fn drain(&self) -> StoreResult<()> {
        let _gate = self.drainer.lock();
        loop {
            let op = self.pending.lock().pop_front();
            match op {
                Some(op) => op()?,
                None => return Ok(()),
            }
        }
    }
}
