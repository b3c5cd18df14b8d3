use crate::TxnResult;

/// Notifications published by a [`crate::WatchEngine`] after each poll cycle.
///
/// The engine never turns results or failures into per-key state changes.
/// Subscribers that want a backoff policy can build it on these events.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// One transaction batch failed; sibling batches are unaffected
    BatchFailed {
        batch_index: usize,
        size: usize,
        error: String,
    },

    /// A poll cycle finished dispatching
    CycleCompleted {
        /// Number of keys included in the cycle
        polled: usize,
        /// Merged results of the successful batches, in batch order
        results: Vec<TxnResult>,
        failed_batches: usize,
    },
}
