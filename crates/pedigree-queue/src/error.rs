//! Error types for the pedigree-queue crate.

/// Errors that can occur when building or draining a
/// [`PriorityQueue`](crate::PriorityQueue).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The requested arity cannot form a heap.
    #[error("heap arity must be at least 2, got {arity}")]
    InvalidArity {
        /// The rejected arity.
        arity: usize,
    },

    /// Attempted to extract the root of an empty queue.
    #[error("cannot extract the root of an empty heap")]
    Empty,
}
