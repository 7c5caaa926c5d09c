//! Error types for the coalescence analysis.

use pedigree_queue::QueueError;
use pedigree_types::PersonId;

/// Errors that can occur while walking ancestral lines.
#[derive(Debug, thiserror::Error)]
pub enum CoalescenceError {
    /// A lineage parent could not be resolved to a snapshot.
    #[error("ancestor {id} is referenced as a parent but unknown to the source")]
    MissingAncestor {
        /// The unresolved parent id.
        id: PersonId,
    },

    /// The ancestor heap failed.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}
