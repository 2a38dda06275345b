//! Error types for the reclaim action's default `Session` currency.

use thiserror::Error;

/// Result type for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors a [`crate::session::Session`] implementation may report back to
/// the reclaim action.
///
/// The action itself never fails (see spec §7): every variant here is
/// logged and the offending candidate is skipped, never propagated out of
/// [`crate::driver::ReclaimAction::execute`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A task failed a cheap pre-predicate feasibility gate.
    #[error("pre-predicate failed for task {task_id}: {reason}")]
    PrePredicateFailed {
        /// Identifier of the task that failed the gate.
        task_id: String,
        /// Description of why the gate failed.
        reason: String,
    },

    /// A task failed the per-node preemption predicate.
    #[error("preempt predicate failed for task {task_id} on node {node_id}: {reason}")]
    PredicateFailed {
        /// Identifier of the task under consideration.
        task_id: String,
        /// Identifier of the node under consideration.
        node_id: String,
        /// Description of why the predicate failed.
        reason: String,
    },

    /// The victim set failed structural validation.
    #[error("victim set invalid for task {task_id} on node {node_id}: {reason}")]
    InvalidVictimSet {
        /// Identifier of the preemptor task.
        task_id: String,
        /// Identifier of the node under consideration.
        node_id: String,
        /// Description of the structural violation.
        reason: String,
    },

    /// An eviction intent could not be recorded.
    #[error("eviction failed for task {victim_id}: {reason}")]
    EvictionFailed {
        /// Identifier of the victim task.
        victim_id: String,
        /// Description of why the eviction failed.
        reason: String,
    },

    /// A pipeline (tentative binding) intent could not be recorded.
    #[error("pipeline failed for task {task_id} on node {node_id}: {reason}")]
    PipelineFailed {
        /// Identifier of the preemptor task.
        task_id: String,
        /// Identifier of the target node.
        node_id: String,
        /// Description of why the pipeline failed.
        reason: String,
    },
}
