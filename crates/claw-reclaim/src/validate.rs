//! Structural validation of a victim set before eviction is attempted.
//!
//! `Session::reclaimable` is responsible for cross-queue fairness; this
//! function instead enforces the structural invariants that must hold no
//! matter what policy returned — a victim set that fails these checks
//! indicates a session implementation bug, not a policy decision.

use crate::error::SessionError;
use crate::model::{Node, Task, TaskStatus};

/// Validates that `victims` are a legal victim set for evicting on behalf
/// of `task` at `node`.
///
/// # Errors
/// Returns [`SessionError::InvalidVictimSet`] on the first structural
/// violation found: an empty set, a victim bound to a different node, a
/// victim that is not running and preemptable, or a victim that is the
/// preemptor task itself.
pub fn validate_victims(task: &Task, node: &Node, victims: &[Task]) -> Result<(), SessionError> {
    if victims.is_empty() {
        return Err(SessionError::InvalidVictimSet {
            task_id: task.id.to_string(),
            node_id: node.id.to_string(),
            reason: "victim set is empty".into(),
        });
    }

    for victim in victims {
        if victim.id == task.id {
            return Err(SessionError::InvalidVictimSet {
                task_id: task.id.to_string(),
                node_id: node.id.to_string(),
                reason: "preemptor cannot be its own victim".into(),
            });
        }
        if !node.tasks.contains(&victim.id) {
            return Err(SessionError::InvalidVictimSet {
                task_id: task.id.to_string(),
                node_id: node.id.to_string(),
                reason: format!("victim {} is not bound to this node", victim.id),
            });
        }
        if victim.status != TaskStatus::Running {
            return Err(SessionError::InvalidVictimSet {
                task_id: task.id.to_string(),
                node_id: node.id.to_string(),
                reason: format!("victim {} is not running", victim.id),
            });
        }
        if !victim.preemptable {
            return Err(SessionError::InvalidVictimSet {
                task_id: task.id.to_string(),
                node_id: node.id.to_string(),
                reason: format!("victim {} is not preemptable", victim.id),
            });
        }
    }

    Ok(())
}
