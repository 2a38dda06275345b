//! Victim Selector: given a chosen preemptor task, finds a feasible node
//! and evicts a minimal set of victims to make room for it.

use crate::model::{Node, Task, TaskStatus};
use crate::resource::Resource;
use crate::session::Session;
use crate::validate::validate_victims;

/// Attempts to place `task` by reclaiming resources from some candidate
/// node. Produces only side effects on `session` (`evict`, `pipeline`);
/// returns nothing, matching the original action's "no return value"
/// contract.
///
/// Iterates candidate nodes in the order the session returns them. For
/// each node: runs the preempt predicate, collects reclaimees, asks
/// policy to approve a victim set, validates it structurally, then evicts
/// victims lowest-priority-first until the preemptor's initial resource
/// request is satisfied (dimension-wise, zero-tolerance masked), at which
/// point it pipelines the task and stops. A node that cannot fully
/// satisfy the request after evicting every approved victim is abandoned
/// in favor of the next candidate.
pub fn select_victims<S: Session>(session: &S, task: &Task) {
    for node in session.candidate_nodes_for_task(task) {
        if let Err(err) = session.predicate_for_preempt(task, &node) {
            tracing::debug!(
                task_id = %task.id,
                node_id = %node.id,
                error = %err,
                "preempt predicate failed, trying next node"
            );
            continue;
        }

        let reclaimees = find_reclaimable_tasks(session, task, &node);
        if reclaimees.is_empty() {
            continue;
        }

        let victims = session.reclaimable(task, reclaimees);
        if victims.is_empty() {
            tracing::debug!(
                task_id = %task.id,
                node_id = %node.id,
                "fairness veto: reclaimable() approved no victims"
            );
            continue;
        }

        if let Err(err) = validate_victims(task, &node, &victims) {
            tracing::debug!(task_id = %task.id, node_id = %node.id, error = %err, "victim set invalid, skipping node");
            continue;
        }

        if evict_until_satisfied(session, task, &node, victims) {
            return;
        }
    }
}

/// Collects every reclaimee bound to `node`: running, preemptable, and
/// belonging to a job whose queue differs from `task`'s own queue *and*
/// is itself reclaimable. This is a core filter, not a policy callback —
/// `Session::reclaimable` only gets to narrow what this function already
/// found, never to discover tasks on its own.
///
/// Each returned `Task` is a fresh clone from `session.task`, so
/// subsequent policy code (`Session::reclaimable`,
/// `Session::order_victims`) cannot mutate live session state through it.
fn find_reclaimable_tasks<S: Session>(session: &S, task: &Task, node: &Node) -> Vec<Task> {
    let Some(preemptor_job) = session.job(&task.job_id) else {
        tracing::error!(task_id = %task.id, job_id = %task.job_id, "preemptor's job not found, cannot determine its queue");
        return Vec::new();
    };

    node.tasks
        .iter()
        .filter_map(|task_id| session.task(task_id))
        .filter(|candidate| candidate.status == TaskStatus::Running && candidate.preemptable)
        .filter(|candidate| {
            let Some(candidate_job) = session.job(&candidate.job_id) else {
                tracing::error!(task_id = %candidate.id, job_id = %candidate.job_id, "candidate victim's job not found, skipping");
                return false;
            };
            candidate_job.queue_id != preemptor_job.queue_id
                && session.queue_reclaimable(&candidate_job.queue_id)
        })
        .collect()
}

/// Pops victims from the session-ordered victim queue, evicting each, and
/// stops as soon as the accumulator satisfies `task.init_resreq`. Returns
/// true if the task was pipelined onto `node`.
fn evict_until_satisfied<S: Session>(
    session: &S,
    task: &Task,
    node: &Node,
    victims: Vec<Task>,
) -> bool {
    let ordered = session.order_victims(task, victims);
    let mut reclaimed = Resource::empty();

    for victim in ordered {
        match session.evict(&victim, "reclaim") {
            Ok(()) => {
                reclaimed = reclaimed.add(&victim.resreq);
            }
            Err(err) => {
                tracing::warn!(
                    task_id = %task.id,
                    victim_id = %victim.id,
                    error = %err,
                    "eviction failed, continuing to next victim"
                );
                continue;
            }
        }

        if task.init_resreq.less_equal_zero(&reclaimed) {
            return match session.pipeline(task, &node.name) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        task_id = %task.id,
                        node_id = %node.id,
                        error = %err,
                        "pipeline failed after sufficient eviction; task will be reconsidered next session"
                    );
                    false
                }
            };
        }
    }

    false
}
