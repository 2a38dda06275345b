//! Reclaim Driver: the outer control loop that drains queues, jobs, and
//! tasks and orchestrates the Victim Selector until progress stalls.

use crate::collector::collect;
use crate::selector::select_victims;
use crate::session::Session;

/// The reclaim action.
///
/// Stateless between calls to [`ReclaimAction::execute`]; `initialize`
/// and `uninitialize` exist to match the lifecycle contract a scheduler
/// expects of every action it runs (spec §6), even though this action
/// has no per-session setup or teardown of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReclaimAction;

impl ReclaimAction {
    /// Creates a new reclaim action.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The action's registered name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "reclaim"
    }

    /// Lifecycle hook run once before the session's actions execute.
    /// No-op for this action.
    pub fn initialize(&mut self) {}

    /// Lifecycle hook run once after the session's actions execute.
    /// No-op for this action.
    pub fn uninitialize(&mut self) {}

    /// Runs one full reclaim pass against `session`.
    ///
    /// Never fails: every predicate, eviction, and pipeline error is
    /// logged and the affected candidate is skipped (spec §4.5/§7). Only
    /// the side effects recorded on `session` (`evict`, `pipeline`)
    /// constitute this call's observable output.
    pub fn execute<S: Session>(&self, session: &S) {
        let _span = tracing::debug_span!("reclaim").entered();
        tracing::trace!("entering reclaim");

        let mut collected = collect(session);

        while let Some(queue) = collected.queues.pop() {
            if session.overused(&queue) {
                tracing::debug!(queue_id = %queue.id, "queue overused, not entitled to reclaim");
                continue;
            }

            let Some(jobs) = collected.preemptors_by_queue.get_mut(&queue.id) else {
                continue;
            };
            if jobs.is_empty() {
                continue;
            }
            let Some(job) = jobs.pop() else {
                continue;
            };

            let job_still_starving = session.job_starving(&job);
            let Some(tasks) = collected.preemptor_tasks_by_job.get_mut(&job.id) else {
                continue;
            };
            if tasks.is_empty() || !job_still_starving {
                tracing::debug!(job_id = %job.id, "job has no remaining candidate tasks or lost starving status, dropping");
                continue;
            }
            let Some(task) = tasks.pop() else {
                continue;
            };

            if !task.preemption_policy.allows_preemption() {
                tracing::debug!(task_id = %task.id, "task's preemption policy forbids it from preempting, re-enqueuing job and queue");
                jobs.push(job);
                collected.queues.push(queue);
                continue;
            }

            if !session.preemptive(&queue, &task) {
                tracing::debug!(task_id = %task.id, queue_id = %queue.id, "queue-level preemptive guard rejected this task");
                continue;
            }

            if let Err(err) = session.pre_predicate(&task) {
                tracing::debug!(task_id = %task.id, error = %err, "pre-predicate failed");
                continue;
            }

            select_victims(session, &task);

            jobs.push(job);
            collected.queues.push(queue);
        }

        tracing::trace!("leaving reclaim");
    }
}
