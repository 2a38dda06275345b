//! Candidate Collector: scans every job in the session and builds the
//! queue/job/task structures the driver pops from.

use std::collections::HashMap;

use crate::model::{Job, JobId, Queue, QueueId, TaskStatus};
use crate::ordered_set::OrderedSet;
use crate::session::Session;

/// Output of a single collection pass, borrowing its comparators from the
/// session that produced it.
pub struct CollectedCandidates<'a> {
    /// Starving queues, highest priority poppable first.
    pub queues: OrderedSet<'a, Queue>,
    /// Dedup set of every queue registered during this pass.
    pub queue_map: HashMap<QueueId, Queue>,
    /// For each queue with at least one starving job, its starving jobs.
    pub preemptors_by_queue: HashMap<QueueId, OrderedSet<'a, crate::model::Job>>,
    /// For each starving job, its pending, non-gated candidate tasks.
    pub preemptor_tasks_by_job: HashMap<JobId, OrderedSet<'a, crate::model::Task>>,
}

/// Walks every job the session knows about and builds the preemptor
/// structures the Reclaim Driver drains.
///
/// No error is surfaced: a job failing validity or a missing queue is
/// logged and skipped, per the collector's contract.
pub fn collect<'a, S: Session>(session: &'a S) -> CollectedCandidates<'a> {
    let mut queues = OrderedSet::new(|a: &Queue, b: &Queue| session.queue_order(a, b));
    let mut queue_map: HashMap<QueueId, Queue> = HashMap::new();
    let mut preemptors_by_queue: HashMap<QueueId, OrderedSet<'a, Job>> = HashMap::new();
    let mut preemptor_tasks_by_job: HashMap<JobId, OrderedSet<'a, crate::model::Task>> =
        HashMap::new();

    for job in session.jobs() {
        if job.is_pending() {
            continue;
        }

        if let Some(verdict) = session.job_valid(&job) {
            if !verdict.pass {
                tracing::debug!(
                    job_id = %job.id,
                    reason = %verdict.reason,
                    message = %verdict.message,
                    "job failed validity, skipping"
                );
                continue;
            }
        }

        let Some(queue) = session.queue(&job.queue_id) else {
            tracing::error!(job_id = %job.id, queue_id = %job.queue_id, "queue not found for job, skipping");
            continue;
        };

        if !queue_map.contains_key(&queue.id) {
            queue_map.insert(queue.id.clone(), queue.clone());
            queues.push(queue.clone());
        }

        if !session.job_starving(&job) {
            continue;
        }

        let mut job_tasks =
            OrderedSet::new(|a: &crate::model::Task, b: &crate::model::Task| session.task_order(a, b));
        for task_id in job.tasks_in(TaskStatus::Pending) {
            let Some(task) = session.task(task_id) else {
                continue;
            };
            if task.is_preemptor_candidate() {
                job_tasks.push(task);
            }
        }

        if job_tasks.is_empty() {
            continue;
        }

        preemptor_tasks_by_job.insert(job.id.clone(), job_tasks);
        preemptors_by_queue
            .entry(queue.id.clone())
            .or_insert_with(|| OrderedSet::new(|a: &Job, b: &Job| session.job_order(a, b)))
            .push(job.clone());
    }

    CollectedCandidates {
        queues,
        queue_map,
        preemptors_by_queue,
        preemptor_tasks_by_job,
    }
}
