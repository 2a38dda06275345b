//! The capability set the reclaim action consumes.
//!
//! A [`Session`] is a bag of read-only tables, ordering comparators, and
//! policy callbacks — never an inheritance hierarchy. This keeps the core
//! testable against a hand-written fake instead of a mock framework (see
//! the `integration_tests` module in `lib.rs`).

use crate::model::{Job, JobId, Node, NodeId, Queue, QueueId, Task, TaskId, ValidationVerdict};

/// Read-only and policy surface the reclaim action needs from the
/// surrounding scheduler.
///
/// Every fallible method returns the implementor's own error type via the
/// `Err` associated type; this crate's own [`crate::error::SessionError`]
/// is what the in-crate fake and doctests use, but a real scheduler may
/// hand back a richer error carrying upstream context.
///
/// Methods take `&self` rather than `&mut self`: the driver interleaves
/// read-only predicate calls with side-effecting ones (`evict`,
/// `pipeline`) while holding borrowed [`crate::ordered_set::OrderedSet`]s
/// derived from this session's tables, so implementors own their interior
/// mutability (an `RwLock`-wrapped table, for instance) rather than
/// requiring exclusive access at every call site.
pub trait Session {
    /// Error type returned by this session's fallible operations.
    type Err: std::fmt::Display;

    /// Total ordering for queues: `less(a, b)` means `a` has lower
    /// priority than `b`. Used to seed the outer queue ordered set.
    fn queue_order(&self, a: &Queue, b: &Queue) -> bool;

    /// Total ordering for jobs within a queue.
    fn job_order(&self, a: &Job, b: &Job) -> bool;

    /// Total ordering for tasks within a job.
    fn task_order(&self, a: &Task, b: &Task) -> bool;

    /// Returns the queue with the given identity, if still registered.
    fn queue(&self, id: &QueueId) -> Option<Queue>;

    /// Iterates every job known to the session, independent of status.
    fn jobs(&self) -> Vec<Job>;

    /// Returns the job with the given identity, if it still exists.
    ///
    /// Used by the Victim Selector to find the owning queue of both the
    /// preemptor task and each reclaim candidate, since a [`Task`] only
    /// carries a [`JobId`], not a queue identity directly.
    fn job(&self, id: &JobId) -> Option<Job>;

    /// Returns the task with the given identity, if it still exists.
    fn task(&self, id: &TaskId) -> Option<Task>;

    /// Returns the node with the given identity, if it still exists.
    fn node(&self, id: &NodeId) -> Option<Node>;

    /// True iff the queue has opted in to having its running tasks
    /// preempted by higher-priority tasks in other queues.
    fn queue_reclaimable(&self, id: &QueueId) -> bool;

    /// Admission check for a job. `None` means the job passes.
    fn job_valid(&self, job: &Job) -> Option<ValidationVerdict>;

    /// True iff the job's minimum demand is unmet.
    fn job_starving(&self, job: &Job) -> bool;

    /// True iff the queue is at or above its deserved share.
    fn overused(&self, queue: &Queue) -> bool;

    /// Queue-level permission for this specific preemption.
    fn preemptive(&self, queue: &Queue, task: &Task) -> bool;

    /// Cheap task-level feasibility gate, run before any node is
    /// considered.
    ///
    /// # Errors
    /// Returns `Err` if the task is not even worth considering for
    /// preemption (the pre-predicate failed).
    fn pre_predicate(&self, task: &Task) -> Result<(), Self::Err>;

    /// Candidate nodes for preempting on behalf of `task`. Despite the
    /// name this library inherited from its scheduler of origin, this
    /// returns nodes that ARE candidates for preemption, in whatever
    /// order the session considers relevant; the core iterates in that
    /// order without re-sorting.
    fn candidate_nodes_for_task(&self, task: &Task) -> Vec<Node>;

    /// Per-node feasibility under preemption semantics.
    ///
    /// # Errors
    /// Returns `Err` if `task` cannot be scheduled on `node` even after
    /// preemption.
    fn predicate_for_preempt(&self, task: &Task, node: &Node) -> Result<(), Self::Err>;

    /// Policy reducer: narrows `reclaimees` to a fairness-approved victim
    /// set for `task`.
    fn reclaimable(&self, task: &Task, reclaimees: Vec<Task>) -> Vec<Task>;

    /// Lowest-priority-first eviction order over an already-approved
    /// victim set.
    fn order_victims(&self, task: &Task, victims: Vec<Task>) -> Vec<Task>;

    /// Records an eviction intent for `victim`, tagged with `reason`.
    ///
    /// # Errors
    /// Returns `Err` if the intent could not be recorded.
    fn evict(&self, victim: &Task, reason: &str) -> Result<(), Self::Err>;

    /// Records a tentative binding of `task` to the node named
    /// `node_name`.
    ///
    /// # Errors
    /// Returns `Err` if the intent could not be recorded.
    fn pipeline(&self, task: &Task, node_name: &str) -> Result<(), Self::Err>;
}
