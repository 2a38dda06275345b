//! Entity model: queues, jobs, tasks, and nodes.
//!
//! These types are owned by a [`crate::session::Session`] implementation;
//! the reclaim action only ever borrows them. Identities are opaque
//! newtype handles so the collector and driver never need to compare or
//! hash full entity structs.

use std::collections::HashMap;

/// Opaque identity for a [`Queue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(String);

/// Opaque identity for a [`Job`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

/// Opaque identity for a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

/// Opaque identity for a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

macro_rules! id_type {
    ($name:ident) => {
        impl $name {
            /// Creates a new identity from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identity as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }
    };
}

id_type!(QueueId);
id_type!(JobId);
id_type!(TaskId);
id_type!(NodeId);

/// A quota-bearing grouping of jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    /// Unique identity.
    pub id: QueueId,
    /// Human-readable name.
    pub name: String,
}

impl Queue {
    /// Creates a new queue.
    #[must_use]
    pub fn new(id: impl Into<QueueId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Status of a [`Job`] as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    /// The job has not yet had any tasks scheduled.
    #[default]
    Pending,
    /// The job has at least one running task.
    Running,
    /// The job has completed.
    Completed,
}

/// A job: a group of tasks belonging to one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Unique identity.
    pub id: JobId,
    /// Identity of the owning queue.
    pub queue_id: QueueId,
    /// Overall job status.
    pub status: JobStatus,
    /// Tasks grouped by status.
    pub tasks_by_status: HashMap<TaskStatus, Vec<TaskId>>,
}

impl Job {
    /// Creates a new, empty job.
    #[must_use]
    pub fn new(id: impl Into<JobId>, queue_id: impl Into<QueueId>) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            status: JobStatus::Pending,
            tasks_by_status: HashMap::new(),
        }
    }

    /// Returns true if the job itself is pending (no tasks running yet).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.status, JobStatus::Pending)
    }

    /// Returns the task ids currently in `status`.
    #[must_use]
    pub fn tasks_in(&self, status: TaskStatus) -> &[TaskId] {
        self.tasks_by_status
            .get(&status)
            .map_or(&[], Vec::as_slice)
    }

    /// Registers a task under its status.
    pub fn add_task(&mut self, status: TaskStatus, task_id: TaskId) {
        self.tasks_by_status.entry(status).or_default().push(task_id);
    }
}

/// Lifecycle status of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Waiting to be bound to a node.
    Pending,
    /// Bound and executing on a node.
    Running,
    /// Tentatively bound, awaiting commit.
    Pipelined,
    /// Being torn down.
    Releasing,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
}

/// Policy controlling whether a task may act as a preemptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreemptionPolicy {
    /// The task may preempt tasks in other queues when starving.
    #[default]
    Normal,
    /// The task may never preempt anything, regardless of starvation.
    Never,
}

impl PreemptionPolicy {
    /// Returns true if this policy allows the task to act as a preemptor.
    #[must_use]
    pub const fn allows_preemption(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// A reference back to the workload spec a task was created from.
///
/// Opaque to the reclaim action beyond namespace/name, which are used only
/// for log messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PodRef {
    /// Namespace the pod spec lives in.
    pub namespace: String,
    /// Name of the pod spec.
    pub name: String,
}

impl std::fmt::Display for PodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A unit of work bound (or pending binding) to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identity.
    pub id: TaskId,
    /// Identity of the owning job.
    pub job_id: JobId,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Resource request at admission time; never mutated after creation.
    pub init_resreq: crate::resource::Resource,
    /// Current resource request (may differ from `init_resreq` after
    /// in-place resizing, which this crate does not perform but must not
    /// assume never happened upstream).
    pub resreq: crate::resource::Resource,
    /// Whether this task may be selected as a reclaim victim.
    pub preemptable: bool,
    /// Whether this task is gated from scheduling consideration.
    pub sched_gated: bool,
    /// Preemption policy governing whether this task may act as a
    /// preemptor.
    pub preemption_policy: PreemptionPolicy,
    /// Reference back to the source pod spec, for logging.
    pub pod_ref: PodRef,
}

impl Task {
    /// Creates a new pending task with the given resource request.
    #[must_use]
    pub fn new(
        id: impl Into<TaskId>,
        job_id: impl Into<JobId>,
        resreq: crate::resource::Resource,
    ) -> Self {
        let job_id = job_id.into();
        Self {
            id: id.into(),
            job_id,
            status: TaskStatus::Pending,
            init_resreq: resreq.clone(),
            resreq,
            preemptable: false,
            sched_gated: false,
            preemption_policy: PreemptionPolicy::Normal,
            pod_ref: PodRef::default(),
        }
    }

    /// Builder: marks the task as preemptable.
    #[must_use]
    pub fn preemptable(mut self, preemptable: bool) -> Self {
        self.preemptable = preemptable;
        self
    }

    /// Builder: sets the scheduling-gated flag.
    #[must_use]
    pub fn sched_gated(mut self, gated: bool) -> Self {
        self.sched_gated = gated;
        self
    }

    /// Builder: sets the preemption policy.
    #[must_use]
    pub fn preemption_policy(mut self, policy: PreemptionPolicy) -> Self {
        self.preemption_policy = policy;
        self
    }

    /// Builder: sets the lifecycle status.
    #[must_use]
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns true if this task is eligible to be a preemptor: pending
    /// and not scheduling-gated (spec §3 invariant 2).
    #[must_use]
    pub fn is_preemptor_candidate(&self) -> bool {
        matches!(self.status, TaskStatus::Pending) && !self.sched_gated
    }
}

/// A cluster node and the tasks currently bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identity.
    pub id: NodeId,
    /// Human-readable name, used in `Pipeline` calls.
    pub name: String,
    /// Tasks currently bound to this node.
    pub tasks: Vec<TaskId>,
}

impl Node {
    /// Creates a new, empty node.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Binds a task to this node.
    pub fn bind(&mut self, task_id: TaskId) {
        self.tasks.push(task_id);
    }
}

/// Admission verdict for a job, as returned by
/// [`crate::session::Session::job_valid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    /// Whether the job passed validation.
    pub pass: bool,
    /// Short machine-oriented reason code.
    pub reason: String,
    /// Human-readable message.
    pub message: String,
}

impl ValidationVerdict {
    /// Creates a failing verdict with the given reason and message.
    #[must_use]
    pub fn fail(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pass: false,
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// Creates a passing verdict.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            pass: true,
            reason: String::new(),
            message: String::new(),
        }
    }
}
