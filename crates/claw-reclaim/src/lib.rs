//! Cross-queue resource reclaim action for a batch workload scheduler.
//!
//! When a queue is starving — its admitted jobs cannot run because
//! cluster capacity is occupied by lower-priority workloads belonging to
//! other queues — this crate evicts a minimal set of running tasks so a
//! pending high-priority task fits on a real node. The action runs once
//! per scheduling session, never fails, and is idempotent across
//! sessions: a task it cannot place is left for the next session to
//! retry.
//!
//! ```text
//!                        ┌────────────────────┐
//!                        │   Reclaim Driver    │  outer queue→job→task loop
//!                        └──────────┬───────────┘
//!                                   │ pop
//!                       ┌───────────▼────────────┐
//!                       │  Candidate Collector    │  builds OrderedSets
//!                       └───────────┬────────────┘
//!                                   │ task, job
//!                       ┌───────────▼────────────┐
//!                       │   Victim Selector       │  node-by-node eviction
//!                       └───────────┬────────────┘
//!                                   │ evict / pipeline
//!                       ┌───────────▼────────────┐
//!                       │        Session          │  capability set (§6)
//!                       └─────────────────────────┘
//! ```
//!
//! The crate never mutates cluster state directly; it records eviction
//! and pipeline *intents* on a [`session::Session`] implementation, which
//! a separate commit phase outside this crate reconciles.
//!
//! ```
//! use claw_reclaim::prelude::*;
//!
//! # fn run<S: Session>(session: &S) {
//! let mut action = ReclaimAction::new();
//! action.initialize();
//! action.execute(session);
//! action.uninitialize();
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod collector;
pub mod driver;
pub mod error;
pub mod model;
pub mod ordered_set;
pub mod resource;
pub mod selector;
pub mod session;
pub mod validate;

/// Common imports for consumers wiring a [`session::Session`] impl
/// through [`driver::ReclaimAction`].
pub mod prelude {
    pub use crate::driver::ReclaimAction;
    pub use crate::error::{Result, SessionError};
    pub use crate::model::{
        Job, JobId, JobStatus, Node, NodeId, PodRef, PreemptionPolicy, Queue, QueueId, Task,
        TaskId, TaskStatus, ValidationVerdict,
    };
    pub use crate::ordered_set::OrderedSet;
    pub use crate::resource::Resource;
    pub use crate::session::Session;
    pub use crate::validate::validate_victims;
}

#[cfg(test)]
mod integration_tests {
    //! End-to-end scenarios against a hand-written fake `Session`, one
    //! test per literal scenario plus the crate's invariants.

    use crate::error::SessionError;
    use crate::model::{
        Job, JobId, JobStatus, Node, NodeId, PreemptionPolicy, Queue, QueueId, Task, TaskId,
        TaskStatus, ValidationVerdict,
    };
    use crate::prelude::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// A hand-written fake implementing the full [`Session`] contract
    /// over plain `HashMap`s, the same house style `claw-preemption`
    /// uses for its own test doubles (no mocking framework).
    #[derive(Default)]
    struct FakeSession {
        queues: HashMap<QueueId, Queue>,
        jobs: HashMap<JobId, Job>,
        tasks: RefCell<HashMap<TaskId, Task>>,
        nodes: HashMap<NodeId, Node>,

        starving_jobs: Vec<JobId>,
        overused_queues: Vec<QueueId>,
        reclaimable_queues: Vec<QueueId>,
        task_queue: HashMap<TaskId, QueueId>,
        nodes_for_task: HashMap<TaskId, Vec<NodeId>>,

        evicted: RefCell<Vec<(TaskId, QueueId)>>,
        pipelined: RefCell<Vec<(TaskId, String)>>,
    }

    impl FakeSession {
        fn queue_of(&self, task: &Task) -> Option<QueueId> {
            self.task_queue.get(&task.id).cloned()
        }
    }

    impl Session for FakeSession {
        type Err = SessionError;

        fn queue_order(&self, a: &Queue, b: &Queue) -> bool {
            a.name < b.name
        }
        fn job_order(&self, a: &Job, b: &Job) -> bool {
            a.id < b.id
        }
        fn task_order(&self, a: &Task, b: &Task) -> bool {
            a.id < b.id
        }
        fn queue(&self, id: &QueueId) -> Option<Queue> {
            self.queues.get(id).cloned()
        }
        fn jobs(&self) -> Vec<Job> {
            self.jobs.values().cloned().collect()
        }
        fn job(&self, id: &JobId) -> Option<Job> {
            self.jobs.get(id).cloned()
        }
        fn task(&self, id: &TaskId) -> Option<Task> {
            self.tasks.borrow().get(id).cloned()
        }
        fn node(&self, id: &NodeId) -> Option<Node> {
            self.nodes.get(id).cloned()
        }
        fn queue_reclaimable(&self, id: &QueueId) -> bool {
            self.reclaimable_queues.contains(id)
        }
        fn job_valid(&self, _job: &Job) -> Option<ValidationVerdict> {
            None
        }
        fn job_starving(&self, job: &Job) -> bool {
            self.starving_jobs.contains(&job.id)
        }
        fn overused(&self, queue: &Queue) -> bool {
            self.overused_queues.contains(&queue.id)
        }
        fn preemptive(&self, _queue: &Queue, _task: &Task) -> bool {
            true
        }
        fn pre_predicate(&self, _task: &Task) -> std::result::Result<(), Self::Err> {
            Ok(())
        }
        fn candidate_nodes_for_task(&self, task: &Task) -> Vec<Node> {
            self.nodes_for_task
                .get(&task.id)
                .into_iter()
                .flatten()
                .filter_map(|id| self.nodes.get(id).cloned())
                .collect()
        }
        fn predicate_for_preempt(&self, _task: &Task, _node: &Node) -> std::result::Result<(), Self::Err> {
            Ok(())
        }
        fn reclaimable(&self, _task: &Task, reclaimees: Vec<Task>) -> Vec<Task> {
            reclaimees
        }
        fn order_victims(&self, _task: &Task, mut victims: Vec<Task>) -> Vec<Task> {
            victims.sort_by(|a, b| a.id.cmp(&b.id));
            victims
        }
        fn evict(&self, victim: &Task, _reason: &str) -> std::result::Result<(), Self::Err> {
            let queue = self.queue_of(victim).unwrap_or_else(|| QueueId::new("unknown"));
            self.evicted.borrow_mut().push((victim.id.clone(), queue));
            let mut tasks = self.tasks.borrow_mut();
            if let Some(t) = tasks.get_mut(&victim.id) {
                t.status = TaskStatus::Releasing;
            }
            Ok(())
        }
        fn pipeline(&self, task: &Task, node_name: &str) -> std::result::Result<(), Self::Err> {
            self.pipelined
                .borrow_mut()
                .push((task.id.clone(), node_name.to_string()));
            Ok(())
        }
    }

    fn register_queue(session: &mut FakeSession, id: &str, reclaimable: bool) {
        session
            .queues
            .insert(QueueId::new(id), Queue::new(id, id));
        if reclaimable {
            session.reclaimable_queues.push(QueueId::new(id));
        }
    }

    fn register_starving_job_with_task(
        session: &mut FakeSession,
        job_id: &str,
        queue_id: &str,
        task_id: &str,
        cpu: i64,
    ) {
        let mut job = Job::new(job_id, queue_id);
        job.status = JobStatus::Running;
        job.add_task(TaskStatus::Pending, TaskId::new(task_id));
        session.jobs.insert(job.id.clone(), job);
        session.starving_jobs.push(JobId::new(job_id));

        let task = Task::new(task_id, job_id, Resource::cpu_mem(cpu, 0));
        session.task_queue.insert(task.id.clone(), QueueId::new(queue_id));
        session.tasks.borrow_mut().insert(task.id.clone(), task);
    }

    fn register_running_victim(
        session: &mut FakeSession,
        victim_id: &str,
        job_id: &str,
        queue_id: &str,
        node_id: &str,
        cpu: i64,
    ) {
        session
            .jobs
            .entry(JobId::new(job_id))
            .or_insert_with(|| Job::new(job_id, queue_id));

        let victim = Task::new(victim_id, job_id, Resource::cpu_mem(cpu, 0))
            .status(TaskStatus::Running)
            .preemptable(true);
        session.task_queue.insert(victim.id.clone(), QueueId::new(queue_id));
        session.tasks.borrow_mut().insert(victim.id.clone(), victim);

        let node = session
            .nodes
            .entry(NodeId::new(node_id))
            .or_insert_with(|| Node::new(node_id, node_id));
        node.bind(TaskId::new(victim_id));
    }

    fn wire_candidate_node(session: &mut FakeSession, task_id: &str, node_id: &str) {
        session
            .nodes_for_task
            .entry(TaskId::new(task_id))
            .or_default()
            .push(NodeId::new(node_id));
    }

    // --- Scenario 1: single-queue no-op -------------------------------

    #[test]
    fn scenario_single_queue_no_op() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_starving_job_with_task(&mut session, "j-1", "q-1", "t-1", 2);

        ReclaimAction::new().execute(&session);

        assert!(session.evicted.borrow().is_empty());
        assert!(session.pipelined.borrow().is_empty());
    }

    // --- Scenario 2: cross-queue single victim ------------------------

    #[test]
    fn scenario_cross_queue_single_victim() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_queue(&mut session, "q-2", true);
        register_starving_job_with_task(&mut session, "j-1", "q-1", "t-1", 2);
        register_running_victim(&mut session, "v-1", "j-2", "q-2", "n-1", 2);
        wire_candidate_node(&mut session, "t-1", "n-1");

        ReclaimAction::new().execute(&session);

        assert_eq!(
            session.evicted.borrow().as_slice(),
            &[(TaskId::new("v-1"), QueueId::new("q-2"))]
        );
        assert_eq!(
            session.pipelined.borrow().as_slice(),
            &[(TaskId::new("t-1"), "n-1".to_string())]
        );
    }

    // --- Scenario 3: minimality stop -----------------------------------

    #[test]
    fn scenario_minimality_stop() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_queue(&mut session, "q-2", true);
        register_starving_job_with_task(&mut session, "j-1", "q-1", "t-1", 4);
        register_running_victim(&mut session, "v-1", "j-2", "q-2", "n-1", 3);
        register_running_victim(&mut session, "v-2", "j-3", "q-2", "n-1", 3);
        wire_candidate_node(&mut session, "t-1", "n-1");

        ReclaimAction::new().execute(&session);

        assert_eq!(session.evicted.borrow().len(), 2);
        assert_eq!(session.pipelined.borrow().len(), 1);
    }

    // --- Scenario 4: never-policy skip -----------------------------------

    fn build_never_policy_fixture() -> FakeSession {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_queue(&mut session, "q-2", true);

        let mut job = Job::new("j-1", "q-1");
        job.status = JobStatus::Running;
        job.add_task(TaskStatus::Pending, TaskId::new("t-1"));
        session.jobs.insert(job.id.clone(), job);
        session.starving_jobs.push(JobId::new("j-1"));

        let task = Task::new("t-1", "j-1", Resource::cpu_mem(2, 0))
            .preemption_policy(PreemptionPolicy::Never);
        session.task_queue.insert(task.id.clone(), QueueId::new("q-1"));
        session.tasks.borrow_mut().insert(task.id.clone(), task);

        register_running_victim(&mut session, "v-1", "j-2", "q-2", "n-1", 2);
        wire_candidate_node(&mut session, "t-1", "n-1");
        session
    }

    #[test]
    fn scenario_never_policy_skip() {
        let session = build_never_policy_fixture();

        ReclaimAction::new().execute(&session);

        assert!(session.evicted.borrow().is_empty());
    }

    // --- Scenario 5: overused queue ---------------------------------------

    #[test]
    fn scenario_overused_queue() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_queue(&mut session, "q-2", true);
        register_starving_job_with_task(&mut session, "j-1", "q-1", "t-1", 2);
        register_running_victim(&mut session, "v-1", "j-2", "q-2", "n-1", 2);
        wire_candidate_node(&mut session, "t-1", "n-1");
        session.overused_queues.push(QueueId::new("q-1"));

        ReclaimAction::new().execute(&session);

        assert!(session.evicted.borrow().is_empty());
    }

    // --- Scenario 6: fairness veto -----------------------------------------

    struct VetoingSession(FakeSession);

    impl Session for VetoingSession {
        type Err = SessionError;
        fn queue_order(&self, a: &Queue, b: &Queue) -> bool {
            self.0.queue_order(a, b)
        }
        fn job_order(&self, a: &Job, b: &Job) -> bool {
            self.0.job_order(a, b)
        }
        fn task_order(&self, a: &Task, b: &Task) -> bool {
            self.0.task_order(a, b)
        }
        fn queue(&self, id: &QueueId) -> Option<Queue> {
            self.0.queue(id)
        }
        fn jobs(&self) -> Vec<Job> {
            self.0.jobs()
        }
        fn job(&self, id: &JobId) -> Option<Job> {
            self.0.job(id)
        }
        fn task(&self, id: &TaskId) -> Option<Task> {
            self.0.task(id)
        }
        fn node(&self, id: &NodeId) -> Option<Node> {
            self.0.node(id)
        }
        fn queue_reclaimable(&self, id: &QueueId) -> bool {
            self.0.queue_reclaimable(id)
        }
        fn job_valid(&self, job: &Job) -> Option<ValidationVerdict> {
            self.0.job_valid(job)
        }
        fn job_starving(&self, job: &Job) -> bool {
            self.0.job_starving(job)
        }
        fn overused(&self, queue: &Queue) -> bool {
            self.0.overused(queue)
        }
        fn preemptive(&self, queue: &Queue, task: &Task) -> bool {
            self.0.preemptive(queue, task)
        }
        fn pre_predicate(&self, task: &Task) -> std::result::Result<(), Self::Err> {
            self.0.pre_predicate(task)
        }
        fn candidate_nodes_for_task(&self, task: &Task) -> Vec<Node> {
            self.0.candidate_nodes_for_task(task)
        }
        fn predicate_for_preempt(&self, task: &Task, node: &Node) -> std::result::Result<(), Self::Err> {
            self.0.predicate_for_preempt(task, node)
        }
        fn reclaimable(&self, _task: &Task, _reclaimees: Vec<Task>) -> Vec<Task> {
            Vec::new()
        }
        fn order_victims(&self, task: &Task, victims: Vec<Task>) -> Vec<Task> {
            self.0.order_victims(task, victims)
        }
        fn evict(&self, victim: &Task, reason: &str) -> std::result::Result<(), Self::Err> {
            self.0.evict(victim, reason)
        }
        fn pipeline(&self, task: &Task, node_name: &str) -> std::result::Result<(), Self::Err> {
            self.0.pipeline(task, node_name)
        }
    }

    #[test]
    fn scenario_fairness_veto() {
        let mut inner = FakeSession::default();
        register_queue(&mut inner, "q-1", false);
        register_queue(&mut inner, "q-2", true);
        register_starving_job_with_task(&mut inner, "j-1", "q-1", "t-1", 2);
        register_running_victim(&mut inner, "v-1", "j-2", "q-2", "n-1", 2);
        wire_candidate_node(&mut inner, "t-1", "n-1");
        let session = VetoingSession(inner);

        ReclaimAction::new().execute(&session);

        assert!(session.0.evicted.borrow().is_empty());
        assert!(session.0.pipelined.borrow().is_empty());
    }

    // --- Invariants --------------------------------------------------------

    #[test]
    fn invariant_no_self_reclaim() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", true);
        register_starving_job_with_task(&mut session, "j-1", "q-1", "t-1", 2);
        register_running_victim(&mut session, "v-1", "j-2", "q-1", "n-1", 2);
        wire_candidate_node(&mut session, "t-1", "n-1");

        ReclaimAction::new().execute(&session);

        for (_, queue) in session.evicted.borrow().iter() {
            assert_ne!(*queue, QueueId::new("q-1"));
        }
        assert!(session.evicted.borrow().is_empty());
    }

    #[test]
    fn invariant_never_policy_never_evicts() {
        let session = build_never_policy_fixture();

        ReclaimAction::new().execute(&session);

        assert!(session.evicted.borrow().is_empty());
    }

    #[test]
    fn invariant_gated_task_never_becomes_preemptor() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_queue(&mut session, "q-2", true);

        let mut job = Job::new("j-1", "q-1");
        job.status = JobStatus::Running;
        job.add_task(TaskStatus::Pending, TaskId::new("t-1"));
        session.jobs.insert(job.id.clone(), job);
        session.starving_jobs.push(JobId::new("j-1"));

        let task = Task::new("t-1", "j-1", Resource::cpu_mem(2, 0)).sched_gated(true);
        session.task_queue.insert(task.id.clone(), QueueId::new("q-1"));
        session.tasks.borrow_mut().insert(task.id.clone(), task);

        register_running_victim(&mut session, "v-1", "j-2", "q-2", "n-1", 2);
        wire_candidate_node(&mut session, "t-1", "n-1");

        ReclaimAction::new().execute(&session);

        assert!(session.evicted.borrow().is_empty());
    }

    #[test]
    fn invariant_idempotent_when_first_pass_made_no_progress() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_starving_job_with_task(&mut session, "j-1", "q-1", "t-1", 2);

        ReclaimAction::new().execute(&session);
        assert!(session.evicted.borrow().is_empty());

        ReclaimAction::new().execute(&session);
        assert!(session.evicted.borrow().is_empty());
    }

    #[test]
    fn invariant_termination_on_larger_fixture() {
        let mut session = FakeSession::default();
        register_queue(&mut session, "q-1", false);
        register_queue(&mut session, "q-2", true);
        for i in 0..20 {
            register_starving_job_with_task(
                &mut session,
                &format!("j-{i}"),
                "q-1",
                &format!("t-{i}"),
                1,
            );
            register_running_victim(&mut session, &format!("v-{i}"), "j-other", "q-2", "n-1", 1);
            wire_candidate_node(&mut session, &format!("t-{i}"), "n-1");
        }

        // Bounded execution is the assertion here: if the driver failed to
        // terminate, this test would hang rather than fail an assert.
        ReclaimAction::new().execute(&session);
    }
}
