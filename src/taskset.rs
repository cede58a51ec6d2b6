/*! Periodic tasks and their per-hyperperiod job instances.

This module provides [Task] and [Job], the data model that every
other module in this crate is built on, plus [TaskSet], which owns a
collection of tasks (in insertion order) and materializes the jobs
released by those tasks over one hyperperiod.

Offsets other than zero are out of scope: every task is implicitly
released for the first time at `t=0`.
*/

use std::collections::BTreeSet;

use crate::error::SchedulingError;
use crate::frame::hyperperiod;
use crate::time::{Duration, Instant, Service};

/// Unique identity of a task within a [TaskSet].
pub type TaskId = u32;

/// A task's 1-based sequence number of a job within its own release
/// sequence (`j` in `spec.md`'s `(i, j)` notation).
pub type JobSeq = u32;

/// A single periodic task: `C_i <= T_i` and `C_i <= D_i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    /// `T_i`, the exact separation between releases.
    pub period: Duration,
    /// `C_i`, worst-case execution time.
    pub wcet: Service,
    /// `D_i`, relative deadline. This crate assumes the implicit-deadline
    /// model is the common case but does not require `D_i == T_i`.
    pub deadline: Duration,
}

impl Task {
    /// Construct a task, checking the invariants from `spec.md` §3:
    /// `0 < period`, `wcet <= period`, `wcet <= deadline <= period`.
    pub fn new(
        id: TaskId,
        period: Duration,
        wcet: Service,
        deadline: Duration,
    ) -> Result<Self, SchedulingError> {
        if period == 0 {
            return Err(SchedulingError::invalid_input(id, "period must be positive"));
        }
        if wcet > period {
            return Err(SchedulingError::invalid_input(
                id,
                format!("wcet {wcet} exceeds period {period}"),
            ));
        }
        if deadline == 0 || deadline > period {
            return Err(SchedulingError::invalid_input(
                id,
                format!("deadline {deadline} must be in (0, period {period}]"),
            ));
        }
        if wcet > deadline {
            return Err(SchedulingError::invalid_input(
                id,
                format!("wcet {wcet} exceeds deadline {deadline}"),
            ));
        }
        Ok(Task {
            id,
            period,
            wcet,
            deadline,
        })
    }

    /// `C_i / T_i`, this task's contribution to total utilization.
    pub fn utilization(&self) -> f64 {
        self.wcet as f64 / self.period as f64
    }
}

/// Identity of a single job: the task it belongs to, plus its 1-based
/// release sequence number within that task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display(fmt = "({task_id}, {job_seq})")]
pub struct JobId {
    pub task_id: TaskId,
    pub job_seq: JobSeq,
}

/// One release of a task within the hyperperiod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// `r_{i,j} = (j - 1) * T_i`.
    pub release: Instant,
    /// `d_{i,j} = j * T_i`, the implicit-deadline assumption `spec.md`
    /// §3 states directly (relative deadline equals period for the
    /// purpose of deriving job deadlines, even though `Task::deadline`
    /// carries `D_i` separately for the frame-size feasibility lemmas).
    pub deadline: Instant,
    /// Remaining execution time, initialized to `C_i` and never mutated
    /// by this crate (the core does not model partial progress across
    /// calls; a solver either places the whole job or fails).
    pub remaining: Service,
}

/// A collection of tasks together with the jobs they release over one
/// hyperperiod. Tasks are kept in insertion order; that order governs
/// every deterministic iteration elsewhere in the crate (`spec.md` §5).
#[derive(Debug, Clone)]
pub struct TaskSet {
    tasks: Vec<Task>,
    jobs: Vec<Job>,
    hyperperiod: Instant,
}

impl TaskSet {
    /// Build a task set from tasks already validated by [Task::new],
    /// checking for duplicate ids and materializing every job released
    /// over the hyperperiod.
    pub fn new(tasks: Vec<Task>) -> Result<Self, SchedulingError> {
        let mut seen = BTreeSet::new();
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(SchedulingError::invalid_input(
                    task.id,
                    "duplicate task id",
                ));
            }
        }

        let hyperperiod = hyperperiod(&tasks);
        let mut jobs = Vec::new();
        for task in &tasks {
            let n = hyperperiod / task.period;
            for j in 1..=n {
                let job_seq = j as JobSeq;
                let release = (j - 1) * task.period;
                let deadline = release + task.period;
                jobs.push(Job {
                    id: JobId {
                        task_id: task.id,
                        job_seq,
                    },
                    release,
                    deadline,
                    remaining: task.wcet,
                });
            }
        }

        Ok(TaskSet {
            tasks,
            jobs,
            hyperperiod,
        })
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// All jobs released over the hyperperiod, grouped by task in
    /// insertion order and by ascending `job_seq` within each task.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn hyperperiod(&self) -> Instant {
        self.hyperperiod
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// `U = sum_i C_i / T_i`. A necessary but not sufficient feasibility
    /// condition is `U <= 1`.
    pub fn utilization(&self) -> f64 {
        self.tasks.iter().map(Task::utilization).sum()
    }

    /// `W = sum_i C_i * (H / T_i)`, the total processor work demanded
    /// over one hyperperiod. Used by [crate::flow::scheduler::FlowScheduler]
    /// as the max-flow feasibility target.
    pub fn total_work(&self) -> Service {
        self.jobs.iter().map(|j| j.remaining).sum()
    }
}
