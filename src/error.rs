/*! The failure taxonomy shared by every solver and builder in this crate.

All four variants are terminal for the invocation that raised them;
nothing in this crate retries internally. A harness observes the
error, records "no schedule" for that run, and moves on to the next
task set.
*/

use thiserror::Error;

use crate::frame::FrameIndex;
use crate::taskset::{JobId, TaskId};
use crate::time::Instant;

/// Failure modes of frame-size derivation, assignment solving, schedule
/// construction, and task-set ingestion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// No frame size `f >= 2` satisfies the divisibility, capacity, and
    /// deadline lemmas for every task. Raised by [crate::frame::FrameGeometry].
    #[error("no valid frame size for hyperperiod {hyperperiod}: no f >= 2 divides H and satisfies every task's capacity and deadline constraint")]
    InfeasibleFrameSize { hyperperiod: Instant },

    /// No valid job-to-frame assignment exists, either because the ILP
    /// solver reported infeasibility, the flow network failed to
    /// saturate, or best-fit-descent could not place a preempted job.
    #[error("no feasible job-to-frame assignment: {reason}")]
    InfeasibleAssignment { reason: String },

    /// [crate::schedule::builder::ScheduleBuilder] detected that the
    /// cumulative work placed in a frame would overrun the frame
    /// boundary. Indicates a solver bug or an assumption violated by
    /// the input (e.g. an un-scaled fractional WCET).
    #[error("schedule construction failed: placing job {job:?} in frame {frame} would run past time {frame_end} (attempted start {attempted_start})")]
    InvalidSchedule {
        frame: FrameIndex,
        frame_end: Instant,
        attempted_start: Instant,
        job: JobId,
    },

    /// A task record violates the task model: non-positive period,
    /// WCET greater than period, deadline out of `[wcet, period]`, or a
    /// duplicate task id.
    #[error("invalid task record for task {task_id}: {reason}")]
    InvalidInput { task_id: TaskId, reason: String },
}

impl SchedulingError {
    pub(crate) fn infeasible_assignment(reason: impl Into<String>) -> Self {
        SchedulingError::InfeasibleAssignment {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(task_id: TaskId, reason: impl Into<String>) -> Self {
        SchedulingError::InvalidInput {
            task_id,
            reason: reason.into(),
        }
    }
}
