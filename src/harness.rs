/*! Plain-data adapter types for external callers: build a [TaskSet]
from untyped records, pick a solver, and summarize a run.

No I/O lives here; reading records from a file or socket is left to
the caller, mirroring `original_source/run_test.py`'s division of
labor from `CyclicSchedulerAlgorithm`.
*/

use std::time::Duration as WallClockDuration;

use crate::error::SchedulingError;
use crate::taskset::{Task, TaskId, TaskSet};
use crate::time::{Duration, Service, TimelineInstant};

/// An untyped task description as a caller would hand it in: periods,
/// WCETs, and deadlines as floating-point quantities, since real
/// workloads rarely land on integer time units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub period: f64,
    pub wcet: f64,
    pub deadline: f64,
    /// Release offset. Always `0.0`; nonzero offsets are out of scope
    /// (`spec.md`'s Non-goals), and [TaskSet::try_from_records] rejects
    /// any record that sets one.
    pub offset: f64,
}

/// The external "TaskSet input" configuration (`spec.md` §6): the
/// schedule window a caller wants covered, plus the task records
/// within it. [TaskSet::try_from_request] turns this into a [TaskSet]
/// and the `start_time`/`end_time` pair [crate::schedule::ScheduleBuilder::build]
/// expects.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub start_time: f64,
    pub end_time: f64,
    pub tasks: Vec<TaskRecord>,
}

/// Which solver produced (or is asked to produce) an [crate::flow::Assignment].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    Ilp,
    Flow,
}

impl std::fmt::Display for SolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverKind::Ilp => write!(f, "ilp"),
            SolverKind::Flow => write!(f, "flow"),
        }
    }
}

/// Summary of a single solver run, for a caller comparing solvers
/// across task sets.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub scheduler: SolverKind,
    pub n_tasks: usize,
    pub utilization: f64,
    pub success: bool,
    /// Measured by the caller around the solve call, never by the
    /// solver itself; the solvers have no wall-clock side effects.
    pub total_time: WallClockDuration,
}

const SCALE_CANDIDATES: [u64; 5] = [1, 10, 100, 1_000, 10_000];

fn is_close_to_integer(x: f64) -> bool {
    (x - x.round()).abs() < 1e-6
}

/// Smallest power-of-ten scale that turns every record's period, wcet,
/// and deadline into (approximately) an integer number of time units.
/// Falls back to the largest candidate if none fits exactly, which
/// then surfaces as ordinary rounding error rather than a panic.
fn required_scale(records: &[TaskRecord]) -> u64 {
    for &scale in &SCALE_CANDIDATES {
        let fits = records.iter().all(|r| {
            is_close_to_integer(r.period * scale as f64)
                && is_close_to_integer(r.wcet * scale as f64)
                && is_close_to_integer(r.deadline * scale as f64)
        });
        if fits {
            return scale;
        }
    }
    *SCALE_CANDIDATES.last().unwrap()
}

impl TaskSet {
    /// Build a [TaskSet] from floating-point [TaskRecord]s by scaling
    /// the whole time axis (periods, WCETs, deadlines) by a common
    /// integer factor, so every downstream computation stays exact
    /// integer arithmetic. Returns the scale factor alongside the
    /// task set so a caller can later call [crate::schedule::Schedule::unscale]
    /// on the resulting schedule.
    pub fn try_from_records(records: &[TaskRecord]) -> Result<(TaskSet, u64), SchedulingError> {
        let scale = required_scale(records);
        let scale_f = scale as f64;

        let mut tasks = Vec::with_capacity(records.len());
        for record in records {
            if record.offset != 0.0 {
                return Err(SchedulingError::invalid_input(
                    record.task_id,
                    "nonzero release offsets are not supported",
                ));
            }
            let period = (record.period * scale_f).round() as Duration;
            let wcet = (record.wcet * scale_f).round() as Service;
            let deadline = (record.deadline * scale_f).round() as Duration;
            tasks.push(Task::new(record.task_id, period, wcet, deadline)?);
        }
        let task_set = TaskSet::new(tasks)?;
        Ok((task_set, scale))
    }

    /// As [TaskSet::try_from_records], but also scales
    /// `request.start_time`/`request.end_time` by the same integer
    /// factor, returning them alongside the task set and the scale
    /// itself so a caller can drive [crate::schedule::ScheduleBuilder::build]
    /// and later call [crate::schedule::Schedule::unscale] on the result.
    pub fn try_from_request(
        request: &ScheduleRequest,
    ) -> Result<(TaskSet, u64, TimelineInstant, TimelineInstant), SchedulingError> {
        let (task_set, scale) = TaskSet::try_from_records(&request.tasks)?;
        let scale_f = scale as f64;
        Ok((
            task_set,
            scale,
            request.start_time * scale_f,
            request.end_time * scale_f,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_records_need_no_scaling() {
        let records = vec![
            TaskRecord {
                task_id: 1,
                period: 4.0,
                wcet: 1.0,
                deadline: 4.0,
                offset: 0.0,
            },
            TaskRecord {
                task_id: 2,
                period: 5.0,
                wcet: 2.0,
                deadline: 5.0,
                offset: 0.0,
            },
        ];
        let (task_set, scale) = TaskSet::try_from_records(&records).unwrap();
        assert_eq!(scale, 1);
        assert_eq!(task_set.tasks().len(), 2);
    }

    #[test]
    fn fractional_wcets_are_scaled_to_integers() {
        let records = vec![TaskRecord {
            task_id: 1,
            period: 4.0,
            wcet: 0.5,
            deadline: 4.0,
            offset: 0.0,
        }];
        let (task_set, scale) = TaskSet::try_from_records(&records).unwrap();
        assert_eq!(scale, 10);
        assert_eq!(task_set.task(1).unwrap().period, 40);
        assert_eq!(task_set.task(1).unwrap().wcet, 5);
    }

    #[test]
    fn nonzero_offset_is_rejected() {
        let records = vec![TaskRecord {
            task_id: 1,
            period: 4.0,
            wcet: 1.0,
            deadline: 4.0,
            offset: 1.0,
        }];
        assert!(TaskSet::try_from_records(&records).is_err());
    }

    #[test]
    fn request_scales_start_and_end_time_along_with_the_tasks() {
        let request = ScheduleRequest {
            start_time: 0.0,
            end_time: 4.0,
            tasks: vec![TaskRecord {
                task_id: 1,
                period: 4.0,
                wcet: 0.5,
                deadline: 4.0,
                offset: 0.0,
            }],
        };
        let (task_set, scale, start, end) = TaskSet::try_from_request(&request).unwrap();
        assert_eq!(scale, 10);
        assert_eq!(start, 0.0);
        assert_eq!(end, 40.0);
        assert_eq!(task_set.task(1).unwrap().wcet, 5);
    }
}
