/*! Post-hoc checks on a built [Schedule]: every job gets exactly its
WCET of processor time, and every job marked complete finishes at or
before its deadline (`spec.md` §4.6).

Both checks report booleans; a harness decides what "success" means
from them (`spec.md` §6), rather than this module raising a
[crate::error::SchedulingError] of its own.
*/

use crate::schedule::Schedule;
use crate::taskset::TaskSet;

pub struct ScheduleValidator<'a> {
    task_set: &'a TaskSet,
}

impl<'a> ScheduleValidator<'a> {
    pub fn new(task_set: &'a TaskSet) -> Self {
        ScheduleValidator { task_set }
    }

    /// Sum each job's busy-interval durations and compare against its
    /// task's WCET; a job split across more than one interval is fine
    /// as long as the total matches. Returns `true` iff every job's
    /// total executed time equals its WCET.
    pub fn check_wcet(&self, schedule: &Schedule) -> bool {
        for job in self.task_set.jobs() {
            let executed: f64 = schedule
                .intervals
                .iter()
                .filter(|iv| iv.job_id() == Some(job.id))
                .map(|iv| iv.end_time - iv.start_time)
                .sum();
            let expected = job.remaining as f64;
            if (executed - expected).abs() > f64::EPSILON {
                log::debug!(
                    "job {} executed for {executed} but its task's wcet is {expected}",
                    job.id
                );
                return false;
            }
        }
        true
    }

    /// Every busy interval marked `job_completed` must end at or before
    /// its job's deadline. Returns `true` iff that holds for every such
    /// interval.
    pub fn check_deadlines(&self, schedule: &Schedule) -> bool {
        for interval in &schedule.intervals {
            let Some(job_id) = interval.job_id() else {
                continue;
            };
            if !interval.job_completed {
                continue;
            }
            let job = self
                .task_set
                .job(job_id)
                .expect("schedule references a job from this task set");
            if interval.end_time > job.deadline as f64 {
                log::debug!(
                    "job {} completed at {} after its deadline {}",
                    job_id,
                    interval.end_time,
                    job.deadline
                );
                return false;
            }
        }
        true
    }

    /// Run both checks; the schedule is sound only if both pass.
    pub fn validate(&self, schedule: &Schedule) -> bool {
        self.check_wcet(schedule) && self.check_deadlines(schedule)
    }
}
