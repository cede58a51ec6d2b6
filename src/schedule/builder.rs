/*! Materializes a solved job-to-frame [Assignment] into a [Schedule].

Within each frame, jobs are dispatched in ascending task-id order
(`spec.md` §4.5's deterministic dispatch rule) back-to-back starting at
the frame's own start time; any leftover frame capacity becomes idle
time, and a final idle interval extends the timeline out to the
caller-supplied end time.
*/

use crate::error::SchedulingError;
use crate::flow::Assignment;
use crate::frame::FrameGeometry;
use crate::schedule::{Interval, IntervalKind, Schedule};
use crate::taskset::TaskSet;
use crate::time::TimelineInstant;

pub struct ScheduleBuilder<'a> {
    task_set: &'a TaskSet,
    geometry: &'a FrameGeometry,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(task_set: &'a TaskSet, geometry: &'a FrameGeometry) -> Self {
        ScheduleBuilder { task_set, geometry }
    }

    /// Turn an [Assignment] into an ordered [Schedule] covering
    /// `[start_time, end_time]`. Fails with
    /// [SchedulingError::InvalidSchedule] if a frame's assigned jobs
    /// would overrun the frame boundary, which signals an assignment a
    /// solver should never have produced.
    pub fn build(
        &self,
        assignment: &Assignment,
        start_time: TimelineInstant,
        end_time: TimelineInstant,
    ) -> Result<Schedule, SchedulingError> {
        let frame_size = self.geometry.frame_size() as TimelineInstant;
        let mut intervals = Vec::new();
        let mut cursor = start_time;

        for k in 1..=self.geometry.num_frames() {
            let frame_end = k as TimelineInstant * frame_size;

            let mut jobs = assignment.get(&k).cloned().unwrap_or_default();
            jobs.sort_by_key(|id| (id.task_id, id.job_seq));

            for job_id in jobs {
                if cursor > frame_end {
                    return Err(SchedulingError::InvalidSchedule {
                        frame: k,
                        frame_end: self.geometry.frame_size() * k as u64,
                        attempted_start: cursor as u64,
                        job: job_id,
                    });
                }
                let job = self
                    .task_set
                    .job(job_id)
                    .expect("assignment references a job from this task set");
                intervals.push(Interval {
                    start_time: cursor,
                    end_time: cursor,
                    kind: IntervalKind::Busy(job_id),
                    job_completed: true,
                    preempted_previous: false,
                });
                cursor += job.remaining as TimelineInstant;
            }

            if cursor < frame_end {
                intervals.push(Interval {
                    start_time: cursor,
                    end_time: cursor,
                    kind: IntervalKind::Idle,
                    job_completed: false,
                    preempted_previous: false,
                });
                cursor = frame_end;
            }
        }

        intervals.push(Interval {
            start_time: cursor,
            end_time: cursor,
            kind: IntervalKind::Idle,
            job_completed: false,
            preempted_previous: false,
        });

        self.postprocess(&mut intervals, end_time);

        Ok(Schedule {
            start_time,
            end_time: intervals.last().map(|iv| iv.end_time).unwrap_or(end_time),
            intervals,
        })
    }

    /// Each interval's `end_time` becomes the next interval's
    /// `start_time`; the last interval's `end_time` is stretched to
    /// `max(latest job deadline, end_time)`, per `spec.md` §4.5.
    fn postprocess(&self, intervals: &mut [Interval], end_time: TimelineInstant) {
        for i in 0..intervals.len().saturating_sub(1) {
            let next_start = intervals[i + 1].start_time;
            intervals[i].end_time = next_start;
        }
        if let Some(last) = intervals.last_mut() {
            let latest_deadline = self
                .task_set
                .jobs()
                .iter()
                .map(|job| job.deadline as TimelineInstant)
                .fold(0.0, TimelineInstant::max);
            last.end_time = end_time.max(latest_deadline);
        }
    }
}
