/*! Frame-size derivation and valid-frame enumeration for the cyclic executive.

[FrameGeometry] is built from a [TaskSet] alone: it derives the
hyperperiod, searches for a valid frame size, and computes the set of
frames each job may run in. Every method here is a pure function of
the task set it was built from.
*/

use std::collections::BTreeMap;

use crate::error::SchedulingError;
use crate::taskset::{JobId, Task, TaskSet};
use crate::time::Instant;


/// 1-based index of a frame within `1..=NumFrames`.
pub type FrameIndex = u32;

/// `gcd(a, b)` via the Euclidean algorithm.
fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

/// `H`, the least common multiple of every task's period. A pure
/// function of the task list so that [TaskSet] can compute it while
/// materializing jobs, and [FrameGeometry] can recompute the identical
/// value independently.
pub fn hyperperiod(tasks: &[Task]) -> Instant {
    tasks.iter().map(|t| t.period).fold(1, lcm)
}

/// Derived frame geometry: hyperperiod, frame size, frame count, and
/// the valid-frame set of every job.
#[derive(Debug, Clone)]
pub struct FrameGeometry {
    hyperperiod: Instant,
    frame_size: Instant,
    num_frames: FrameIndex,
    valid_frames: BTreeMap<JobId, Vec<FrameIndex>>,
}

impl FrameGeometry {
    /// Derive the frame geometry for a task set: compute `H`, search
    /// for a valid `f` (from `H` down to `2`, per `spec.md`'s policy of
    /// preferring coarser frames), and enumerate `V(i,j)` for every job.
    ///
    /// Fails with [SchedulingError::InfeasibleFrameSize] if no `f >= 2`
    /// satisfies the three validity rules in `spec.md` §3, or with
    /// [SchedulingError::InfeasibleAssignment] if frame size derivation
    /// succeeds but some job's valid-frame set turns out empty (the
    /// instance is infeasible even though a frame size exists).
    pub fn new(task_set: &TaskSet) -> Result<Self, SchedulingError> {
        let hyperperiod = task_set.hyperperiod();
        let frame_size = Self::choose_frame_size(task_set.tasks(), hyperperiod)?;
        let num_frames = (hyperperiod / frame_size) as FrameIndex;
        log::debug!(
            "hyperperiod={hyperperiod} frame_size={frame_size} num_frames={num_frames}"
        );

        let mut valid_frames = BTreeMap::new();
        for job in task_set.jobs() {
            let task = task_set
                .task(job.id.task_id)
                .expect("job references a task that belongs to the same task set");
            let frames = Self::valid_frame_set(job.release, task.period, frame_size, num_frames);
            if frames.is_empty() {
                return Err(SchedulingError::infeasible_assignment(format!(
                    "job {} has no frame k for which [ (k-1)*f, k*f ] fits inside [{}, {}]",
                    job.id,
                    job.release,
                    job.release + task.period
                )));
            }
            valid_frames.insert(job.id, frames);
        }

        Ok(FrameGeometry {
            hyperperiod,
            frame_size,
            num_frames,
            valid_frames,
        })
    }

    fn is_valid_frame_size(tasks: &[Task], hyperperiod: Instant, frame_size: Instant) -> bool {
        if hyperperiod % frame_size != 0 {
            return false;
        }
        for task in tasks {
            if frame_size < task.wcet {
                return false;
            }
            if 2 * frame_size - gcd(task.period, frame_size) > task.deadline {
                return false;
            }
        }
        true
    }

    fn choose_frame_size(
        tasks: &[Task],
        hyperperiod: Instant,
    ) -> Result<Instant, SchedulingError> {
        let mut candidate = hyperperiod;
        while candidate >= 2 {
            if Self::is_valid_frame_size(tasks, hyperperiod, candidate) {
                return Ok(candidate);
            }
            candidate -= 1;
        }
        Err(SchedulingError::InfeasibleFrameSize { hyperperiod })
    }

    /// `V(i,j)`: frame indices `k` such that `[(k-1)*f, k*f]` lies
    /// entirely within `[release, release + period]`.
    fn valid_frame_set(
        release: Instant,
        period: Instant,
        frame_size: Instant,
        num_frames: FrameIndex,
    ) -> Vec<FrameIndex> {
        (1..=num_frames)
            .filter(|&k| {
                let k = k as Instant;
                (k - 1) * frame_size >= release && k * frame_size <= release + period
            })
            .collect()
    }

    pub fn hyperperiod_value(&self) -> Instant {
        self.hyperperiod
    }

    pub fn frame_size(&self) -> Instant {
        self.frame_size
    }

    pub fn num_frames(&self) -> FrameIndex {
        self.num_frames
    }

    /// The valid frame set for job `id`, or `&[]` if the job is unknown
    /// (every job produced by the [TaskSet] this geometry was built
    /// from is guaranteed present with a non-empty set).
    pub fn valid_frames(&self, id: JobId) -> &[FrameIndex] {
        self.valid_frames
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn valid_frame_sets(&self) -> &BTreeMap<JobId, Vec<FrameIndex>> {
        &self.valid_frames
    }
}
