/*! Solver B: bipartite max-flow between jobs and frames, repaired by
best-fit-descent (BFD) into a single-frame-per-job assignment.

[FlowScheduler] builds the flow network described in `spec.md` §4.3,
runs [super::engine::MaxFlowEngine], and then re-concentrates any job
whose execution time was split across multiple frames into the single
frame chosen by best-fit-descent on residual frame capacity.
*/

use std::collections::BTreeMap;

use super::engine::MaxFlowEngine;
use crate::error::SchedulingError;
use crate::frame::{FrameGeometry, FrameIndex};
use crate::taskset::{JobId, TaskSet};
use crate::time::Service;

pub type Assignment = BTreeMap<FrameIndex, Vec<JobId>>;

/// Node identity: mirrors `spec.md`'s `(-2,0)`/`(-2,1)`/`(-1,k)`/`(i,j)`
/// tagging scheme, kept only for readability; the graph itself is
/// indexed by plain `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeId {
    Source,
    Sink,
    Frame(FrameIndex),
    Job(JobId),
}

pub struct FlowScheduler<'a> {
    task_set: &'a TaskSet,
    geometry: &'a FrameGeometry,
    index_to_node: Vec<NodeId>,
    job_index: BTreeMap<JobId, usize>,
    frame_index: BTreeMap<FrameIndex, usize>,
    source: usize,
    sink: usize,
}

impl<'a> FlowScheduler<'a> {
    pub fn new(task_set: &'a TaskSet, geometry: &'a FrameGeometry) -> Self {
        let mut index_to_node = vec![NodeId::Source, NodeId::Sink];
        let mut job_index = BTreeMap::new();
        for job in task_set.jobs() {
            job_index.insert(job.id, index_to_node.len());
            index_to_node.push(NodeId::Job(job.id));
        }
        let mut frame_index = BTreeMap::new();
        for k in 1..=geometry.num_frames() {
            frame_index.insert(k, index_to_node.len());
            index_to_node.push(NodeId::Frame(k));
        }

        FlowScheduler {
            task_set,
            geometry,
            index_to_node,
            job_index,
            frame_index,
            source: 0,
            sink: 1,
        }
    }

    fn num_nodes(&self) -> usize {
        self.index_to_node.len()
    }

    /// The node identity at a given graph index, per the bijective
    /// `index <-> nodeId` map described in `spec.md` §4.3.1.
    fn node_id(&self, index: usize) -> NodeId {
        self.index_to_node[index]
    }

    /// Build the job<->frame flow network and run max-flow. Returns the
    /// engine and the total flow found; the caller checks the flow
    /// against the total work demanded.
    fn build_and_run(&self) -> (MaxFlowEngine, i64) {
        let mut engine = MaxFlowEngine::new(self.num_nodes());
        let f = self.geometry.frame_size() as i64;

        for &frame_idx in self.frame_index.values() {
            engine.add_edge(self.source, frame_idx, f);
        }
        for job in self.task_set.jobs() {
            let job_idx = self.job_index[&job.id];
            engine.add_edge(job_idx, self.sink, job.remaining as i64);
        }
        for (&job_id, &job_idx) in &self.job_index {
            for &k in self.geometry.valid_frames(job_id) {
                let frame_idx = self.frame_index[&k];
                engine.add_edge(frame_idx, job_idx, f);
            }
        }

        let max_flow = engine.max_flow(self.source, self.sink);
        log::debug!("max_flow={max_flow}");
        (engine, max_flow)
    }

    /// Identify jobs with positive incoming flow from more than one
    /// frame, and reset their flow to zero across all three edges each
    /// split traversed.
    fn reset_preempted_jobs(&self, engine: &mut MaxFlowEngine) -> Vec<JobId> {
        let mut preempted = Vec::new();
        for job in self.task_set.jobs() {
            let job_idx = self.job_index[&job.id];
            let contributing: Vec<usize> = self
                .frame_index
                .values()
                .copied()
                .filter(|&frame_idx| engine.flow(frame_idx, job_idx) > 0)
                .collect();
            if contributing.len() > 1 {
                for frame_idx in contributing {
                    let amount = engine.flow(frame_idx, job_idx);
                    engine.set_flow(self.source, frame_idx, engine.flow(self.source, frame_idx) - amount);
                    engine.set_flow(frame_idx, job_idx, 0);
                    engine.set_flow(job_idx, self.sink, engine.flow(job_idx, self.sink) - amount);
                }
                preempted.push(job.id);
            }
        }
        if !preempted.is_empty() {
            log::debug!("{} job(s) split across frames, repairing via BFD", preempted.len());
        }
        preempted
    }

    /// Best-fit-descent repair: place every preempted job, in ascending
    /// (period, task id, job id) order, into the frame with the
    /// smallest residual capacity that still has room for the job's
    /// full WCET.
    fn best_fit_descent(
        &self,
        engine: &mut MaxFlowEngine,
        mut preempted: Vec<JobId>,
    ) -> Result<(), SchedulingError> {
        preempted.sort_by_key(|id| {
            let period = self.task_set.task(id.task_id).expect("known task").period;
            (period, id.task_id, id.job_seq)
        });

        for job_id in preempted {
            let job = self.task_set.job(job_id).expect("known job");
            let job_idx = self.job_index[&job_id];
            let wcet = job.remaining as i64;

            let best_frame = self
                .geometry
                .valid_frames(job_id)
                .iter()
                .map(|&k| (k, self.frame_index[&k]))
                .map(|(k, frame_idx)| {
                    let residual = engine.residual(self.source, frame_idx);
                    (k, frame_idx, residual)
                })
                .filter(|&(_, _, residual)| residual >= wcet)
                .min_by_key(|&(k, _, residual)| (residual, k));

            let (_, frame_idx, _) = best_frame.ok_or_else(|| {
                SchedulingError::infeasible_assignment(format!(
                    "best-fit-descent found no frame with residual capacity >= {wcet} for job {job_id}"
                ))
            })?;

            engine.add_flow(self.source, frame_idx, wcet);
            engine.add_flow(frame_idx, job_idx, wcet);
            engine.add_flow(job_idx, self.sink, wcet);
        }
        Ok(())
    }

    fn read_assignment(&self, engine: &MaxFlowEngine) -> Assignment {
        let mut assignment = Assignment::new();
        for (&k, &frame_idx) in &self.frame_index {
            let mut jobs = Vec::new();
            for (&job_id, &job_idx) in &self.job_index {
                if engine.flow(frame_idx, job_idx) > 0 {
                    jobs.push(job_id);
                }
            }
            assignment.insert(k, jobs);
        }
        assignment
    }

    /// Run the full Solver B pipeline: max-flow, then BFD repair, then
    /// read off the job->frame map.
    pub fn solve(&self) -> Result<Assignment, SchedulingError> {
        let (mut engine, max_flow) = self.build_and_run();
        let total_work: Service = self.task_set.total_work();
        if max_flow != total_work as i64 {
            return Err(SchedulingError::infeasible_assignment(format!(
                "max flow {max_flow} did not saturate total work {total_work}"
            )));
        }

        let preempted = self.reset_preempted_jobs(&mut engine);
        self.best_fit_descent(&mut engine, preempted)?;

        Ok(self.read_assignment(&engine))
    }
}
