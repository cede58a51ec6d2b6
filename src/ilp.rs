/*! Solver A: binary integer program for job-to-frame assignment.

[IlpScheduler] formulates one binary variable `x_{i,j,k}` per valid
`(job, frame)` pair, an assignment-equality constraint per job, a
capacity inequality per frame, and a constant objective (feasibility
is the only target, per `spec.md` §4.4). The program is solved by
[good_lp], the same crate the pack's `scheduling-malleable-tasks`
sibling example reaches for when it needs a MIP backend. That sibling
enables `scip`/`scip_bundled`; this crate uses good_lp's `highs`
backend instead, since HiGHS actually branches on the `.binary()`
variables declared below (a pure-LP backend like `microlp` would only
solve the continuous relaxation and silently hand back fractional
"assignments").
*/

use std::collections::BTreeMap;

use good_lp::{
    constraint, default_solver, variable, variables, Expression, Solution, SolverModel, Variable,
};

use crate::error::SchedulingError;
use crate::flow::Assignment;
use crate::frame::FrameGeometry;
use crate::taskset::{JobId, TaskSet};

pub struct IlpScheduler<'a> {
    task_set: &'a TaskSet,
    geometry: &'a FrameGeometry,
}

impl<'a> IlpScheduler<'a> {
    pub fn new(task_set: &'a TaskSet, geometry: &'a FrameGeometry) -> Self {
        IlpScheduler { task_set, geometry }
    }

    /// Formulate and solve the binary assignment program. Variable
    /// generation is keyed off [FrameGeometry::valid_frames], so
    /// infeasible `(i,j,k)` triples are never materialized as
    /// variables or constraints.
    pub fn solve(&self) -> Result<Assignment, SchedulingError> {
        let mut vars = variables!();
        let mut x: BTreeMap<(JobId, u32), Variable> = BTreeMap::new();

        for job in self.task_set.jobs() {
            for &k in self.geometry.valid_frames(job.id) {
                x.insert((job.id, k), vars.add(variable().binary()));
            }
        }
        log::debug!(
            "formulated {} binary assignment variables over {} frames",
            x.len(),
            self.geometry.num_frames()
        );

        let objective = Expression::from(0.0);
        let mut problem = vars.minimise(objective).using(default_solver);

        for job in self.task_set.jobs() {
            let assignment_sum = self
                .geometry
                .valid_frames(job.id)
                .iter()
                .map(|&k| x[&(job.id, k)])
                .sum::<Expression>();
            problem = problem.with(constraint!(assignment_sum == 1.0));
        }

        for k in 1..=self.geometry.num_frames() {
            let contributors: Vec<_> = self
                .task_set
                .jobs()
                .iter()
                .filter(|job| self.geometry.valid_frames(job.id).contains(&k))
                .collect();
            if contributors.is_empty() {
                continue;
            }
            let capacity_sum = contributors
                .iter()
                .map(|job| {
                    let task = self.task_set.task(job.id.task_id).expect("known task");
                    task.wcet as f64 * x[&(job.id, k)]
                })
                .sum::<Expression>();
            problem = problem.with(constraint!(capacity_sum <= self.geometry.frame_size() as f64));
        }

        let solution = problem.solve().map_err(|e| {
            SchedulingError::infeasible_assignment(format!("ILP solver reported: {e}"))
        })?;

        let mut assignment = Assignment::new();
        for k in 1..=self.geometry.num_frames() {
            assignment.insert(k, Vec::new());
        }
        for (&(job_id, k), &var) in &x {
            if solution.value(var) > 0.5 {
                assignment.entry(k).or_default().push(job_id);
            }
        }
        Ok(assignment)
    }
}
