use super::engine::MaxFlowEngine;
use super::scheduler::FlowScheduler;
use crate::frame::FrameGeometry;
use crate::taskset::{JobId, Task, TaskSet};

#[test]
fn textbook_four_node_network() {
    // source=0, sink=3, two parallel paths of capacity 10 and 5.
    let mut g = MaxFlowEngine::new(4);
    g.add_edge(0, 1, 10);
    g.add_edge(1, 3, 10);
    g.add_edge(0, 2, 5);
    g.add_edge(2, 3, 5);
    assert_eq!(g.max_flow(0, 3), 15);
}

#[test]
fn bottleneck_is_the_minimum_along_the_path() {
    let mut g = MaxFlowEngine::new(3);
    g.add_edge(0, 1, 3);
    g.add_edge(1, 2, 7);
    assert_eq!(g.max_flow(0, 2), 3);
}

#[test]
fn disconnected_sink_yields_zero_flow() {
    let mut g = MaxFlowEngine::new(3);
    g.add_edge(0, 1, 5);
    assert_eq!(g.max_flow(0, 2), 0);
}

#[test]
fn bipartite_style_network_matches_capacity() {
    // source -> {1,2} -> {3,4} -> sink, mirroring the frame/job bipartite shape.
    let mut g = MaxFlowEngine::new(6);
    let (source, sink) = (0, 5);
    g.add_edge(source, 1, 4);
    g.add_edge(source, 2, 4);
    g.add_edge(1, 3, 4);
    g.add_edge(1, 4, 4);
    g.add_edge(2, 3, 4);
    g.add_edge(2, 4, 4);
    g.add_edge(3, sink, 3);
    g.add_edge(4, sink, 3);
    assert_eq!(g.max_flow(source, sink), 6);
}

fn build(spec: &[(u32, u64, u64, u64)]) -> (TaskSet, FrameGeometry) {
    let tasks = spec
        .iter()
        .map(|&(id, period, wcet, deadline)| Task::new(id, period, wcet, deadline).unwrap())
        .collect();
    let ts = TaskSet::new(tasks).unwrap();
    let geom = FrameGeometry::new(&ts).unwrap();
    (ts, geom)
}

#[test]
fn scenario_1_every_job_placed() {
    let (ts, geom) = build(&[(1, 4, 1, 4), (2, 5, 2, 5), (3, 20, 1, 20), (4, 20, 2, 20)]);
    let scheduler = FlowScheduler::new(&ts, &geom);
    let assignment = scheduler.solve().unwrap();

    let mut placed = Vec::new();
    for jobs in assignment.values() {
        placed.extend(jobs.iter().copied());
    }
    placed.sort();
    let mut expected: Vec<JobId> = ts.jobs().iter().map(|j| j.id).collect();
    expected.sort();
    assert_eq!(placed, expected);

    for (&k, jobs) in &assignment {
        let cost: u64 = jobs
            .iter()
            .map(|id| ts.task(id.task_id).unwrap().wcet)
            .sum();
        assert!(cost <= geom.frame_size(), "frame {k} overcommitted");
    }
}

#[test]
fn overutilized_set_is_infeasible() {
    let tasks = vec![Task::new(1, 3, 2, 3).unwrap(), Task::new(2, 5, 4, 5).unwrap()];
    let ts = TaskSet::new(tasks).unwrap();
    let geom = FrameGeometry::new(&ts);
    // Either frame-size derivation already fails, or it succeeds and
    // the flow stage reports infeasibility.
    match geom {
        Err(_) => {}
        Ok(geom) => {
            let scheduler = FlowScheduler::new(&ts, &geom);
            assert!(scheduler.solve().is_err());
        }
    }
}

#[test]
fn scenario_3_every_job_placed_within_capacity() {
    let (ts, geom) = build(&[(1, 4, 1, 4), (2, 6, 2, 6), (3, 12, 3, 12)]);
    let scheduler = FlowScheduler::new(&ts, &geom);
    let assignment = scheduler.solve().unwrap();
    for jobs in assignment.values() {
        let cost: u64 = jobs
            .iter()
            .map(|id| ts.task(id.task_id).unwrap().wcet)
            .sum();
        assert!(cost <= geom.frame_size());
    }
}
