use super::builder::ScheduleBuilder;
use super::validator::ScheduleValidator;
use super::Interval;
use crate::flow::FlowScheduler;
use crate::frame::FrameGeometry;
use crate::taskset::{Task, TaskSet};
use crate::time::TimelineInstant;

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
fn schedule_covers_whole_hyperperiod_with_no_gaps_or_overlaps() {
    let (ts, geom) = build(&[(1, 4, 1, 4), (2, 5, 2, 5), (3, 20, 1, 20), (4, 20, 2, 20)]);
    let assignment = FlowScheduler::new(&ts, &geom).solve().unwrap();
    let end_time = geom.hyperperiod_value() as TimelineInstant;
    let schedule = ScheduleBuilder::new(&ts, &geom)
        .build(&assignment, 0.0, end_time)
        .unwrap();

    assert_eq!(schedule.start_time, 0.0);
    assert_eq!(schedule.end_time, end_time);

    let mut cursor = 0.0;
    for interval in &schedule.intervals {
        assert_eq!(interval.start_time, cursor);
        assert!(interval.end_time >= interval.start_time);
        cursor = interval.end_time;
    }
    assert_eq!(cursor, end_time);
}

#[test]
fn every_job_appears_exactly_once_as_a_completed_busy_interval() {
    let (ts, geom) = build(&[(1, 3, 1, 3), (2, 6, 2, 6)]);
    let assignment = FlowScheduler::new(&ts, &geom).solve().unwrap();
    let end_time = geom.hyperperiod_value() as TimelineInstant;
    let schedule = ScheduleBuilder::new(&ts, &geom)
        .build(&assignment, 0.0, end_time)
        .unwrap();

    let mut seen: Vec<_> = schedule
        .intervals
        .iter()
        .filter_map(Interval::job_id)
        .collect();
    seen.sort();
    let mut expected: Vec<_> = ts.jobs().iter().map(|j| j.id).collect();
    expected.sort();
    assert_eq!(seen, expected);

    for interval in &schedule.intervals {
        if interval.job_id().is_some() {
            assert!(interval.job_completed);
        }
    }
}

#[test]
fn jobs_within_a_frame_dispatch_in_ascending_task_id_order() {
    let (ts, geom) = build(&[(1, 4, 1, 4), (2, 4, 1, 4)]);
    let assignment = FlowScheduler::new(&ts, &geom).solve().unwrap();
    let end_time = geom.hyperperiod_value() as TimelineInstant;
    let schedule = ScheduleBuilder::new(&ts, &geom)
        .build(&assignment, 0.0, end_time)
        .unwrap();
    let f = geom.frame_size() as TimelineInstant;

    let mut by_frame: std::collections::BTreeMap<u64, Vec<u32>> = std::collections::BTreeMap::new();
    for interval in &schedule.intervals {
        if let Some(job_id) = interval.job_id() {
            let frame = (interval.start_time / f) as u64;
            by_frame.entry(frame).or_default().push(job_id.task_id);
        }
    }
    for task_ids in by_frame.values() {
        let mut sorted = task_ids.clone();
        sorted.sort();
        assert_eq!(*task_ids, sorted);
    }
}

#[test]
fn final_interval_extends_to_the_latest_deadline_when_it_exceeds_end_time() {
    let (ts, geom) = build(&[(1, 4, 1, 4)]);
    let assignment = FlowScheduler::new(&ts, &geom).solve().unwrap();
    // Ask for a schedule ending well before the latest job deadline.
    let schedule = ScheduleBuilder::new(&ts, &geom)
        .build(&assignment, 0.0, 1.0)
        .unwrap();
    let latest_deadline = ts
        .jobs()
        .iter()
        .map(|j| j.deadline as TimelineInstant)
        .fold(0.0, TimelineInstant::max);
    assert_eq!(schedule.end_time, latest_deadline);
    assert_eq!(schedule.intervals.last().unwrap().end_time, latest_deadline);
}

#[test]
fn solved_schedule_passes_validation() {
    let (ts, geom) = build(&[(1, 4, 1, 4), (2, 5, 2, 5), (3, 20, 1, 20), (4, 20, 2, 20)]);
    let assignment = FlowScheduler::new(&ts, &geom).solve().unwrap();
    let end_time = geom.hyperperiod_value() as TimelineInstant;
    let schedule = ScheduleBuilder::new(&ts, &geom)
        .build(&assignment, 0.0, end_time)
        .unwrap();
    assert!(ScheduleValidator::new(&ts).validate(&schedule));
}

#[test]
fn detects_job_with_wrong_executed_time() {
    let (ts, geom) = build(&[(1, 4, 1, 4)]);
    let assignment = FlowScheduler::new(&ts, &geom).solve().unwrap();
    let end_time = geom.hyperperiod_value() as TimelineInstant;
    let mut schedule = ScheduleBuilder::new(&ts, &geom)
        .build(&assignment, 0.0, end_time)
        .unwrap();
    for interval in &mut schedule.intervals {
        if interval.job_id().is_some() {
            interval.end_time += 10.0;
        }
    }
    assert!(!ScheduleValidator::new(&ts).check_wcet(&schedule));
}

#[test]
fn detects_deadline_miss() {
    let (ts, geom) = build(&[(1, 4, 1, 4)]);
    let assignment = FlowScheduler::new(&ts, &geom).solve().unwrap();
    let end_time = geom.hyperperiod_value() as TimelineInstant;
    let mut schedule = ScheduleBuilder::new(&ts, &geom)
        .build(&assignment, 0.0, end_time)
        .unwrap();
    for interval in &mut schedule.intervals {
        if interval.job_id().is_some() {
            interval.start_time += 100.0;
            interval.end_time += 100.0;
        }
    }
    assert!(!ScheduleValidator::new(&ts).check_deadlines(&schedule));
}
