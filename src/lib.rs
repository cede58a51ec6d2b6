/*!
# Cyclic-Executive Scheduling

This crate derives a static cyclic-executive schedule for a set of
periodic, independent, preemptible real-time tasks: it picks a frame
size, assigns each job to a frame via either of two solvers, and
materializes the result as an ordered timeline of busy and idle
intervals.

## Scope

Given a [taskset::TaskSet], [frame::FrameGeometry] derives the
hyperperiod and frame size. [ilp::IlpScheduler] and
[flow::FlowScheduler] are two independent solvers for the resulting
job-to-frame assignment problem; either's output can be turned into a
[schedule::Schedule] by [schedule::ScheduleBuilder] and checked by
[schedule::ScheduleValidator]. [harness] adapts untyped external input
(floating-point task records) into this crate's types.

The crate does not read task sets from any particular file format and
does not run a scheduled program; it only computes the schedule.
*/

pub mod error;
pub mod flow;
pub mod frame;
pub mod harness;
pub mod ilp;
pub mod schedule;
pub mod taskset;
pub mod time;
