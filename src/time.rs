// We use a simple discrete time model
pub type Time = u64;

// Syntactic sugar to give a hint as whether a time value denotes an interval length
// or a specific point in time.
pub type Instant = Time;
pub type Duration = Time;

/// Worst-case cumulative processor demand, in the same integer unit as
/// [Duration]. A separate alias from `Duration` because a quantity of
/// service is conceptually distinct from a span of time, even though
/// both are plain counts of time units here.
pub type Service = Time;

/// A point in the continuous schedule timeline. Frame boundaries,
/// releases, and deadlines are always integers, but interval endpoints
/// admit fractional values so that a scaled (originally non-integer)
/// WCET can be unscaled back into the timeline without rounding.
pub type TimelineInstant = f64;
