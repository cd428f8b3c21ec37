//! Daily UTC-midnight trigger scheduling.
//!
//! Computes the strictly-forward next midnight boundary, arms a one-shot
//! timer, invokes the firing action, and rearms from the current time so the
//! cadence never drifts with run duration.

mod service;

pub use service::{ms_until_next_midnight, Clock, DailyScheduler, SchedulerState, SystemClock};
