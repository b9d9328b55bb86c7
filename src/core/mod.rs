//! Core data structures shared by every analyzer.

mod calendar;
mod sample;
mod types;

pub use calendar::Calendar;
pub use sample::{Sample, SampleSeries};
pub(crate) use sample::{checked_minutes, step_after};
pub use types::{SeasonalPeriod, Severity};
