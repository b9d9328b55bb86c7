//! Calendar helpers shared by the hour-of-day and weekday analyses.

use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

/// Wall-clock view of UTC timestamps at a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    /// Calendar at `minutes` east of UTC.
    pub fn with_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AnalyticsError::InvalidParameter(format!(
                    "utc offset of {} minutes is out of range",
                    minutes
                ))
            })?;
        Ok(Self { offset })
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Hour of day, 0-23.
    pub fn hour(&self, ts: &DateTime<Utc>) -> usize {
        ts.with_timezone(&self.offset).hour() as usize
    }

    /// Day of week, Monday = 0.
    pub fn weekday(&self, ts: &DateTime<Utc>) -> usize {
        ts.with_timezone(&self.offset)
            .weekday()
            .num_days_from_monday() as usize
    }

    /// Month of year, January = 0.
    pub fn month(&self, ts: &DateTime<Utc>) -> usize {
        ts.with_timezone(&self.offset).month0() as usize
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}
