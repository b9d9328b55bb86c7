//! Timestamped samples and the validated, time-ordered series built from them.

use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A time-ordered sequence of samples with finite values.
///
/// Construction sorts by timestamp (stable, so samples sharing a timestamp keep
/// their input order) and rejects `NaN`/infinite values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    /// Build a series from owned samples, sorting them if needed.
    pub fn new(mut samples: Vec<Sample>) -> Result<Self> {
        if let Some(idx) = samples.iter().position(|s| !s.value.is_finite()) {
            return Err(AnalyticsError::InvalidInput(format!(
                "value at index {} is not finite ({})",
                idx, samples[idx].value
            )));
        }

        if !is_sorted(&samples) {
            samples.sort_by_key(|s| s.timestamp);
        }

        Ok(Self { samples })
    }

    /// Build a series from borrowed samples.
    pub fn from_slice(samples: &[Sample]) -> Result<Self> {
        Self::new(samples.to_vec())
    }

    /// Build an evenly spaced series starting at `start`.
    pub fn regular(start: DateTime<Utc>, step: Duration, values: &[f64]) -> Result<Self> {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Ok(Sample::new(step_after(start, step, i)?, v)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(samples)
    }

    /// Build an hourly series starting at `start`.
    pub fn hourly(start: DateTime<Utc>, values: &[f64]) -> Result<Self> {
        Self::regular(start, Duration::hours(1), values)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Sample values in time order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Spacing between the final two samples, if positive.
    pub fn last_interval(&self) -> Option<Duration> {
        match self.samples.as_slice() {
            [.., prev, last] => {
                let delta = last.timestamp - prev.timestamp;
                (delta > Duration::zero()).then_some(delta)
            }
            _ => None,
        }
    }
}

impl AsRef<[Sample]> for SampleSeries {
    fn as_ref(&self) -> &[Sample] {
        &self.samples
    }
}

/// `start + step * count`, or `InvalidParameter` when it leaves chrono's range.
pub(crate) fn step_after(start: DateTime<Utc>, step: Duration, count: usize) -> Result<DateTime<Utc>> {
    i32::try_from(count)
        .ok()
        .and_then(|count| step.checked_mul(count))
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            AnalyticsError::InvalidParameter(format!(
                "timestamp {} steps of {} after {} is out of range",
                count, step, start
            ))
        })
}

/// Whole minutes as a `Duration`, or `InvalidParameter` naming `field`.
pub(crate) fn checked_minutes(field: &str, value: i64) -> Result<Duration> {
    Duration::try_minutes(value).ok_or_else(|| {
        AnalyticsError::InvalidParameter(format!(
            "{} of {} minutes is out of range",
            field, value
        ))
    })
}

fn is_sorted(samples: &[Sample]) -> bool {
    samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}
