//! Period-over-period growth and its first difference.

use crate::core::{Sample, SampleSeries};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub timestamp: DateTime<Utc>,
    pub growth_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccelerationPoint {
    pub timestamp: DateTime<Utc>,
    pub acceleration: f64,
}

/// Percent change between consecutive samples, stamped at the later one.
///
/// A non-positive previous value gives a growth of 0.
pub fn growth_rates(samples: &[Sample]) -> Result<Vec<GrowthPoint>> {
    let series = SampleSeries::from_slice(samples)?;
    Ok(series
        .samples()
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (pair[0].value, pair[1].value);
            let growth_percent = if prev > 0.0 {
                (curr - prev) / prev * 100.0
            } else {
                0.0
            };
            GrowthPoint {
                timestamp: pair[1].timestamp,
                growth_percent,
            }
        })
        .collect())
}

/// Change between consecutive growth rates.
pub fn acceleration(growth: &[GrowthPoint]) -> Vec<AccelerationPoint> {
    growth
        .windows(2)
        .map(|pair| AccelerationPoint {
            timestamp: pair[1].timestamp,
            acceleration: pair[1].growth_percent - pair[0].growth_percent,
        })
        .collect()
}
