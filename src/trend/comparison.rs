//! Comparison of a series against a baseline series.

use crate::core::{Sample, SampleSeries};
use crate::error::Result;
use crate::trend::TrendDirection;
use crate::utils::stats;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `|first-to-last growth|` below this percentage counts as stable.
const STABLE_GROWTH_PERCENT: f64 = 1.0;

/// How a series relates to a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesComparison {
    /// Pearson correlation with the baseline over their common prefix.
    pub correlation: f64,
    /// Difference of means relative to the baseline mean, in percent.
    pub relative_difference_percent: f64,
    /// Growth of the compared series from its first to its last value, in percent.
    pub growth_percent: f64,
    pub volatility: f64,
    pub trend_direction: TrendDirection,
}

/// Compare `other` against `baseline`.
pub fn compare(baseline: &[Sample], other: &[Sample]) -> Result<SeriesComparison> {
    let baseline = SampleSeries::from_slice(baseline)?.values();
    let values = SampleSeries::from_slice(other)?.values();

    let baseline_mean = stats::mean(&baseline);
    let relative_difference_percent = if baseline_mean > 0.0 {
        (stats::mean(&values) - baseline_mean) / baseline_mean * 100.0
    } else {
        0.0
    };

    let growth_percent = match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if values.len() >= 2 && first > 0.0 => {
            (last - first) / first * 100.0
        }
        _ => 0.0,
    };

    let comparison = SeriesComparison {
        correlation: stats::pearson_correlation(&baseline, &values),
        relative_difference_percent,
        growth_percent,
        volatility: if values.len() >= 2 {
            stats::std_dev(&values)
        } else {
            0.0
        },
        trend_direction: TrendDirection::from_rate(growth_percent, STABLE_GROWTH_PERCENT),
    };
    debug!(
        baseline = baseline.len(),
        other = values.len(),
        correlation = comparison.correlation,
        "series comparison complete"
    );
    Ok(comparison)
}
