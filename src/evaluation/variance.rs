//! Forecast-versus-actual variance analysis.
//!
//! Actual samples are paired with forecast samples close in time, and the
//! pairs are summarised with the usual error metrics plus a breakdown by
//! accuracy class and by part of the day.

use crate::core::{checked_minutes, Calendar, Sample, SampleSeries};
use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Accuracy class of a single forecast, by absolute percent error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyClass {
    /// Under 5%.
    Excellent,
    /// 5% to under 15%.
    Good,
    /// 15% to under 30%.
    Fair,
    Poor,
}

impl AccuracyClass {
    pub fn from_percent_error(abs_percent: f64) -> Self {
        if abs_percent < 5.0 {
            AccuracyClass::Excellent
        } else if abs_percent < 15.0 {
            AccuracyClass::Good
        } else if abs_percent < 30.0 {
            AccuracyClass::Fair
        } else {
            AccuracyClass::Poor
        }
    }
}

/// Six-hour slice of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPart {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl DayPart {
    const ALL: [DayPart; 4] = [
        DayPart::Night,
        DayPart::Morning,
        DayPart::Afternoon,
        DayPart::Evening,
    ];

    pub fn from_hour(hour: usize) -> Self {
        match hour {
            0..=5 => DayPart::Night,
            6..=11 => DayPart::Morning,
            12..=17 => DayPart::Afternoon,
            _ => DayPart::Evening,
        }
    }
}

/// An actual sample paired with its forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariancePoint {
    pub timestamp: DateTime<Utc>,
    pub actual: f64,
    pub forecast: f64,
    /// `actual - forecast`.
    pub variance: f64,
    /// Variance relative to the forecast, 0 when the forecast is not positive.
    pub variance_percent: f64,
    pub accuracy: AccuracyClass,
    pub explanation: String,
}

/// Number of points per accuracy class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccuracyDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl AccuracyDistribution {
    fn record(&mut self, class: AccuracyClass) {
        match class {
            AccuracyClass::Excellent => self.excellent += 1,
            AccuracyClass::Good => self.good += 1,
            AccuracyClass::Fair => self.fair += 1,
            AccuracyClass::Poor => self.poor += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.poor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPartError {
    pub day_part: DayPart,
    pub points: usize,
    pub mean_absolute_percent_error: f64,
}

/// Summary of forecast accuracy over aligned points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceReport {
    pub points: Vec<VariancePoint>,
    pub mean_absolute_error: f64,
    /// Over points with a positive forecast; 0 if there are none.
    pub mean_absolute_percentage_error: f64,
    pub root_mean_square_error: f64,
    /// Mean signed variance. Positive means the forecast ran low.
    pub bias: f64,
    /// Percentage of points within the accuracy tolerance.
    pub accuracy_score: f64,
    pub distribution: AccuracyDistribution,
    /// Only day parts that contain at least one point.
    pub day_parts: Vec<DayPartError>,
}

/// Configuration for variance analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceConfig {
    /// Maximum distance, exclusive, between an actual and its forecast.
    pub tolerance_minutes: i64,
    /// `|variance_percent|` at or below this counts towards the accuracy score.
    pub accurate_within_percent: f64,
    pub utc_offset_minutes: i32,
}

impl Default for VarianceConfig {
    fn default() -> Self {
        Self {
            tolerance_minutes: 30,
            accurate_within_percent: 10.0,
            utc_offset_minutes: 0,
        }
    }
}

impl VarianceConfig {
    pub fn with_tolerance_minutes(mut self, minutes: i64) -> Self {
        self.tolerance_minutes = minutes;
        self
    }

    pub fn with_accurate_within_percent(mut self, percent: f64) -> Self {
        self.accurate_within_percent = percent;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }
}

/// Pair actual samples with forecasts and summarise the errors.
///
/// Returns `Ok(None)` when no actual sample has a forecast within tolerance.
pub fn analyze_variance(
    actual: &[Sample],
    forecast: &[Sample],
    config: &VarianceConfig,
) -> Result<Option<VarianceReport>> {
    if config.tolerance_minutes <= 0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "alignment tolerance must be positive, got {} minutes",
            config.tolerance_minutes
        )));
    }
    let tolerance = checked_minutes("alignment tolerance", config.tolerance_minutes)?;
    let calendar = Calendar::with_offset_minutes(config.utc_offset_minutes)?;
    let actual = SampleSeries::from_slice(actual)?;
    let forecast = SampleSeries::from_slice(forecast)?;

    let points = align(&actual, &forecast, tolerance);
    if points.is_empty() {
        trace!(
            actual = actual.len(),
            forecast = forecast.len(),
            "no forecast aligned with any actual sample"
        );
        return Ok(None);
    }
    let n = points.len() as f64;

    // MAE
    let mean_absolute_error = points.iter().map(|p| p.variance.abs()).sum::<f64>() / n;

    // MAPE
    let percent_errors: Vec<f64> = points
        .iter()
        .filter(|p| p.forecast > 0.0)
        .map(|p| p.variance_percent.abs())
        .collect();
    let mean_absolute_percentage_error = if percent_errors.is_empty() {
        0.0
    } else {
        percent_errors.iter().sum::<f64>() / percent_errors.len() as f64
    };

    // RMSE
    let root_mean_square_error =
        (points.iter().map(|p| p.variance.powi(2)).sum::<f64>() / n).sqrt();

    let bias = points.iter().map(|p| p.variance).sum::<f64>() / n;

    let accurate = points
        .iter()
        .filter(|p| p.variance_percent.abs() <= config.accurate_within_percent)
        .count();
    let accuracy_score = accurate as f64 / n * 100.0;

    let mut distribution = AccuracyDistribution::default();
    points.iter().for_each(|p| distribution.record(p.accuracy));

    let day_parts = DayPart::ALL
        .iter()
        .filter_map(|&part| {
            let errors: Vec<f64> = points
                .iter()
                .filter(|p| DayPart::from_hour(calendar.hour(&p.timestamp)) == part)
                .map(|p| p.variance_percent.abs())
                .collect();
            (!errors.is_empty()).then(|| DayPartError {
                day_part: part,
                points: errors.len(),
                mean_absolute_percent_error: errors.iter().sum::<f64>() / errors.len() as f64,
            })
        })
        .collect();

    debug!(
        aligned = points.len(),
        mape = mean_absolute_percentage_error,
        accuracy_score,
        "variance analysis complete"
    );

    Ok(Some(VarianceReport {
        points,
        mean_absolute_error,
        mean_absolute_percentage_error,
        root_mean_square_error,
        bias,
        accuracy_score,
        distribution,
        day_parts,
    }))
}

/// Pair each actual with the first forecast strictly within `tolerance`.
fn align(actual: &SampleSeries, forecast: &SampleSeries, tolerance: Duration) -> Vec<VariancePoint> {
    actual
        .samples()
        .iter()
        .filter_map(|a| {
            forecast
                .samples()
                .iter()
                .find(|f| (f.timestamp - a.timestamp).abs() < tolerance)
                .map(|f| variance_point(a, f))
        })
        .collect()
}

fn variance_point(actual: &Sample, forecast: &Sample) -> VariancePoint {
    let variance = actual.value - forecast.value;
    let variance_percent = if forecast.value > 0.0 {
        variance / forecast.value * 100.0
    } else {
        0.0
    };
    let direction = if variance > 0.0 { "above" } else { "below" };
    VariancePoint {
        timestamp: actual.timestamp,
        actual: actual.value,
        forecast: forecast.value,
        variance,
        variance_percent,
        accuracy: AccuracyClass::from_percent_error(variance_percent.abs()),
        explanation: format!(
            "actual {} forecast by {:.1}%",
            direction,
            variance_percent.abs()
        ),
    }
}
