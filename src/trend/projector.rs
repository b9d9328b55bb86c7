//! Regression-based trend metrics and short-horizon projection.

use crate::core::{step_after, Sample, SampleSeries};
use crate::error::{AnalyticsError, Result};
use crate::utils::regression::{linear_fit, quadratic_fit, LinearFit, QuadraticFit};
use crate::utils::stats;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Quadratic coefficient above which the curved fit drives the projection.
const CURVATURE_THRESHOLD: f64 = 0.001;
/// Confidence lost per projected step.
const CONFIDENCE_DECAY: f64 = 0.02;
const MIN_CONFIDENCE: f64 = 0.1;

/// Direction of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// `Stable` when `|rate_percent| < stable_band`, otherwise by sign.
    pub fn from_rate(rate_percent: f64, stable_band: f64) -> Self {
        if rate_percent.abs() < stable_band {
            TrendDirection::Stable
        } else if rate_percent > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        f.write_str(name)
    }
}

/// Summary statistics of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetrics {
    /// Linear slope as a percentage of the series mean.
    pub growth_rate_percent: f64,
    /// Population standard deviation of the values.
    pub volatility: f64,
    pub trend_direction: TrendDirection,
    /// R² of the linear fit.
    pub forecast_accuracy: f64,
}

/// One projected future value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub confidence: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Metrics, projections and the fits they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub metrics: TrendMetrics,
    pub projections: Vec<ProjectionPoint>,
    pub linear: LinearFit,
    pub quadratic: QuadraticFit,
}

/// Configuration for trend projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Number of future steps to project.
    pub horizon: usize,
    /// Spacing of projected points. Defaults to the last sample interval.
    pub step_seconds: Option<i64>,
    /// `|growth rate|` below this percentage counts as stable.
    pub stable_band_percent: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon: 24,
            step_seconds: None,
            stable_band_percent: 0.5,
        }
    }
}

impl ProjectionConfig {
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step_seconds = Some(step.num_seconds());
        self
    }

    pub fn with_stable_band_percent(mut self, band: f64) -> Self {
        self.stable_band_percent = band;
        self
    }
}

/// Fits linear and quadratic trends and projects them forward.
#[derive(Debug, Clone, Default)]
pub struct TrendProjector {
    config: ProjectionConfig,
}

impl TrendProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Analyze and project. Returns `Ok(None)` with fewer than two samples.
    pub fn project(&self, samples: &[Sample]) -> Result<Option<TrendAnalysis>> {
        let series = SampleSeries::from_slice(samples)?;
        self.project_series(&series)
    }

    pub fn project_series(&self, series: &SampleSeries) -> Result<Option<TrendAnalysis>> {
        let step = self.step(series)?;
        let values = series.values();
        let (Some(linear), Some(last)) = (linear_fit(&values), series.last()) else {
            trace!(samples = values.len(), "too few samples for trend projection");
            return Ok(None);
        };
        let quadratic = quadratic_fit(&values);

        let metrics = self.metrics(&values, &linear);
        let last_index = values.len() - 1;
        let projections = (1..=self.config.horizon)
            .map(|i| {
                let x = (last_index + i) as f64;
                let raw = if quadratic.a.abs() > CURVATURE_THRESHOLD {
                    quadratic.predict(x)
                } else {
                    linear.predict(x)
                };
                let value = raw.max(0.0);
                let confidence =
                    (metrics.forecast_accuracy - i as f64 * CONFIDENCE_DECAY).max(MIN_CONFIDENCE);
                let margin = metrics.volatility * (1.0 - confidence) * 2.0;
                Ok(ProjectionPoint {
                    timestamp: step_after(last.timestamp, step, i)?,
                    value,
                    confidence,
                    lower: (value - margin).max(0.0),
                    upper: value + margin,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            samples = values.len(),
            horizon = projections.len(),
            growth_rate = metrics.growth_rate_percent,
            direction = %metrics.trend_direction,
            "trend projection complete"
        );

        Ok(Some(TrendAnalysis {
            metrics,
            projections,
            linear,
            quadratic,
        }))
    }

    fn metrics(&self, values: &[f64], linear: &LinearFit) -> TrendMetrics {
        let mean = stats::mean(values);
        let growth_rate_percent = stats::ratio_or(linear.slope, mean, 0.0) * 100.0;
        TrendMetrics {
            growth_rate_percent,
            volatility: stats::std_dev(values),
            trend_direction: TrendDirection::from_rate(
                growth_rate_percent,
                self.config.stable_band_percent,
            ),
            forecast_accuracy: linear.r_squared,
        }
    }

    fn step(&self, series: &SampleSeries) -> Result<Duration> {
        match self.config.step_seconds {
            Some(secs) if secs > 0 => Duration::try_seconds(secs).ok_or_else(|| {
                AnalyticsError::InvalidParameter(format!(
                    "projection step of {} seconds is out of range",
                    secs
                ))
            }),
            Some(secs) => Err(AnalyticsError::InvalidParameter(format!(
                "projection step must be positive, got {} seconds",
                secs
            ))),
            None => Ok(series.last_interval().unwrap_or_else(|| Duration::hours(1))),
        }
    }
}

/// Project with the given configuration.
pub fn project_trend(samples: &[Sample], config: &ProjectionConfig) -> Result<Option<TrendAnalysis>> {
    TrendProjector::new(config.clone()).project(samples)
}
