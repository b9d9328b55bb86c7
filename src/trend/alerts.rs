//! Threshold alerts over the most recent samples of a series.
//!
//! Three rules run over the full series once it has at least ten samples:
//! - trend change: mean of the last 7 samples against the 7 before them
//! - anomaly: deviation of the latest sample from the series mean, in
//!   population standard deviations
//! - pattern break: the latest sample falls below a fraction of the mean on
//!   a weekday
//!
//! The weekday comes from the latest sample's timestamp, never the clock.

use crate::core::{Calendar, Sample, SampleSeries, Severity};
use crate::error::Result;
use crate::utils::stats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Below this many samples no alerts are raised.
const MIN_ALERT_SAMPLES: usize = 10;
/// Length of the recent and earlier windows compared by the trend rule.
const TREND_WINDOW: usize = 7;

/// Rule that raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TrendChange,
    AnomalyDetected,
    PatternBreak,
}

/// An alert about the latest state of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    /// Timestamp of the latest sample.
    pub timestamp: DateTime<Utc>,
    pub current_value: f64,
    pub expected_value: f64,
    pub action_required: bool,
    pub recommendations: Vec<String>,
}

/// Thresholds for the alert rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// `|recent vs earlier mean change|` above this percentage raises an alert.
    pub trend_change_percent: f64,
    /// Latest-sample deviation, in standard deviations, that raises an alert.
    pub anomaly_deviation: f64,
    /// A weekday sample below `mean * pattern_break_ratio` breaks the pattern.
    pub pattern_break_ratio: f64,
    /// Offset east of UTC used to decide whether the latest sample is a weekday.
    pub utc_offset_minutes: i32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            trend_change_percent: 15.0,
            anomaly_deviation: 2.0,
            pattern_break_ratio: 0.7,
            utc_offset_minutes: 0,
        }
    }
}

impl AlertThresholds {
    pub fn with_trend_change_percent(mut self, percent: f64) -> Self {
        self.trend_change_percent = percent;
        self
    }

    pub fn with_anomaly_deviation(mut self, deviation: f64) -> Self {
        self.anomaly_deviation = deviation;
        self
    }

    pub fn with_pattern_break_ratio(mut self, ratio: f64) -> Self {
        self.pattern_break_ratio = ratio;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }
}

/// Evaluates the alert rules against a series.
#[derive(Debug, Clone, Default)]
pub struct TrendAlertMonitor {
    thresholds: AlertThresholds,
}

impl TrendAlertMonitor {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Alerts in rule order: trend change, anomaly, pattern break.
    pub fn evaluate(&self, samples: &[Sample]) -> Result<Vec<TrendAlert>> {
        let series = SampleSeries::from_slice(samples)?;
        self.evaluate_series(&series)
    }

    pub fn evaluate_series(&self, series: &SampleSeries) -> Result<Vec<TrendAlert>> {
        let calendar = Calendar::with_offset_minutes(self.thresholds.utc_offset_minutes)?;
        let Some(latest) = series.last().copied() else {
            return Ok(Vec::new());
        };
        if series.len() < MIN_ALERT_SAMPLES {
            trace!(
                samples = series.len(),
                needed = MIN_ALERT_SAMPLES,
                "too few samples for alerts"
            );
            return Ok(Vec::new());
        }

        let values = series.values();
        let mean = stats::mean(&values);
        let alerts: Vec<TrendAlert> = [
            self.trend_change(&values, &latest),
            self.anomaly(&values, mean, &latest),
            self.pattern_break(mean, &latest, &calendar),
        ]
        .into_iter()
        .flatten()
        .collect();

        debug!(
            samples = values.len(),
            alerts = alerts.len(),
            "alert evaluation complete"
        );
        Ok(alerts)
    }

    fn trend_change(&self, values: &[f64], latest: &Sample) -> Option<TrendAlert> {
        let n = values.len();
        let recent = &values[n - TREND_WINDOW..];
        let earlier = &values[n.saturating_sub(2 * TREND_WINDOW)..n - TREND_WINDOW];
        let recent_mean = stats::mean(recent);
        let earlier_mean = stats::mean(earlier);
        if earlier_mean == 0.0 {
            return None;
        }

        let change = (recent_mean - earlier_mean) / earlier_mean * 100.0;
        let magnitude = change.abs();
        if magnitude <= self.thresholds.trend_change_percent {
            return None;
        }

        let severity = if magnitude > 30.0 {
            Severity::Critical
        } else if magnitude > 20.0 {
            Severity::High
        } else {
            Severity::Medium
        };
        let (direction, recommendations) = if change > 0.0 {
            (
                "growth",
                [
                    "check what is driving the load increase",
                    "prepare additional resources",
                    "notify management",
                ],
            )
        } else {
            (
                "decline",
                [
                    "investigate the causes of the decline",
                    "check service quality",
                    "consider corrective measures",
                ],
            )
        };
        Some(TrendAlert {
            kind: AlertKind::TrendChange,
            severity,
            message: format!("significant trend change: {} of {:.1}%", direction, magnitude),
            timestamp: latest.timestamp,
            current_value: recent_mean,
            expected_value: earlier_mean,
            action_required: magnitude > 25.0,
            recommendations: recommendations.map(String::from).to_vec(),
        })
    }

    fn anomaly(&self, values: &[f64], mean: f64, latest: &Sample) -> Option<TrendAlert> {
        let std_dev = stats::std_dev(values);
        if stats::is_negligible(std_dev, mean) {
            return None;
        }
        let deviations = (latest.value - mean).abs() / std_dev;
        if deviations <= self.thresholds.anomaly_deviation {
            return None;
        }

        let severity = if deviations > 4.0 {
            Severity::Critical
        } else if deviations > 3.0 {
            Severity::High
        } else {
            Severity::Medium
        };
        Some(TrendAlert {
            kind: AlertKind::AnomalyDetected,
            severity,
            message: format!(
                "anomaly detected: value {:.2} deviates by {:.1} standard deviations",
                latest.value, deviations
            ),
            timestamp: latest.timestamp,
            current_value: latest.value,
            expected_value: mean,
            action_required: deviations > 3.0,
            recommendations: [
                "check data quality",
                "investigate external factors",
                "consider adjusting the forecast",
            ]
            .map(String::from)
            .to_vec(),
        })
    }

    fn pattern_break(&self, mean: f64, latest: &Sample, calendar: &Calendar) -> Option<TrendAlert> {
        // Saturday = 5, Sunday = 6
        let weekend = calendar.weekday(&latest.timestamp) >= 5;
        if weekend || latest.value >= mean * self.thresholds.pattern_break_ratio {
            return None;
        }
        Some(TrendAlert {
            kind: AlertKind::PatternBreak,
            severity: Severity::Medium,
            message: "pattern break: low activity on a working day".to_string(),
            timestamp: latest.timestamp,
            current_value: latest.value,
            expected_value: mean,
            action_required: true,
            recommendations: [
                "check that the system is operating",
                "rule out technical problems",
                "contact the operations team",
            ]
            .map(String::from)
            .to_vec(),
        })
    }
}

/// Evaluate the alert rules with the given thresholds.
pub fn trend_alerts(samples: &[Sample], thresholds: &AlertThresholds) -> Result<Vec<TrendAlert>> {
    TrendAlertMonitor::new(thresholds.clone()).evaluate(samples)
}
