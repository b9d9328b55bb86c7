//! Anomaly detection over timestamped samples.
//!
//! Four independent passes produce candidate events:
//! - IQR bounds on the whole series
//! - global z-score
//! - hour-of-day contextual z-score (optional)
//! - moving-window level shifts
//!
//! Candidates are then de-duplicated within a time window and returned in
//! timestamp order. Undersized input yields no events rather than an error.

use crate::core::{checked_minutes, Calendar, Sample, SampleSeries, Severity};
use crate::error::Result;
use crate::utils::stats::{self, summarize};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Minimum number of samples for any pass to run.
pub const MIN_SAMPLES: usize = 10;
/// Minimum number of samples for the hour-of-day pass.
pub const MIN_CONTEXTUAL_SAMPLES: usize = 50;

/// Detection sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    /// Z-score a point must exceed to be flagged.
    pub fn z_threshold(self) -> f64 {
        match self {
            Sensitivity::Low => 3.0,
            Sensitivity::Medium => 2.0,
            Sensitivity::High => 1.5,
        }
    }

    /// Multiplier applied to the IQR when building outlier bounds.
    pub fn iqr_multiplier(self) -> f64 {
        match self {
            Sensitivity::Low => 2.0,
            Sensitivity::Medium => 1.5,
            Sensitivity::High => 1.0,
        }
    }
}

/// What kind of deviation an anomaly represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Spike,
    Drop,
    Shift,
    Outlier,
}

/// A single detected anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyEvent {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub expected_value: f64,
    pub severity: Severity,
    pub kind: AnomalyKind,
    pub explanation: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub action_required: bool,
}

impl AnomalyEvent {
    fn new(
        sample: &Sample,
        expected_value: f64,
        severity: Severity,
        kind: AnomalyKind,
        confidence: f64,
        explanation: String,
    ) -> Self {
        Self {
            timestamp: sample.timestamp,
            value: sample.value,
            expected_value,
            severity,
            kind,
            explanation,
            confidence: confidence.clamp(0.0, 1.0),
            action_required: severity == Severity::Critical,
        }
    }
}

/// Configuration for anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub sensitivity: Sensitivity,
    /// Run the hour-of-day contextual pass.
    pub contextual: bool,
    /// Size of the before/after windows used by the shift pass.
    pub shift_window: usize,
    /// Percent change in window means that counts as a shift.
    pub shift_threshold_percent: f64,
    /// Percent change above which a shift is critical.
    pub shift_critical_percent: f64,
    /// Candidates closer than this to an earlier candidate are dropped.
    pub dedup_window_minutes: i64,
    /// Offset from UTC used to derive the hour of day.
    pub utc_offset_minutes: i32,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            contextual: false,
            shift_window: 12,
            shift_threshold_percent: 25.0,
            shift_critical_percent: 50.0,
            dedup_window_minutes: 60,
            utc_offset_minutes: 0,
        }
    }
}

impl AnomalyConfig {
    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Enable or disable the hour-of-day pass.
    pub fn with_contextual(mut self, contextual: bool) -> Self {
        self.contextual = contextual;
        self
    }

    pub fn with_shift_window(mut self, window: usize) -> Self {
        self.shift_window = window;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }
}

/// Stateless anomaly detector; holds only its configuration.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Run every enabled pass and return de-duplicated events sorted by time.
    pub fn detect(&self, samples: &[Sample]) -> Result<Vec<AnomalyEvent>> {
        let series = SampleSeries::from_slice(samples)?;
        self.detect_series(&series)
    }

    /// Same as [`detect`](Self::detect) for an already validated series.
    pub fn detect_series(&self, series: &SampleSeries) -> Result<Vec<AnomalyEvent>> {
        let window = checked_minutes("dedup window", self.config.dedup_window_minutes)?;
        if series.len() < MIN_SAMPLES {
            trace!(
                samples = series.len(),
                needed = MIN_SAMPLES,
                "too few samples for anomaly detection"
            );
            return Ok(Vec::new());
        }

        let mut candidates = self.iqr_anomalies(series);
        candidates.extend(self.zscore_anomalies(series));
        if self.config.contextual {
            candidates.extend(self.contextual_anomalies(series)?);
        }
        candidates.extend(self.shift_anomalies(series));

        let total = candidates.len();
        let events = deduplicate(candidates, window);

        debug!(
            samples = series.len(),
            candidates = total,
            anomalies = events.len(),
            sensitivity = ?self.config.sensitivity,
            "anomaly detection complete"
        );
        Ok(events)
    }

    /// Global z-score pass.
    pub fn zscore_anomalies(&self, series: &SampleSeries) -> Vec<AnomalyEvent> {
        if series.len() < MIN_SAMPLES {
            return Vec::new();
        }
        let Ok(summary) = summarize(&series.values()) else {
            return Vec::new();
        };
        if stats::is_negligible(summary.std_dev, summary.mean) {
            trace!("zero variance, skipping z-score pass");
            return Vec::new();
        }

        let threshold = self.config.sensitivity.z_threshold();
        series
            .samples()
            .iter()
            .filter_map(|sample| {
                let deviation = (sample.value - summary.mean).abs() / summary.std_dev;
                if deviation <= threshold {
                    return None;
                }
                let kind = if sample.value > summary.mean {
                    AnomalyKind::Spike
                } else {
                    AnomalyKind::Drop
                };
                Some(AnomalyEvent::new(
                    sample,
                    summary.mean,
                    Severity::from_sigma(deviation),
                    kind,
                    (deviation / threshold).min(1.0),
                    format!(
                        "z-score {:.2} exceeds threshold {:.1}",
                        deviation, threshold
                    ),
                ))
            })
            .collect()
    }

    /// Interquartile-range pass.
    pub fn iqr_anomalies(&self, series: &SampleSeries) -> Vec<AnomalyEvent> {
        if series.len() < MIN_SAMPLES {
            return Vec::new();
        }
        let Ok(summary) = summarize(&series.values()) else {
            return Vec::new();
        };

        let k = self.config.sensitivity.iqr_multiplier();
        let lower = summary.q1 - k * summary.iqr;
        let upper = summary.q3 + k * summary.iqr;
        let extreme_lower = summary.q1 - 3.0 * summary.iqr;
        let extreme_upper = summary.q3 + 3.0 * summary.iqr;
        let expected = (summary.q1 + summary.q3) / 2.0;

        series
            .samples()
            .iter()
            .filter(|s| s.value < lower || s.value > upper)
            .map(|sample| {
                let severity = if sample.value < extreme_lower || sample.value > extreme_upper {
                    Severity::Critical
                } else {
                    Severity::Medium
                };
                let kind = if sample.value > upper {
                    AnomalyKind::Spike
                } else {
                    AnomalyKind::Drop
                };
                AnomalyEvent::new(
                    sample,
                    expected,
                    severity,
                    kind,
                    0.85,
                    format!(
                        "IQR outlier: {:.1} outside bounds [{:.1}, {:.1}]",
                        sample.value, lower, upper
                    ),
                )
            })
            .collect()
    }

    /// Hour-of-day contextual pass: each point is judged against its own hour.
    pub fn contextual_anomalies(&self, series: &SampleSeries) -> Result<Vec<AnomalyEvent>> {
        if series.len() < MIN_CONTEXTUAL_SAMPLES {
            trace!(
                samples = series.len(),
                needed = MIN_CONTEXTUAL_SAMPLES,
                "too few samples for contextual pass"
            );
            return Ok(Vec::new());
        }
        let calendar = Calendar::with_offset_minutes(self.config.utc_offset_minutes)?;

        let mut by_hour: Vec<Vec<f64>> = vec![Vec::new(); 24];
        for sample in series.samples() {
            by_hour[calendar.hour(&sample.timestamp)].push(sample.value);
        }
        let baselines: Vec<Option<(f64, f64)>> = by_hour
            .iter()
            .map(|values| {
                if values.len() < 2 {
                    return None;
                }
                let mean = stats::mean(values);
                let std = stats::std_dev(values);
                (!stats::is_negligible(std, mean)).then_some((mean, std))
            })
            .collect();

        let threshold = self.config.sensitivity.z_threshold();
        let events = series
            .samples()
            .iter()
            .filter_map(|sample| {
                let hour = calendar.hour(&sample.timestamp);
                let (mean, std) = baselines[hour]?;
                let deviation = (sample.value - mean).abs() / std;
                if deviation <= threshold {
                    return None;
                }
                Some(AnomalyEvent::new(
                    sample,
                    mean,
                    Severity::from_sigma(deviation),
                    AnomalyKind::Outlier,
                    (deviation / threshold).min(1.0),
                    format!(
                        "{:.2} sigma from the {:02}:00 baseline of {:.1}",
                        deviation, hour, mean
                    ),
                ))
            })
            .collect();
        Ok(events)
    }

    /// Level-shift pass comparing adjacent moving windows.
    pub fn shift_anomalies(&self, series: &SampleSeries) -> Vec<AnomalyEvent> {
        let w = self.config.shift_window;
        let n = series.len();
        if w == 0 || n < w.saturating_mul(2) {
            return Vec::new();
        }

        let values = series.values();
        let mut events = Vec::new();
        for i in w..n - w {
            let before = stats::mean(&values[i - w..i]);
            let after = stats::mean(&values[i..i + w]);
            if before == 0.0 {
                continue;
            }

            let percent_change = ((after - before) / before).abs() * 100.0;
            if percent_change <= self.config.shift_threshold_percent {
                continue;
            }

            let severity = if percent_change > self.config.shift_critical_percent {
                Severity::Critical
            } else {
                Severity::High
            };
            let mut event = AnomalyEvent::new(
                &series.samples()[i],
                before,
                severity,
                AnomalyKind::Shift,
                (percent_change / 100.0).min(0.95),
                format!(
                    "trend shift: {:.1}% change in {}-sample moving average",
                    percent_change, w
                ),
            );
            event.value = after;
            events.push(event);
        }
        events
    }
}

/// Detect anomalies with the given configuration.
pub fn detect_anomalies(samples: &[Sample], config: &AnomalyConfig) -> Result<Vec<AnomalyEvent>> {
    AnomalyDetector::new(config.clone()).detect(samples)
}

/// Keep a candidate only if no earlier candidate lies strictly within `window`
/// of it, then sort the survivors by timestamp.
fn deduplicate(candidates: Vec<AnomalyEvent>, window: Duration) -> Vec<AnomalyEvent> {
    let mut kept: Vec<AnomalyEvent> = candidates
        .iter()
        .enumerate()
        .filter(|(j, event)| {
            !candidates[..*j]
                .iter()
                .any(|earlier| (earlier.timestamp - event.timestamp).abs() < window)
        })
        .map(|(_, event)| event.clone())
        .collect();
    kept.sort_by_key(|e| e.timestamp);
    kept
}
