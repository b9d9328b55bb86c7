//! Recurring pattern recognition.
//!
//! Four independent passes contribute patterns: Fourier amplitudes,
//! autocorrelation, a linear trend test and peak spacing. Results are
//! concatenated and ordered by confidence.

use super::spectrum::{amplitude_spectrum, autocorrelation_function};
use crate::core::{Sample, SampleSeries, SeasonalPeriod};
use crate::error::Result;
use crate::utils::{linear_fit, stats};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Broad category of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Cyclical,
    Seasonal,
    Trending,
    Irregular,
}

/// A recurring structure found in a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPattern {
    pub id: String,
    pub kind: PatternKind,
    /// Cycle length in hours; 0 for trends.
    pub period_hours: f64,
    /// Calendar cycle matched by `period_hours`, if any.
    pub seasonal_period: Option<SeasonalPeriod>,
    pub strength: f64,
    pub confidence: f64,
    pub description: String,
    pub start_index: usize,
    pub end_index: usize,
    pub peaks: Vec<usize>,
    pub valleys: Vec<usize>,
    /// Planning hints derived from the kind, period and strength.
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl DetectedPattern {
    fn with_recommendations(mut self) -> Self {
        let mut hints: Vec<&str> = Vec::new();
        if self.kind == PatternKind::Seasonal {
            if (22.0..=26.0).contains(&self.period_hours) {
                hints.push("account for daily peaks when planning shifts");
                hints.push("align schedules with the daily fluctuation");
            }
            if (160.0..=180.0).contains(&self.period_hours) {
                hints.push("plan weekly resources around the detected cycle");
                hints.push("adapt work rosters to the weekly seasonality");
            }
        }
        if self.kind == PatternKind::Trending {
            if self.description.starts_with("upward") {
                hints.push("prepare for increasing load");
                hints.push("consider increasing staff");
            } else {
                hints.push("analyze the causes of declining activity");
                hints.push("optimize resource usage");
            }
        }
        if self.strength > 0.8 {
            hints.push("high predictability: use it for precise planning");
        }
        self.recommendations = hints.into_iter().map(String::from).collect();
        self
    }
}

/// Configuration for pattern recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Below this many samples no patterns are reported.
    pub min_pattern_length: usize,
    /// Minimum confidence for Fourier and autocorrelation patterns.
    pub confidence_threshold: f64,
    /// Half-width of the neighbourhood a peak must dominate.
    pub min_peak_distance: usize,
    /// Largest autocorrelation lag considered (also capped at n/2).
    pub max_lag: usize,
    /// Hours between consecutive samples.
    pub sample_interval_hours: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_pattern_length: 24,
            confidence_threshold: 0.6,
            min_peak_distance: 3,
            max_lag: 168,
            sample_interval_hours: 1.0,
        }
    }
}

impl PatternConfig {
    pub fn with_min_pattern_length(mut self, len: usize) -> Self {
        self.min_pattern_length = len;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_peak_distance(mut self, distance: usize) -> Self {
        self.min_peak_distance = distance;
        self
    }

    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = max_lag;
        self
    }

    pub fn with_sample_interval_hours(mut self, hours: f64) -> Self {
        self.sample_interval_hours = hours;
        self
    }
}

/// Stateless pattern analyzer.
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    config: PatternConfig,
}

impl PatternAnalyzer {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Run all passes and return patterns sorted by confidence, highest first.
    pub fn analyze(&self, samples: &[Sample]) -> Result<Vec<DetectedPattern>> {
        let series = SampleSeries::from_slice(samples)?;
        Ok(self.analyze_series(&series))
    }

    pub fn analyze_series(&self, series: &SampleSeries) -> Vec<DetectedPattern> {
        let n = series.len();
        if n < self.config.min_pattern_length || n == 0 {
            trace!(
                samples = n,
                needed = self.config.min_pattern_length,
                "too few samples for pattern recognition"
            );
            return Vec::new();
        }

        let values = series.values();
        let mut patterns = self.fourier_patterns(&values);
        patterns.extend(self.autocorrelation_patterns(&values));
        patterns.extend(self.trend_pattern(&values));
        patterns.extend(self.peak_pattern(&values));

        patterns.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        debug!(samples = n, patterns = patterns.len(), "pattern recognition complete");
        patterns
    }

    /// Dominant frequencies of the amplitude spectrum.
    pub fn fourier_patterns(&self, values: &[f64]) -> Vec<DetectedPattern> {
        let mut spectrum = amplitude_spectrum(values);
        spectrum.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
        let Some(max_amplitude) = spectrum.first().map(|l| l.amplitude) else {
            return Vec::new();
        };
        let level = stats::mean(values).abs().max(stats::std_dev(values));
        if stats::is_negligible(max_amplitude, level) {
            trace!("flat spectrum, skipping Fourier pass");
            return Vec::new();
        }

        spectrum
            .iter()
            .filter(|line| line.amplitude > 0.1 * max_amplitude)
            .take(5)
            .enumerate()
            .filter_map(|(rank, line)| {
                let strength = line.amplitude / max_amplitude;
                let confidence = (strength * 2.0).min(0.95);
                if confidence < self.config.confidence_threshold {
                    return None;
                }
                let period_hours = line.period * self.config.sample_interval_hours;
                let seasonal_period = SeasonalPeriod::classify_hours(period_hours);
                let description = match seasonal_period {
                    Some(SeasonalPeriod::Daily) => "daily cycle (24 hours)".to_string(),
                    Some(SeasonalPeriod::Weekly) => "weekly cycle (168 hours)".to_string(),
                    Some(SeasonalPeriod::Monthly) => "monthly cycle (~30 days)".to_string(),
                    _ => format!("cyclical pattern ({:.1} hours)", period_hours),
                };
                Some(self.periodic(
                    format!("fft_{}", rank),
                    period_hours,
                    seasonal_period,
                    strength,
                    confidence,
                    description,
                    values.len(),
                ))
            })
            .collect()
    }

    /// Strongest positive autocorrelation lags.
    pub fn autocorrelation_patterns(&self, values: &[f64]) -> Vec<DetectedPattern> {
        let max_lag = self.config.max_lag.min(values.len() / 2);
        let mut lags: Vec<(usize, f64)> = autocorrelation_function(values, max_lag)
            .into_iter()
            .filter(|(_, corr)| *corr > 0.3)
            .collect();
        lags.sort_by(|a, b| b.1.total_cmp(&a.1));

        lags.iter()
            .take(3)
            .enumerate()
            .filter_map(|(rank, &(lag, corr))| {
                let confidence = corr.min(1.0);
                if confidence < self.config.confidence_threshold {
                    return None;
                }
                let period_hours = lag as f64 * self.config.sample_interval_hours;
                let seasonal_period = SeasonalPeriod::classify_hours(period_hours);
                let description = match seasonal_period {
                    Some(SeasonalPeriod::Daily) => "daily correlation".to_string(),
                    Some(SeasonalPeriod::Weekly) => "weekly correlation".to_string(),
                    Some(SeasonalPeriod::Monthly) => "monthly correlation".to_string(),
                    _ => format!("periodic correlation ({} h)", period_hours),
                };
                Some(self.periodic(
                    format!("autocorr_{}", rank),
                    period_hours,
                    seasonal_period,
                    confidence,
                    confidence,
                    description,
                    values.len(),
                ))
            })
            .collect()
    }

    /// Linear trend, reported when the slope exceeds 1% of the mean per sample.
    pub fn trend_pattern(&self, values: &[f64]) -> Option<DetectedPattern> {
        let fit = linear_fit(values)?;
        let mean = stats::mean(values);
        if mean == 0.0 {
            return None;
        }
        let slope_percent = (fit.slope / mean).abs() * 100.0;
        if slope_percent <= 1.0 {
            return None;
        }

        let description = if fit.slope > 0.0 {
            "upward trend"
        } else {
            "downward trend"
        };
        Some(DetectedPattern {
            id: "trend_main".to_string(),
            kind: PatternKind::Trending,
            period_hours: 0.0,
            seasonal_period: None,
            strength: (slope_percent / 10.0).min(1.0),
            confidence: 0.8,
            description: description.to_string(),
            start_index: 0,
            end_index: values.len() - 1,
            peaks: Vec::new(),
            valleys: Vec::new(),
            recommendations: Vec::new(),
        }
        .with_recommendations())
    }

    /// Regularly spaced local maxima.
    pub fn peak_pattern(&self, values: &[f64]) -> Option<DetectedPattern> {
        let (peaks, valleys) = find_peaks_and_valleys(values, self.config.min_peak_distance);
        if peaks.len() <= 2 || valleys.len() <= 2 {
            return None;
        }

        let spacing_sum: usize = peaks.windows(2).map(|w| w[1] - w[0]).sum();
        let avg_spacing =
            spacing_sum as f64 / (peaks.len() - 1) as f64 * self.config.sample_interval_hours;
        if !(6.0..=48.0).contains(&avg_spacing) {
            return None;
        }

        Some(DetectedPattern {
            id: "peaks_valleys".to_string(),
            kind: PatternKind::Cyclical,
            period_hours: avg_spacing,
            seasonal_period: SeasonalPeriod::classify_hours(avg_spacing),
            strength: 0.7,
            confidence: 0.75,
            description: format!("cyclical peaks (every {:.1} h)", avg_spacing),
            start_index: 0,
            end_index: values.len() - 1,
            peaks,
            valleys,
            recommendations: Vec::new(),
        }
        .with_recommendations())
    }

    fn periodic(
        &self,
        id: String,
        period_hours: f64,
        seasonal_period: Option<SeasonalPeriod>,
        strength: f64,
        confidence: f64,
        description: String,
        len: usize,
    ) -> DetectedPattern {
        let kind = if seasonal_period.is_some() {
            PatternKind::Seasonal
        } else {
            PatternKind::Cyclical
        };
        DetectedPattern {
            id,
            kind,
            period_hours,
            seasonal_period,
            strength,
            confidence,
            description,
            start_index: 0,
            end_index: len.saturating_sub(1),
            peaks: Vec::new(),
            valleys: Vec::new(),
            recommendations: Vec::new(),
        }
        .with_recommendations()
    }
}

/// Recognize patterns with the given configuration.
pub fn detect_patterns(samples: &[Sample], config: &PatternConfig) -> Result<Vec<DetectedPattern>> {
    PatternAnalyzer::new(config.clone()).analyze(samples)
}

/// Indices strictly greater (peaks) or strictly less (valleys) than every
/// other point within `±min_distance`. Points too close to either end are
/// never reported.
pub fn find_peaks_and_valleys(values: &[f64], min_distance: usize) -> (Vec<usize>, Vec<usize>) {
    let n = values.len();
    let mut peaks = Vec::new();
    let mut valleys = Vec::new();
    if min_distance == 0 || n <= min_distance.saturating_mul(2) {
        return (peaks, valleys);
    }

    for i in min_distance..n - min_distance {
        let window = (i - min_distance..=i + min_distance).filter(|&j| j != i);
        let (mut is_peak, mut is_valley) = (true, true);
        for j in window {
            if values[j] >= values[i] {
                is_peak = false;
            }
            if values[j] <= values[i] {
                is_valley = false;
            }
        }
        if is_peak {
            peaks.push(i);
        }
        if is_valley {
            valleys.push(i);
        }
    }
    (peaks, valleys)
}
