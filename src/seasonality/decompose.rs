//! Classical seasonal decomposition into trend, seasonal and residual parts.
//!
//! Three strategies share one result type:
//! - additive: `value = trend + seasonal + residual`
//! - multiplicative: `value = trend * seasonal * residual`, reported as
//!   deviations from 1 so every strategy can be read the same way
//! - STL-like: additive with an uncentered seasonal template and a second,
//!   shorter trend pass over the seasonally adjusted series

use crate::core::{Sample, SampleSeries};
use crate::error::{AnalyticsError, Result};
use crate::utils::stats;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Decomposition strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionMethod {
    #[default]
    Additive,
    Multiplicative,
    Stl,
}

/// Components and quality metrics of a decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompositionResult {
    pub method: DecompositionMethod,
    pub period: usize,
    pub original: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub seasonality_strength: f64,
    pub trend_strength: f64,
    /// Mean square of the residual component.
    pub residual_variance: f64,
    /// Share of the original variance explained by trend and seasonal, in `[0, 1]`.
    pub decomposition_quality: f64,
}

impl DecompositionResult {
    /// Largest absolute difference between `original` and `trend + seasonal + residual`.
    pub fn reconstruction_error(&self) -> f64 {
        self.original
            .iter()
            .zip(&self.trend)
            .zip(&self.seasonal)
            .zip(&self.residual)
            .map(|(((o, t), s), r)| (o - (t + s + r)).abs())
            .fold(0.0, f64::max)
    }
}

/// Configuration for seasonal decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    pub method: DecompositionMethod,
    /// Seasonal period in samples.
    pub period: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            method: DecompositionMethod::Additive,
            period: 24,
        }
    }
}

impl DecompositionConfig {
    pub fn with_method(mut self, method: DecompositionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }
}

/// Stateless seasonal decomposer.
#[derive(Debug, Clone, Default)]
pub struct SeasonalDecomposer {
    config: DecompositionConfig,
}

struct Components {
    original: Vec<f64>,
    trend: Vec<f64>,
    seasonal: Vec<f64>,
    residual: Vec<f64>,
}

impl SeasonalDecomposer {
    pub fn new(config: DecompositionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }

    /// Decompose a sample sequence.
    ///
    /// Returns `Ok(None)` when there are fewer than two full periods.
    pub fn decompose(&self, samples: &[Sample]) -> Result<Option<DecompositionResult>> {
        let series = SampleSeries::from_slice(samples)?;
        self.decompose_values(&series.values())
    }

    /// Decompose raw values already in time order.
    pub fn decompose_values(&self, values: &[f64]) -> Result<Option<DecompositionResult>> {
        let period = self.config.period;
        if period < 2 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(AnalyticsError::InvalidInput(format!(
                "value at index {} is not finite",
                idx
            )));
        }
        if values.len() / 2 < period {
            trace!(
                samples = values.len(),
                needed = period.saturating_mul(2),
                "too few samples for decomposition"
            );
            return Ok(None);
        }

        let components = match self.config.method {
            DecompositionMethod::Additive => additive(values, period),
            DecompositionMethod::Multiplicative => multiplicative(values, period),
            DecompositionMethod::Stl => stl_like(values, period),
        };
        let result = with_metrics(self.config.method, period, components);

        debug!(
            samples = values.len(),
            period,
            method = ?self.config.method,
            quality = result.decomposition_quality,
            "decomposition complete"
        );
        Ok(Some(result))
    }
}

/// Decompose with the given configuration.
pub fn decompose(
    samples: &[Sample],
    config: &DecompositionConfig,
) -> Result<Option<DecompositionResult>> {
    SeasonalDecomposer::new(config.clone()).decompose(samples)
}

/// Centered moving average: the sum of the `2 * (window / 2) + 1` points
/// around each index divided by `window`.
///
/// For an even window the divisor is one less than the point count, so a
/// constant series of 1.0 averages to `(window + 1) / window` inside.
/// Points whose window would run past either end keep their original value.
pub fn centered_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            if i < half || i >= n.saturating_sub(half) {
                values[i]
            } else {
                values[i - half..=i + half].iter().sum::<f64>() / window as f64
            }
        })
        .collect()
}

/// Average of `detrended` at each position of the cycle.
fn cycle_means(detrended: &[f64], period: usize) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, &v) in detrended.iter().enumerate() {
        sums[i % period] += v;
        counts[i % period] += 1;
    }
    sums.iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect()
}

/// Zero-mean seasonal template.
fn centered_template(detrended: &[f64], period: usize) -> Vec<f64> {
    let mut template = cycle_means(detrended, period);
    let offset = stats::mean(&template);
    template.iter_mut().for_each(|s| *s -= offset);
    template
}

fn tile(template: &[f64], n: usize) -> Vec<f64> {
    (0..n).map(|i| template[i % template.len()]).collect()
}

fn additive_residual(values: &[f64], trend: &[f64], seasonal: &[f64]) -> Vec<f64> {
    values
        .iter()
        .zip(trend)
        .zip(seasonal)
        .map(|((v, t), s)| v - t - s)
        .collect()
}

fn additive(values: &[f64], period: usize) -> Components {
    let trend = centered_moving_average(values, period);
    let detrended: Vec<f64> = values.iter().zip(&trend).map(|(v, t)| v - t).collect();
    let seasonal = tile(&centered_template(&detrended, period), values.len());
    let residual = additive_residual(values, &trend, &seasonal);
    Components {
        original: values.to_vec(),
        trend,
        seasonal,
        residual,
    }
}

fn multiplicative(values: &[f64], period: usize) -> Components {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let adjusted: Vec<f64> = if min <= 0.0 {
        let shift = min.abs() + 1.0;
        values.iter().map(|v| v + shift).collect()
    } else {
        values.to_vec()
    };

    let trend = centered_moving_average(&adjusted, period);
    let detrended: Vec<f64> = adjusted
        .iter()
        .zip(&trend)
        .map(|(v, t)| if *t > 0.0 { v / t } else { 1.0 })
        .collect();

    let mut template = cycle_means(&detrended, period);
    let template_mean = stats::mean(&template);
    if template_mean > 0.0 {
        template.iter_mut().for_each(|s| *s /= template_mean);
    }
    let factors = tile(&template, values.len());

    let residual = adjusted
        .iter()
        .zip(&trend)
        .zip(&factors)
        .map(|((v, t), s)| {
            if *t > 0.0 && *s > 0.0 {
                v / (t * s) - 1.0
            } else {
                0.0
            }
        })
        .collect();
    let seasonal = factors.iter().map(|s| s - 1.0).collect();

    Components {
        original: adjusted,
        trend,
        seasonal,
        residual,
    }
}

fn stl_like(values: &[f64], period: usize) -> Components {
    let initial_trend = centered_moving_average(values, period);
    let detrended: Vec<f64> = values
        .iter()
        .zip(&initial_trend)
        .map(|(v, t)| v - t)
        .collect();
    // the STL template keeps its offset; only the additive strategy centers it
    let seasonal = tile(&cycle_means(&detrended, period), values.len());

    let adjusted: Vec<f64> = values.iter().zip(&seasonal).map(|(v, s)| v - s).collect();
    let trend = centered_moving_average(&adjusted, (period / 3).max(3));
    let residual = additive_residual(values, &trend, &seasonal);

    Components {
        original: values.to_vec(),
        trend,
        seasonal,
        residual,
    }
}

fn with_metrics(method: DecompositionMethod, period: usize, c: Components) -> DecompositionResult {
    let original_mean = stats::mean(&c.original);
    let original_var = stats::variance(&c.original);
    let trend_var = stats::mean(
        &c.trend
            .iter()
            .map(|t| (t - original_mean).powi(2))
            .collect::<Vec<_>>(),
    );
    let seasonal_var = stats::mean_square(&c.seasonal);
    let residual_var = stats::mean_square(&c.residual);

    let seasonality_strength =
        stats::ratio_or(seasonal_var, seasonal_var + residual_var, 0.0);
    let trend_strength = stats::ratio_or(trend_var, trend_var + residual_var, 0.0);
    let decomposition_quality =
        stats::ratio_or(trend_var + seasonal_var, original_var, 1.0).min(1.0);

    DecompositionResult {
        method,
        period,
        original: c.original,
        trend: c.trend,
        seasonal: c.seasonal,
        residual: c.residual,
        seasonality_strength,
        trend_strength,
        residual_variance: residual_var,
        decomposition_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn seasonal_series(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                50.0 + 0.2 * t + 10.0 * (2.0 * PI * t / period as f64).sin()
            })
            .collect()
    }

    fn decomposer(method: DecompositionMethod, period: usize) -> SeasonalDecomposer {
        SeasonalDecomposer::new(
            DecompositionConfig::default()
                .with_method(method)
                .with_period(period),
        )
    }

    #[test]
    fn moving_average_keeps_edges() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let ma = centered_moving_average(&values, 4);
        // half = 2: indices 0, 1, 5, 6 keep their values; five points over 4
        assert_eq!(ma, vec![1.0, 2.0, 3.75, 5.0, 6.25, 6.0, 7.0]);

        let spiky = [0.0, 0.0, 5.0, 0.0, 0.0];
        let ma = centered_moving_average(&spiky, 3);
        assert_relative_eq!(ma[1], 5.0 / 3.0);
        assert_relative_eq!(ma[2], 5.0 / 3.0);
        assert_eq!(ma[0], 0.0);
        assert_eq!(ma[4], 0.0);
    }

    #[test]
    fn even_window_divides_by_window_length() {
        let ma = centered_moving_average(&[1.0; 60], 24);
        assert_relative_eq!(ma[30], 25.0 / 24.0);
        assert_relative_eq!(ma[12], 25.0 / 24.0);
        assert_eq!(ma[11], 1.0);
        assert_eq!(ma[48], 1.0);

        // odd windows cover exactly `window` points
        let ma = centered_moving_average(&[1.0; 20], 5);
        assert!(ma.iter().all(|v| *v == 1.0));
    }

    #[test]
    fn moving_average_window_larger_than_series() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(centered_moving_average(&values, 10), values.to_vec());
    }

    #[test]
    fn additive_reconstructs_original() {
        let values = seasonal_series(96, 24);
        let result = decomposer(DecompositionMethod::Additive, 24)
            .decompose_values(&values)
            .unwrap()
            .unwrap();

        assert_eq!(result.trend.len(), values.len());
        assert_eq!(result.seasonal.len(), values.len());
        assert_eq!(result.residual.len(), values.len());
        assert!(result.reconstruction_error() < 1e-6);
    }

    #[test]
    fn additive_template_is_zero_mean_and_periodic() {
        let values = seasonal_series(130, 13);
        let result = decomposer(DecompositionMethod::Additive, 13)
            .decompose_values(&values)
            .unwrap()
            .unwrap();

        let cycle_sum: f64 = result.seasonal[..13].iter().sum();
        assert!(cycle_sum.abs() < 1e-9);
        for i in 13..result.seasonal.len() {
            assert_eq!(result.seasonal[i], result.seasonal[i - 13]);
        }
        assert!(result.seasonality_strength > 0.5);
        assert!(result.decomposition_quality > 0.5);
        assert!(result.decomposition_quality <= 1.0);
    }

    #[test]
    fn stl_reconstructs_original() {
        let values = seasonal_series(100, 24);
        let result = decomposer(DecompositionMethod::Stl, 24)
            .decompose_values(&values)
            .unwrap()
            .unwrap();
        assert_eq!(result.method, DecompositionMethod::Stl);
        assert!(result.reconstruction_error() < 1e-6);
    }

    #[test]
    fn stl_template_keeps_offset_on_trending_series() {
        let values: Vec<f64> = (0..60).map(|i| 0.5 * i as f64 + (i % 6) as f64).collect();

        let stl = decomposer(DecompositionMethod::Stl, 6)
            .decompose_values(&values)
            .unwrap()
            .unwrap();
        let stl_mean: f64 = stl.seasonal[..6].iter().sum::<f64>() / 6.0;
        assert!(stl_mean.abs() > 1e-3);
        for i in 6..stl.seasonal.len() {
            assert_eq!(stl.seasonal[i], stl.seasonal[i - 6]);
        }
        assert!(stl.reconstruction_error() < 1e-9);

        let additive = decomposer(DecompositionMethod::Additive, 6)
            .decompose_values(&values)
            .unwrap()
            .unwrap();
        let additive_mean: f64 = additive.seasonal[..6].iter().sum::<f64>() / 6.0;
        assert!(additive_mean.abs() < 1e-9);
    }

    #[test]
    fn multiplicative_reports_deviations_from_one() {
        let values: Vec<f64> = (0..96)
            .map(|i| {
                let t = i as f64;
                (100.0 + t) * (1.0 + 0.2 * (2.0 * PI * t / 24.0).sin())
            })
            .collect();
        let result = decomposer(DecompositionMethod::Multiplicative, 24)
            .decompose_values(&values)
            .unwrap()
            .unwrap();

        assert_eq!(result.original, values);
        let mean_seasonal: f64 = result.seasonal[..24].iter().sum::<f64>() / 24.0;
        assert!(mean_seasonal.abs() < 1e-9);
        assert!(result.seasonal.iter().all(|s| *s > -1.0));
        assert!(result.residual.iter().all(|r| r.abs() < 0.5));
    }

    #[test]
    fn multiplicative_shifts_non_positive_series() {
        let mut values: Vec<f64> = (0..48).map(|i| (i % 24) as f64 - 5.0).collect();
        values[3] = -10.0;
        let result = decomposer(DecompositionMethod::Multiplicative, 24)
            .decompose_values(&values)
            .unwrap()
            .unwrap();

        // shifted by |min| + 1 = 11, so the minimum becomes 1
        let min = result.original.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(min, 1.0);
        assert!(result.trend.iter().all(|t| *t > 0.0));
        assert!(result
            .seasonal
            .iter()
            .chain(&result.residual)
            .all(|v| v.is_finite()));
    }

    #[test]
    fn requires_two_full_periods() {
        let values = seasonal_series(47, 24);
        let result = decomposer(DecompositionMethod::Additive, 24)
            .decompose_values(&values)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn rejects_degenerate_period() {
        let err = decomposer(DecompositionMethod::Additive, 1)
            .decompose_values(&[1.0; 10])
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
    }

    #[test]
    fn constant_series_metrics_do_not_divide_by_zero() {
        for method in [
            DecompositionMethod::Additive,
            DecompositionMethod::Multiplicative,
            DecompositionMethod::Stl,
        ] {
            // odd period: every averaged window is exactly `period` points
            let result = decomposer(method, 5)
                .decompose_values(&[4.0; 30])
                .unwrap()
                .unwrap();
            assert_eq!(result.seasonality_strength, 0.0);
            assert_eq!(result.trend_strength, 0.0);
            assert_eq!(result.decomposition_quality, 1.0);
            assert_eq!(result.residual_variance, 0.0);
        }
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = decomposer(DecompositionMethod::Additive, 4)
            .decompose_values(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 2.0])
            .unwrap()
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("seasonalityStrength").is_some());
        assert!(json.get("decompositionQuality").is_some());
        assert_eq!(json["method"], "additive");
    }
}
