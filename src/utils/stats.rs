//! Statistical primitives shared by every analyzer.
//!
//! All variances here are population variances (divide by `n`). Quartiles are
//! exact order statistics picked with the `floor(n * p)` index rule, without
//! interpolation between neighbouring values.

use crate::error::{AnalyticsError, Result};

/// Descriptive statistics of a slice of values.
#[derive(Debug, Clone, PartialEq)]
pub struct StatSummary {
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
    /// `sorted[floor(n * 0.25)]`
    pub q1: f64,
    /// `sorted[floor(n * 0.75)]`
    pub q3: f64,
    pub iqr: f64,
    /// Ascending copy of the input.
    pub sorted: Vec<f64>,
}

/// Summarize a slice of values.
///
/// Fails with [`AnalyticsError::InsufficientData`] only when `values` is empty.
///
/// # Example
/// ```
/// use trendscope::utils::summarize;
///
/// let s = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
/// assert_eq!(s.mean, 2.5);
/// assert_eq!(s.q1, 2.0);
/// assert_eq!(s.q3, 4.0);
/// ```
pub fn summarize(values: &[f64]) -> Result<StatSummary> {
    let n = values.len();
    if n == 0 {
        return Err(AnalyticsError::InsufficientData { needed: 1, got: 0 });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = mean(values);
    let variance = population_variance(values, mean);
    let q1 = sorted[quartile_index(n, 0.25)];
    let q3 = sorted[quartile_index(n, 0.75)];

    Ok(StatSummary {
        mean,
        variance,
        std_dev: variance.sqrt(),
        q1,
        q3,
        iqr: q3 - q1,
        sorted,
    })
}

fn quartile_index(n: usize, p: f64) -> usize {
    ((n as f64 * p).floor() as usize).min(n - 1)
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance. Returns 0.0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    population_variance(values, mean(values))
}

/// Population standard deviation. Returns 0.0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Mean of squares, i.e. the variance about zero.
pub fn mean_square(values: &[f64]) -> f64 {
    population_variance(values, 0.0)
}

fn population_variance(values: &[f64], center: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|x| (x - center).powi(2)).sum::<f64>() / values.len() as f64
}

/// Pearson correlation over the common prefix of two slices.
///
/// Returns 0.0 with fewer than two paired points or when either side has zero
/// variance.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut numerator = 0.0;
    let mut sum_sq_a = 0.0;
    let mut sum_sq_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        numerator += da * db;
        sum_sq_a += da * da;
        sum_sq_b += db * db;
    }

    let denominator = (sum_sq_a * sum_sq_b).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Whether a spread is indistinguishable from zero relative to the level it
/// was measured around.
pub(crate) fn is_negligible(spread: f64, level: f64) -> bool {
    spread <= 1e-10 * level.abs().max(1.0)
}

/// Divide, resolving a zero (or non-finite) denominator to `fallback`.
pub(crate) fn ratio_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return fallback;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        fallback
    }
}
