//! Spectral and serial-correlation primitives for periodicity analysis.

use crate::utils::stats;
use rustfft::{num_complex::Complex64, FftPlanner};

/// One frequency bin of a discrete Fourier transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralLine {
    /// Frequency index `k`.
    pub k: usize,
    /// Period in samples, `n / k`.
    pub period: f64,
    /// `|X_k| / n`.
    pub amplitude: f64,
}

/// Amplitude spectrum for frequency indices `k = 1 .. n/2` (exclusive).
///
/// Matches the direct sum
/// `real = Σ v[i]·cos(2πki/n)`, `imag = Σ v[i]·sin(2πki/n)`,
/// `amplitude = sqrt(real² + imag²) / n`; the FFT only flips the sign of the
/// imaginary part, which the magnitude discards.
pub fn amplitude_spectrum(values: &[f64]) -> Vec<SpectralLine> {
    let n = values.len();
    if n < 3 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = values.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let n_f64 = n as f64;
    buffer
        .iter()
        .enumerate()
        .skip(1)
        .take_while(|(k, _)| 2 * k < n)
        .map(|(k, c)| SpectralLine {
            k,
            period: n_f64 / k as f64,
            amplitude: c.norm() / n_f64,
        })
        .collect()
}

/// Autocorrelation for lags `1..=max_lag` (capped at `n - 1`).
///
/// Each lag uses the average lagged covariance, `Σ (v[i]-m)(v[i+lag]-m) / (n-lag)`,
/// divided by the population variance. A zero-variance series has no
/// autocorrelation structure and yields an empty vector.
pub fn autocorrelation_function(values: &[f64], max_lag: usize) -> Vec<(usize, f64)> {
    let n = values.len();
    if n < 2 {
        return Vec::new();
    }
    let mean = stats::mean(values);
    let variance = stats::variance(values);
    if stats::is_negligible(variance.sqrt(), mean) {
        return Vec::new();
    }

    (1..=max_lag.min(n - 1))
        .map(|lag| {
            let pairs = n - lag;
            let covariance: f64 = (0..pairs)
                .map(|i| (values[i] - mean) * (values[i + lag] - mean))
                .sum::<f64>()
                / pairs as f64;
            (lag, covariance / variance)
        })
        .collect()
}
