//! Closed-form least-squares fits of values against their index.

use serde::{Deserialize, Serialize};

/// Result of a linear fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to `[0, 1]`.
    /// A constant series is a perfect fit (`1.0`).
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Result of a quadratic fit `y = a*x^2 + b*x + c`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadraticFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl QuadraticFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.a * x * x + self.b * x + self.c
    }
}

/// Ordinary least squares of `values[i]` against `i`.
///
/// Returns `None` with fewer than two points.
pub fn linear_fit(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = nf * sum_xx - sum_x * sum_x;
    let slope = if denominator == 0.0 {
        0.0
    } else {
        (nf * sum_xy - sum_x * sum_y) / denominator
    };
    let intercept = (sum_y - slope * sum_x) / nf;

    let y_mean = sum_y / nf;
    let ss_total: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_residual: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();

    let r_squared = if ss_total == 0.0 {
        1.0
    } else {
        (1.0 - ss_residual / ss_total).clamp(0.0, 1.0)
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Quadratic least squares of `values[i]` against `i` via the normal equations.
///
/// Fewer than three points, or a degenerate system, yields the zero polynomial.
pub fn quadratic_fit(values: &[f64]) -> QuadraticFit {
    let n = values.len();
    if n < 3 {
        return QuadraticFit::default();
    }
    let nf = n as f64;

    let (mut sx, mut sx2, mut sx3, mut sx4) = (0.0, 0.0, 0.0, 0.0);
    let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        let x2 = x * x;
        sx += x;
        sx2 += x2;
        sx3 += x2 * x;
        sx4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }

    // Centered moments (each scaled by n).
    let s_xx = nf * sx2 - sx * sx;
    let s_xy = nf * sxy - sx * sy;
    let s_xx2 = nf * sx3 - sx * sx2;
    let s_x2x2 = nf * sx4 - sx2 * sx2;
    let s_x2y = nf * sx2y - sx2 * sy;

    let det = s_x2x2 * s_xx - s_xx2 * s_xx2;
    if !is_well_conditioned(det, s_x2x2 * s_xx) || s_xx == 0.0 {
        return QuadraticFit::default();
    }

    let a = (s_x2y * s_xx - s_xy * s_xx2) / det;
    let b = (s_xy - a * s_xx2) / s_xx;
    let c = (sy - b * sx - a * sx2) / nf;

    if a.is_finite() && b.is_finite() && c.is_finite() {
        QuadraticFit { a, b, c }
    } else {
        QuadraticFit::default()
    }
}

/// Relative test for a vanishing determinant.
fn is_well_conditioned(det: f64, scale: f64) -> bool {
    det.is_finite() && det != 0.0 && det.abs() > scale.abs() * 1e-12
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_fit_recovers_line() {
        let values: Vec<f64> = (0..20).map(|i| 3.0 + 0.5 * i as f64).collect();
        let fit = linear_fit(&values).unwrap();
        assert_relative_eq!(fit.slope, 0.5, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, 3.0, epsilon = 1e-10);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.predict(30.0), 18.0, epsilon = 1e-9);
    }

    #[test]
    fn linear_fit_constant_series_is_perfect() {
        let fit = linear_fit(&[5.0; 10]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 5.0);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn linear_fit_needs_two_points() {
        assert!(linear_fit(&[]).is_none());
        assert!(linear_fit(&[1.0]).is_none());
    }

    #[test]
    fn quadratic_fit_recovers_parabola() {
        let values: Vec<f64> = (0..30)
            .map(|i| {
                let x = i as f64;
                0.2 * x * x - 1.5 * x + 4.0
            })
            .collect();
        let fit = quadratic_fit(&values);
        assert_relative_eq!(fit.a, 0.2, epsilon = 1e-8);
        assert_relative_eq!(fit.b, -1.5, epsilon = 1e-6);
        assert_relative_eq!(fit.c, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn quadratic_fit_on_line_has_no_curvature() {
        let values: Vec<f64> = (0..25).map(|i| 10.0 + 2.0 * i as f64).collect();
        let fit = quadratic_fit(&values);
        assert!(fit.a.abs() < 1e-9);
        assert_relative_eq!(fit.b, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn quadratic_fit_degenerate_falls_back_to_zero() {
        assert_eq!(quadratic_fit(&[1.0, 2.0]), QuadraticFit::default());
        assert_eq!(quadratic_fit(&[]), QuadraticFit::default());
    }
}
