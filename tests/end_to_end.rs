//! End-to-end scenarios over realistic hourly workloads.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use trendscope::detection::{detect_anomalies, AnomalyKind, PatternKind};
use trendscope::evaluation::{analyze_variance, AccuracyClass, VarianceConfig};
use trendscope::prelude::*;
use trendscope::trend::{acceleration, compare, growth_rates};

fn base() -> DateTime<Utc> {
    // Monday
    Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
}

fn hourly(values: &[f64]) -> Vec<Sample> {
    SampleSeries::hourly(base(), values).unwrap().into_samples()
}

/// Call-centre style load: daily cycle, gentle growth and seeded noise.
fn workload(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let t = i as f64;
            let daily = 40.0 * (2.0 * PI * (t - 6.0) / 24.0).sin();
            200.0 + 0.05 * t + daily + rng.gen_range(-5.0..5.0)
        })
        .collect()
}

#[test]
fn nine_samples_produce_no_global_anomalies() {
    let mut values = vec![10.0; 8];
    values.push(1000.0);
    let samples = hourly(&values);
    assert!(AnomalyDetector::default().detect(&samples).unwrap().is_empty());
}

#[test]
fn ten_samples_with_one_outlier_yield_one_critical_spike() {
    let mut values = vec![10.0; 9];
    values.push(1000.0);
    let events = AnomalyDetector::default().detect(&hourly(&values)).unwrap();

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.severity, Severity::Critical);
    assert_eq!(event.kind, AnomalyKind::Spike);
    assert_eq!(event.value, 1000.0);
    assert!(event.action_required);
}

#[test]
fn flat_series_is_quiet() {
    let samples = hourly(&[50.0; 100]);
    let report = analyze(&samples, &EngineConfig::default()).unwrap();

    assert!(report.anomalies.is_empty());
    assert!(report.patterns.iter().all(|p| p.strength == 0.0));
    let trend = report.trend.unwrap();
    assert_eq!(trend.metrics.growth_rate_percent, 0.0);
    assert_eq!(trend.metrics.trend_direction, TrendDirection::Stable);
    assert_eq!(trend.metrics.volatility, 0.0);
}

#[test]
fn daily_sinusoid_is_recognised_as_daily_seasonality() {
    let values: Vec<f64> = (0..500)
        .map(|i| 100.0 + 25.0 * (2.0 * PI * i as f64 / 24.0).sin())
        .collect();
    let patterns = PatternAnalyzer::default().fourier_patterns(&values);

    let daily = patterns
        .iter()
        .find(|p| p.seasonal_period == Some(SeasonalPeriod::Daily))
        .expect("daily pattern");
    assert_eq!(daily.kind, PatternKind::Seasonal);
    assert!((22.0..=26.0).contains(&daily.period_hours));
}

#[test]
fn noisy_workload_full_report() {
    let samples = hourly(&workload(24 * 14, 7));
    let config = EngineConfig::default().with_decomposition(
        DecompositionConfig::default()
            .with_method(DecompositionMethod::Stl)
            .with_period(24),
    );
    let report = analyze(&samples, &config).unwrap();

    assert!(report
        .patterns
        .iter()
        .any(|p| p.seasonal_period == Some(SeasonalPeriod::Daily)));

    let decomposition = report.decomposition.unwrap();
    assert!(decomposition.reconstruction_error() < 1e-6);
    // the even STL windows inflate the trend, so the residual carries a level offset
    assert!(decomposition.seasonality_strength > 0.3);
    assert!(decomposition.seasonal[..24].iter().sum::<f64>().abs() > 1.0);

    let trend = report.trend.unwrap();
    assert_eq!(trend.projections.len(), 24);
    assert_eq!(
        trend.projections[0].timestamp,
        base() + Duration::hours(24 * 14)
    );

    let hourly_profile = report
        .seasonality
        .iter()
        .find(|c| c.period == SeasonalPeriod::Hourly)
        .unwrap();
    // the cycle peaks at 12:00
    assert!(hourly_profile.peaks.iter().any(|h| (11..=13).contains(h)));
    assert!(hourly_profile.strength > 0.05);
}

#[test]
fn level_shift_is_reported() {
    let mut rng = StdRng::seed_from_u64(11);
    let values: Vec<f64> = (0..72)
        .map(|i| {
            let level = if i < 36 { 100.0 } else { 200.0 };
            level + rng.gen_range(-2.0..2.0)
        })
        .collect();
    let events = AnomalyDetector::default().detect(&hourly(&values)).unwrap();

    let shifts: Vec<_> = events
        .iter()
        .filter(|e| e.kind == AnomalyKind::Shift)
        .collect();
    assert!(!shifts.is_empty());
    // windows straddling the step cross 25% before the step itself
    assert!(shifts[0].timestamp >= base() + Duration::hours(24));
    assert!(shifts[0].timestamp < base() + Duration::hours(36));
    assert!(shifts.iter().any(|e| e.severity == Severity::Critical));
}

#[test]
fn contextual_pass_catches_hour_specific_outlier() {
    let mut values = workload(24 * 10, 3);
    // quiet 03:00 slot on day 5 suddenly runs at peak load
    values[24 * 5 + 3] += 60.0;
    let config = AnomalyConfig::default().with_contextual(true);
    let events = detect_anomalies(&hourly(&values), &config).unwrap();

    assert!(events
        .iter()
        .any(|e| e.timestamp == base() + Duration::hours(24 * 5 + 3)
            && e.kind == AnomalyKind::Outlier));
}

#[test]
fn forecast_variance_against_projection() {
    let history = workload(24 * 7, 5);
    let mut rng = StdRng::seed_from_u64(9);
    let actual: Vec<f64> = history.iter().map(|v| v * rng.gen_range(0.9..1.1)).collect();

    let report = analyze_variance(&hourly(&actual), &hourly(&history), &VarianceConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(report.points.len(), history.len());
    assert!(report.mean_absolute_percentage_error < 10.0);
    assert_eq!(report.accuracy_score, 100.0);
    assert_eq!(report.distribution.poor, 0);
    assert_eq!(report.day_parts.len(), 4);
    assert!(report
        .points
        .iter()
        .all(|p| p.accuracy != AccuracyClass::Fair));
}

#[test]
fn growth_and_comparison_on_related_series() {
    let baseline = hourly(&workload(48, 1));
    let scaled: Vec<Sample> = baseline
        .iter()
        .map(|s| Sample::new(s.timestamp, s.value * 1.2))
        .collect();

    let comparison = compare(&baseline, &scaled).unwrap();
    assert!((comparison.correlation - 1.0).abs() < 1e-9);
    assert!((comparison.relative_difference_percent - 20.0).abs() < 1e-9);

    let growth = growth_rates(&baseline).unwrap();
    assert_eq!(growth.len(), 47);
    assert_eq!(acceleration(&growth).len(), 46);
}

#[test]
fn patterns_kind_serializes_lowercase() {
    let json = serde_json::to_string(&PatternKind::Trending).unwrap();
    assert_eq!(json, "\"trending\"");
}
