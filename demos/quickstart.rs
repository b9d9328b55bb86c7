//! Quickstart demonstrating basic usage of trendscope.
//!
//! Run with: RUST_LOG=trendscope=debug cargo run --example quickstart

use chrono::{TimeZone, Utc};
use trendscope::evaluation::{analyze_variance, VarianceConfig};
use trendscope::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendscope=info".into()),
        )
        .init();

    println!("=== trendscope Quickstart ===\n");

    // 1. Two weeks of hourly contact volume
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut values: Vec<f64> = (0..24 * 14)
        .map(|i| {
            let t = i as f64;
            120.0                                                        // base level
            + 0.1 * t                                                    // growth
            + 35.0 * (2.0 * std::f64::consts::PI * (t - 6.0) / 24.0).sin() // daily cycle
            + 3.0 * (t * 0.7).cos()                                      // jitter
        })
        .collect();
    values[200] = 480.0; // incident
    let samples = SampleSeries::hourly(start, &values)
        .unwrap()
        .into_samples();
    println!("Created series with {} hourly samples", samples.len());

    // 2. Run every analyzer in one call
    let config = EngineConfig::default()
        .with_anomaly(AnomalyConfig::default().with_contextual(true))
        .with_decomposition(DecompositionConfig::default().with_method(DecompositionMethod::Stl));
    let report = analyze(&samples, &config).unwrap();

    println!("\n--- Anomalies ---");
    for event in &report.anomalies {
        println!(
            "  {} [{}] {:.1} (expected {:.1}): {}",
            event.timestamp.format("%Y-%m-%d %H:%M"),
            event.severity,
            event.value,
            event.expected_value,
            event.explanation
        );
    }

    println!("\n--- Patterns ---");
    for pattern in report.patterns.iter().take(5) {
        println!(
            "  {:<14} {:>7.1}h  confidence {:.2}  {}",
            pattern.id, pattern.period_hours, pattern.confidence, pattern.description
        );
        for hint in &pattern.recommendations {
            println!("      - {}", hint);
        }
    }

    println!("\n--- Alerts ---");
    for alert in &report.alerts {
        println!(
            "  [{}] {} (current {:.1}, expected {:.1})",
            alert.severity, alert.message, alert.current_value, alert.expected_value
        );
    }

    if let Some(decomposition) = &report.decomposition {
        println!("\n--- Decomposition ---");
        println!("  Seasonality strength: {:.3}", decomposition.seasonality_strength);
        println!("  Trend strength:       {:.3}", decomposition.trend_strength);
        println!("  Quality:              {:.3}", decomposition.decomposition_quality);
    }

    if let Some(trend) = &report.trend {
        println!("\n--- Trend ---");
        println!(
            "  Growth {:.2}% per sample, volatility {:.1}, {}",
            trend.metrics.growth_rate_percent, trend.metrics.volatility, trend.metrics.trend_direction
        );
        for point in trend.projections.iter().take(6) {
            println!(
                "  {}: {:.1} [{:.1}, {:.1}] confidence {:.2}",
                point.timestamp.format("%m-%d %H:%M"),
                point.value,
                point.lower,
                point.upper,
                point.confidence
            );
        }
    }

    println!("\n--- Seasonality profiles ---");
    for component in &report.seasonality {
        println!(
            "  {:<8} strength {:.2}  peaks {:?}  valleys {:?}",
            format!("{:?}", component.period),
            component.strength,
            component.peaks,
            component.valleys
        );
    }

    // 3. Compare a naive forecast (same hour yesterday) with the actuals
    println!("\n--- Forecast variance (same hour yesterday) ---");
    let forecast: Vec<Sample> = samples
        .iter()
        .skip(24)
        .zip(samples.iter())
        .map(|(actual, yesterday)| Sample::new(actual.timestamp, yesterday.value))
        .collect();
    let variance = analyze_variance(&samples, &forecast, &VarianceConfig::default())
        .unwrap()
        .unwrap();
    println!("  MAE:  {:.2}", variance.mean_absolute_error);
    println!("  MAPE: {:.2}%", variance.mean_absolute_percentage_error);
    println!("  RMSE: {:.2}", variance.root_mean_square_error);
    println!("  Accuracy score: {:.1}%", variance.accuracy_score);

    // 4. Results serialize directly for export
    let first = report.anomalies.first().map(serde_json::to_string);
    if let Some(Ok(json)) = first {
        println!("\nFirst anomaly as JSON: {}", json);
    }

    println!("\n=== Quickstart complete ===");
}
