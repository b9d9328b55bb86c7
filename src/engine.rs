//! One-call facade running every analyzer over the same series.

use crate::config::EngineConfig;
use crate::core::{Sample, SampleSeries};
use crate::detection::{AnomalyDetector, AnomalyEvent, DetectedPattern, PatternAnalyzer};
use crate::error::{AnalyticsError, Result};
use crate::seasonality::{
    DecompositionResult, SeasonalComponent, SeasonalDecomposer, SeasonalityProfiler,
};
use crate::trend::{TrendAlert, TrendAlertMonitor, TrendAnalysis, TrendProjector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

/// Combined output of every analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub sample_count: usize,
    pub anomalies: Vec<AnomalyEvent>,
    pub patterns: Vec<DetectedPattern>,
    /// `None` when the series is shorter than two seasonal periods.
    pub decomposition: Option<DecompositionResult>,
    /// `None` with fewer than two samples.
    pub trend: Option<TrendAnalysis>,
    pub seasonality: Vec<SeasonalComponent>,
    pub alerts: Vec<TrendAlert>,
}

/// Runs all analyzers with a shared configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: EngineConfig,
}

impl AnalyticsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate and order `samples` once, then run every analyzer.
    ///
    /// Empty input is rejected with [`AnalyticsError::EmptyData`]; any other
    /// size runs, with undersized passes contributing nothing.
    pub fn analyze(&self, samples: &[Sample]) -> Result<AnalysisReport> {
        if samples.is_empty() {
            return Err(AnalyticsError::EmptyData);
        }
        let series = SampleSeries::from_slice(samples)?;
        let _span = info_span!("analyze", samples = series.len()).entered();

        let anomalies = AnomalyDetector::new(self.config.anomaly.clone()).detect_series(&series)?;
        let patterns = PatternAnalyzer::new(self.config.pattern.clone()).analyze_series(&series);
        let decomposition = SeasonalDecomposer::new(self.config.decomposition.clone())
            .decompose_values(&series.values())?;
        let trend = TrendProjector::new(self.config.projection.clone()).project_series(&series)?;
        let seasonality =
            SeasonalityProfiler::new(self.config.profile.clone()).profile_series(&series)?;
        let alerts = TrendAlertMonitor::new(self.config.alerts.clone()).evaluate_series(&series)?;

        debug!(
            anomalies = anomalies.len(),
            patterns = patterns.len(),
            decomposed = decomposition.is_some(),
            projected = trend.is_some(),
            profiles = seasonality.len(),
            alerts = alerts.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            sample_count: series.len(),
            anomalies,
            patterns,
            decomposition,
            trend,
            seasonality,
            alerts,
        })
    }
}

/// Run every analyzer over `samples` with `config`.
pub fn analyze(samples: &[Sample], config: &EngineConfig) -> Result<AnalysisReport> {
    AnalyticsEngine::new(config.clone()).analyze(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seasonality::DecompositionConfig;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::PI;

    fn hourly(values: &[f64]) -> Vec<Sample> {
        let start = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
        SampleSeries::hourly(start, values).unwrap().into_samples()
    }

    #[test]
    fn runs_every_analyzer() {
        let values: Vec<f64> = (0..168)
            .map(|i| 100.0 + 30.0 * (2.0 * PI * i as f64 / 24.0).sin())
            .collect();
        let report = analyze(&hourly(&values), &EngineConfig::default()).unwrap();

        assert_eq!(report.sample_count, 168);
        assert!(!report.patterns.is_empty());
        let decomposition = report.decomposition.unwrap();
        assert_eq!(decomposition.original.len(), 168);
        assert_eq!(report.trend.unwrap().projections.len(), 24);
        assert!(!report.seasonality.is_empty());
    }

    #[test]
    fn short_series_leaves_optional_parts_empty() {
        let report = analyze(&hourly(&[5.0]), &EngineConfig::default()).unwrap();
        assert_eq!(report.sample_count, 1);
        assert!(report.anomalies.is_empty());
        assert!(report.patterns.is_empty());
        assert!(report.decomposition.is_none());
        assert!(report.trend.is_none());
        assert!(report.seasonality.is_empty());
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(
            analyze(&[], &EngineConfig::default()).unwrap_err(),
            AnalyticsError::EmptyData
        );
    }

    #[test]
    fn invalid_period_surfaces_as_error() {
        let config = EngineConfig::default()
            .with_decomposition(DecompositionConfig::default().with_period(0));
        let err = analyze(&hourly(&[1.0; 30]), &config).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
    }

    #[test]
    fn latest_drop_raises_alerts() {
        let mut values = vec![100.0; 30];
        values.push(5.0);
        let report = analyze(&hourly(&values), &EngineConfig::default()).unwrap();
        // last sample is Tuesday 06:00
        assert!(report
            .alerts
            .iter()
            .any(|a| a.kind == crate::trend::AlertKind::PatternBreak));
        assert!(report.alerts.iter().all(|a| a.timestamp == hourly(&values)[30].timestamp));
    }

    #[test]
    fn report_serializes() {
        let report = analyze(&hourly(&[1.0, 2.0, 3.0]), &EngineConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sampleCount"], 3);
        assert!(json["decomposition"].is_null());
    }
}
