//! Detection utilities for time series analysis.
//!
//! This module provides tools for detecting:
//! - Anomalies (spikes, drops, level shifts, contextual outliers)
//! - Recurring patterns (spectral peaks, autocorrelation, trends, peak spacing)

mod anomaly;
mod pattern;
pub mod spectrum;

pub use anomaly::{
    detect_anomalies, AnomalyConfig, AnomalyDetector, AnomalyEvent, AnomalyKind, Sensitivity,
    MIN_CONTEXTUAL_SAMPLES, MIN_SAMPLES,
};
pub use pattern::{
    detect_patterns, find_peaks_and_valleys, DetectedPattern, PatternAnalyzer, PatternConfig,
    PatternKind,
};
