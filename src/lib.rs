//! # trendscope
//!
//! Time-series analytics over timestamped samples.
//!
//! Provides anomaly detection (z-score, IQR, hour-of-day baselines and level
//! shifts), periodic pattern recognition (DFT, autocorrelation, peaks and
//! trend slope), seasonal decomposition, calendar seasonality profiles,
//! regression-based trend projection with threshold alerts, and forecast
//! variance analysis.
//!
//! Every analyzer is a stateless function of its input and configuration.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod detection;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod seasonality;
pub mod trend;
pub mod utils;

pub use error::{AnalyticsError, Result};

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::{Sample, SampleSeries, SeasonalPeriod, Severity};
    pub use crate::detection::{
        AnomalyConfig, AnomalyDetector, AnomalyEvent, DetectedPattern, PatternAnalyzer,
        PatternConfig, Sensitivity,
    };
    pub use crate::engine::{analyze, AnalysisReport, AnalyticsEngine};
    pub use crate::error::{AnalyticsError, Result};
    pub use crate::evaluation::{analyze_variance, VarianceConfig, VarianceReport};
    pub use crate::seasonality::{
        DecompositionConfig, DecompositionMethod, DecompositionResult, ProfileConfig,
        SeasonalComponent, SeasonalDecomposer, SeasonalityProfiler,
    };
    pub use crate::trend::{
        AlertThresholds, ProjectionConfig, TrendAlert, TrendAnalysis, TrendDirection,
        TrendProjector,
    };
}
