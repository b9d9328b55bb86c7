//! Trend analysis: regression metrics, projection, growth series,
//! cross-series comparison and threshold alerts.

mod alerts;
mod comparison;
mod growth;
mod projector;

pub use alerts::{trend_alerts, AlertKind, AlertThresholds, TrendAlert, TrendAlertMonitor};
pub use comparison::{compare, SeriesComparison};
pub use growth::{acceleration, growth_rates, AccelerationPoint, GrowthPoint};
pub use projector::{
    project_trend, ProjectionConfig, ProjectionPoint, TrendAnalysis, TrendDirection,
    TrendMetrics, TrendProjector,
};
