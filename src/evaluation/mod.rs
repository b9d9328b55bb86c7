//! Evaluation of forecasts against observed values.

mod variance;

pub use variance::{
    analyze_variance, AccuracyClass, AccuracyDistribution, DayPart, DayPartError,
    VarianceConfig, VariancePoint, VarianceReport,
};
