//! Numeric building blocks shared by the analyzers.

pub mod regression;
pub mod stats;

pub use regression::{linear_fit, quadratic_fit, LinearFit, QuadraticFit};
pub use stats::{mean, pearson_correlation, std_dev, summarize, variance, StatSummary};
