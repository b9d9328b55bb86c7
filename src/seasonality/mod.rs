//! Seasonality decomposition and calendar profiling.
//!
//! - [`SeasonalDecomposer`]: trend + seasonal + residual split (additive,
//!   multiplicative or STL-like)
//! - [`SeasonalityProfiler`]: hour-of-day, weekday and month profiles

mod decompose;
mod profile;

pub use decompose::{
    centered_moving_average, decompose, DecompositionConfig, DecompositionMethod,
    DecompositionResult, SeasonalDecomposer,
};
pub use profile::{profile_seasonality, ProfileConfig, SeasonalComponent, SeasonalityProfiler};
