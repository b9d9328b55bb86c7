//! Small enums shared across analyzers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a detected anomaly, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Bucket a deviation expressed in standard deviations.
    pub fn from_sigma(deviation: f64) -> Self {
        if deviation > 4.0 {
            Severity::Critical
        } else if deviation > 3.0 {
            Severity::High
        } else if deviation > 2.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Calendar granularity of a seasonal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalPeriod {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl SeasonalPeriod {
    /// Classify a cycle length in hours into a known calendar cycle.
    ///
    /// Bands: 22-26h daily, 160-180h weekly, 720-780h monthly (inclusive).
    pub fn classify_hours(period_hours: f64) -> Option<Self> {
        if (22.0..=26.0).contains(&period_hours) {
            Some(SeasonalPeriod::Daily)
        } else if (160.0..=180.0).contains(&period_hours) {
            Some(SeasonalPeriod::Weekly)
        } else if (720.0..=780.0).contains(&period_hours) {
            Some(SeasonalPeriod::Monthly)
        } else {
            None
        }
    }
}

impl fmt::Display for SeasonalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeasonalPeriod::Hourly => "hourly",
            SeasonalPeriod::Daily => "daily",
            SeasonalPeriod::Weekly => "weekly",
            SeasonalPeriod::Monthly => "monthly",
            SeasonalPeriod::Yearly => "yearly",
        };
        f.write_str(name)
    }
}
