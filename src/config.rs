//! Aggregate configuration for running every analyzer in one call.

use crate::detection::{AnomalyConfig, PatternConfig};
use crate::seasonality::{DecompositionConfig, ProfileConfig};
use crate::trend::{AlertThresholds, ProjectionConfig};
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::engine::analyze`].
///
/// Every field defaults independently, so a partial document such as
/// `{"anomaly": {"sensitivity": "high"}}` deserializes with the remaining
/// settings at their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub anomaly: AnomalyConfig,
    pub pattern: PatternConfig,
    pub decomposition: DecompositionConfig,
    pub projection: ProjectionConfig,
    pub profile: ProfileConfig,
    pub alerts: AlertThresholds,
}

impl EngineConfig {
    pub fn with_anomaly(mut self, anomaly: AnomalyConfig) -> Self {
        self.anomaly = anomaly;
        self
    }

    pub fn with_pattern(mut self, pattern: PatternConfig) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_decomposition(mut self, decomposition: DecompositionConfig) -> Self {
        self.decomposition = decomposition;
        self
    }

    pub fn with_projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_alerts(mut self, alerts: AlertThresholds) -> Self {
        self.alerts = alerts;
        self
    }

    /// Set the calendar offset used by every calendar-aware analyzer.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.anomaly.utc_offset_minutes = minutes;
        self.profile.utc_offset_minutes = minutes;
        self.alerts.utc_offset_minutes = minutes;
        self
    }
}
