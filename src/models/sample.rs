//! Carbon-intensity sample model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One carbon-intensity observation.
///
/// `value` is in gCO2/kWh. Grid-signal providers label the timestamp
/// `point_time`; that name is accepted on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensitySample {
    /// Observation instant.
    #[serde(alias = "point_time")]
    pub timestamp: DateTime<Utc>,
    /// Carbon intensity (gCO2/kWh).
    pub value: f64,
    /// Opaque provenance tag (model or data version).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl IntensitySample {
    /// Creates a sample without a version tag.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            version: None,
        }
    }

    /// Sets the provenance tag.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Whether the value is a usable intensity (finite, non-negative).
    #[inline]
    pub fn is_valid_value(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}
