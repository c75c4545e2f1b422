//! Intensity data sources.
//!
//! Fetching readings from a grid-signal provider happens outside the core.
//! This module defines the boundary: a provider returns a validated
//! [`IntensitySeries`] for one region and time range, or one of a closed
//! set of failures. Failures are variants, never parsed message text.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::error::CarbonError;
use crate::models::{IntensitySample, IntensitySeries, TimeSpan};

/// Errors reported by a data source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("region not found: {0}")]
    RegionNotFound(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("data source error: {0}")]
    Unknown(String),

    #[error("series rejected: {0}")]
    Series(#[from] CarbonError),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A provider of carbon-intensity readings.
pub trait IntensitySource {
    /// Readings for `region` with `start <= timestamp <= end`, sorted and
    /// tagged with the region.
    fn fetch(
        &self,
        region: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SourceResult<IntensitySeries>;
}

/// In-memory source keyed by region, for offline replays and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    regions: HashMap<String, Vec<IntensitySample>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a region's readings.
    pub fn with_region(
        mut self,
        region: impl Into<String>,
        samples: Vec<IntensitySample>,
    ) -> Self {
        self.regions.insert(region.into(), samples);
        self
    }

    /// Known region identifiers.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

impl IntensitySource for StaticSource {
    fn fetch(
        &self,
        region: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SourceResult<IntensitySeries> {
        let samples = self
            .regions
            .get(region)
            .ok_or_else(|| SourceError::RegionNotFound(region.to_string()))?;

        let range = TimeSpan::new(start, end);
        let in_range: Vec<IntensitySample> = samples
            .iter()
            .filter(|s| range.contains_inclusive(s.timestamp))
            .cloned()
            .collect();

        debug!(%region, %start, %end, samples = in_range.len(), "fetched intensity readings");
        Ok(IntensitySeries::new(in_range)?.with_region(region))
    }
}
