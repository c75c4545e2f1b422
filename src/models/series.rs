//! Carbon-intensity time series.
//!
//! An `IntensitySeries` is an arena of samples sorted ascending by
//! timestamp. Queries return slices of the arena; windowing returns index
//! ranges into it, so no sample is ever copied after construction.
//!
//! # Coverage
//! Each reading stands for the interval up to the next reading. The last
//! reading therefore covers `[last, last + resolution)`, where the
//! resolution is either set explicitly or inferred as the smallest gap
//! between consecutive readings.

use std::ops::Range;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::window::delta_ms;
use super::{IntensitySample, TimeSpan};
use crate::error::{CarbonError, Result};
use crate::validation::validate_samples;

/// Validated, sorted carbon-intensity readings for one region.
///
/// Immutable once built; share it across threads by reference or `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRepr")]
pub struct IntensitySeries {
    samples: Vec<IntensitySample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(
        default,
        rename = "resolution_ms",
        with = "delta_ms::option",
        skip_serializing_if = "Option::is_none"
    )]
    resolution: Option<TimeDelta>,
}

/// A contiguous slice of the arena covering one `[start, end)` span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleWindow {
    /// Window bounds (half-open).
    pub span: TimeSpan,
    /// Index range into [`IntensitySeries::samples`].
    pub range: Range<usize>,
}

impl SampleWindow {
    /// Number of samples inside the window.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the window holds no samples (a data gap).
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl IntensitySeries {
    /// Builds a series from samples in any order.
    ///
    /// Samples are sorted by timestamp, then checked:
    /// - duplicate timestamps → [`CarbonError::MalformedSeries`]
    /// - non-finite or negative values → [`CarbonError::InvalidSample`]
    ///
    /// An empty input is a valid (empty) series.
    pub fn new(mut samples: Vec<IntensitySample>) -> Result<Self> {
        samples.sort_by_key(|s| s.timestamp);
        if let Err(mut errors) = validate_samples(&samples) {
            return Err(errors.swap_remove(0).into());
        }
        Ok(Self {
            samples,
            region: None,
            resolution: None,
        })
    }

    /// Builds a series from `(timestamp, value)` pairs.
    pub fn from_values(
        values: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> Result<Self> {
        Self::new(
            values
                .into_iter()
                .map(|(t, v)| IntensitySample::new(t, v))
                .collect(),
        )
    }

    /// Tags the series with a grid region identifier.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the sample interval explicitly (e.g. 5 minutes for a MOER signal).
    ///
    /// Non-positive values are ignored.
    pub fn with_resolution(mut self, resolution: TimeDelta) -> Self {
        if resolution > TimeDelta::zero() {
            self.resolution = Some(resolution);
        }
        self
    }

    /// Region tag, if any.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// All samples, ascending by timestamp.
    pub fn samples(&self) -> &[IntensitySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest sample.
    pub fn first(&self) -> Option<&IntensitySample> {
        self.samples.first()
    }

    /// Latest sample.
    pub fn last(&self) -> Option<&IntensitySample> {
        self.samples.last()
    }

    /// First and last timestamps. `None` for an empty series.
    pub fn bounds(&self) -> Option<TimeSpan> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some(TimeSpan::new(first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Sample interval: explicit if set, else the smallest gap between
    /// consecutive readings. `None` with fewer than two readings and no
    /// explicit value.
    pub fn resolution(&self) -> Option<TimeDelta> {
        self.resolution.or_else(|| {
            self.samples
                .windows(2)
                .map(|pair| pair[1].timestamp - pair[0].timestamp)
                .min()
        })
    }

    /// End of the interval the data speaks for: last timestamp plus one
    /// resolution step. Saturates at the latest representable instant.
    pub fn coverage_end(&self) -> Option<DateTime<Utc>> {
        let last = self.samples.last()?;
        let step = self.resolution().unwrap_or_else(TimeDelta::zero);
        Some(last.timestamp.checked_add_signed(step).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Samples with `start <= timestamp <= end`.
    ///
    /// Returns an empty slice when nothing falls in range (including
    /// `start > end`).
    pub fn filter(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[IntensitySample] {
        if start > end {
            return &[];
        }
        let lo = self.samples.partition_point(|s| s.timestamp < start);
        let hi = self.samples.partition_point(|s| s.timestamp <= end);
        &self.samples[lo..hi]
    }

    /// Samples inside a partition window.
    pub fn window_samples(&self, window: &SampleWindow) -> &[IntensitySample] {
        &self.samples[window.range.clone()]
    }

    /// Splits time from `origin` into contiguous `[origin + k*width,
    /// origin + (k+1)*width)` windows, stopping before any window whose end
    /// would pass `until`.
    ///
    /// Windows are returned in start order and may be empty (gaps).
    /// A non-positive `width` yields no windows.
    pub fn partition(
        &self,
        origin: DateTime<Utc>,
        width: TimeDelta,
        until: DateTime<Utc>,
    ) -> Vec<SampleWindow> {
        let mut windows = Vec::new();
        if width <= TimeDelta::zero() {
            return windows;
        }

        let mut start = origin;
        let mut lo = self.samples.partition_point(|s| s.timestamp < start);
        while let Some(end) = start.checked_add_signed(width) {
            if end > until {
                break;
            }
            let hi = lo + self.samples[lo..].partition_point(|s| s.timestamp < end);
            windows.push(SampleWindow {
                span: TimeSpan::new(start, end),
                range: lo..hi,
            });
            start = end;
            lo = hi;
        }
        windows
    }
}

/// Unvalidated wire form; deserialization goes through [`IntensitySeries::new`].
#[derive(Deserialize)]
struct SeriesRepr {
    samples: Vec<IntensitySample>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default, rename = "resolution_ms", with = "delta_ms::option")]
    resolution: Option<TimeDelta>,
}

impl TryFrom<SeriesRepr> for IntensitySeries {
    type Error = CarbonError;

    fn try_from(repr: SeriesRepr) -> Result<Self> {
        let mut series = IntensitySeries::new(repr.samples)?;
        series.region = repr.region;
        if let Some(resolution) = repr.resolution {
            series = series.with_resolution(resolution);
        }
        Ok(series)
    }
}
