//! Job intensity evaluation.
//!
//! Computes the mean carbon intensity a job incurs over a concrete
//! interval.
//!
//! # Weighting
//! The mean is taken over samples, not over time: every reading in range
//! counts once regardless of the spacing to its neighbours. For an
//! irregularly sampled series this is a sample-count-weighted mean. The
//! result is reproducible from the raw readings alone.

use chrono::{DateTime, Utc};

use crate::error::{CarbonError, Result};
use crate::models::{IntensitySample, IntensitySeries};

/// Mean-intensity calculator for job intervals.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobIntensityEvaluator;

impl JobIntensityEvaluator {
    /// Mean intensity over samples with `start <= timestamp <= end`.
    ///
    /// # Errors
    /// [`CarbonError::NoDataInWindow`] when no sample falls in range. An
    /// empty mean is undefined and is never reported as zero.
    ///
    /// # Example
    ///
    /// ```
    /// use carbon_aware_schedule::models::IntensitySeries;
    /// use carbon_aware_schedule::scheduler::JobIntensityEvaluator;
    /// use chrono::{TimeDelta, TimeZone, Utc};
    ///
    /// let t0 = Utc.with_ymd_and_hms(2025, 4, 15, 0, 0, 0).unwrap();
    /// let series = IntensitySeries::from_values(vec![
    ///     (t0, 400.0),
    ///     (t0 + TimeDelta::minutes(5), 500.0),
    ///     (t0 + TimeDelta::minutes(10), 900.0),
    /// ])
    /// .unwrap();
    ///
    /// let mean = JobIntensityEvaluator::mean_intensity(&series, t0, t0 + TimeDelta::minutes(5)).unwrap();
    /// assert_eq!(mean, 450.0);
    /// ```
    pub fn mean_intensity(
        series: &IntensitySeries,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        Self::mean_of(series.filter(start, end)).ok_or_else(|| CarbonError::NoDataInWindow {
            start,
            end,
            available: series.bounds(),
        })
    }

    /// Arithmetic mean of sample values. `None` for an empty slice.
    pub fn mean_of(samples: &[IntensitySample]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let sum: f64 = samples.iter().map(|s| s.value).sum();
        Some(sum / samples.len() as f64)
    }
}
