//! Deferrable job model.
//!
//! A job has a fixed run length and may start anywhere inside its flex
//! window, provided it also finishes inside it.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::window::delta_ms;
use super::TimeSpan;
use crate::error::{CarbonError, Result};
use crate::validation::validate_job;

/// A deferrable job to be placed in time.
///
/// # Search space
/// `[start_time, start_time + flex_window]`. A start `s` is feasible iff
/// `start_time <= s` and `s + duration <= start_time + flex_window`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Earliest permissible start.
    pub start_time: DateTime<Utc>,
    /// Run length.
    #[serde(rename = "duration_ms", with = "delta_ms")]
    pub duration: TimeDelta,
    /// Span of allowable execution, anchored at `start_time`.
    #[serde(rename = "flex_window_ms", with = "delta_ms")]
    pub flex_window: TimeDelta,
    /// Grid region the job runs in (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl JobSpec {
    /// Creates a job spec. Call [`JobSpec::validate`] (or let the scheduler
    /// do it) before relying on the invariants.
    pub fn new(start_time: DateTime<Utc>, duration: TimeDelta, flex_window: TimeDelta) -> Self {
        Self {
            start_time,
            duration,
            flex_window,
            region: None,
        }
    }

    /// A job that must start exactly at `start_time` (no flexibility).
    pub fn fixed(start_time: DateTime<Utc>, duration: TimeDelta) -> Self {
        Self::new(start_time, duration, duration)
    }

    /// Sets the region tag.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Checks `duration > 0`, `flex_window > 0`, `flex_window >= duration`
    /// and that `start_time + flex_window` is representable.
    pub fn validate(&self) -> Result<()> {
        validate_job(self).map_err(|errors| {
            CarbonError::InvalidJobSpec(
                errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })
    }

    /// The interval of allowable execution.
    ///
    /// Panics on overflow for specs that fail [`JobSpec::validate`].
    pub fn search_space(&self) -> TimeSpan {
        TimeSpan::starting_at(self.start_time, self.flex_window)
    }

    /// Latest feasible start.
    pub fn latest_start(&self) -> DateTime<Utc> {
        self.start_time + (self.flex_window - self.duration)
    }

    /// The run interval if the job starts at `start`.
    pub fn run_at(&self, start: DateTime<Utc>) -> TimeSpan {
        TimeSpan::starting_at(start, self.duration)
    }

    /// Whether starting at `start` keeps the whole run inside the flex window.
    pub fn is_feasible_start(&self, start: DateTime<Utc>) -> bool {
        start >= self.start_time && start <= self.latest_start()
    }
}
