//! Error types.
//!
//! Three families:
//! - data quality (`MalformedSeries`, `InvalidSample`), raised when a series
//!   is constructed;
//! - coverage (`NoDataInWindow`, `InsufficientData`), raised when the series
//!   does not reach the requested interval;
//! - caller contract (`InvalidJobSpec`).
//!
//! Coverage errors carry the requested interval and the available data
//! bounds so the caller can widen the flex window or fetch more data.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::models::TimeSpan;

/// Errors produced by the scheduling core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CarbonError {
    #[error("malformed series: duplicate timestamp {timestamp}")]
    MalformedSeries { timestamp: DateTime<Utc> },

    #[error("invalid sample at {timestamp}: value {value} is not a finite, non-negative intensity")]
    InvalidSample { timestamp: DateTime<Utc>, value: f64 },

    #[error("no intensity data in [{start}, {end}] (available: {})", describe(.available))]
    NoDataInWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        available: Option<TimeSpan>,
    },

    #[error(
        "insufficient data: no full {duration} window fits in [{start}, {end}] (available: {})",
        describe(.available)
    )]
    InsufficientData {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        duration: TimeDelta,
        available: Option<TimeSpan>,
    },

    #[error("invalid job spec: {0}")]
    InvalidJobSpec(String),
}

pub type Result<T> = std::result::Result<T, CarbonError>;

fn describe(available: &Option<TimeSpan>) -> String {
    match available {
        Some(span) => format!("{} .. {}", span.start, span.end),
        None => "empty series".to_string(),
    }
}
