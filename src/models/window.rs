//! Time span model.
//!
//! # Time Model
//! All instants are timezone-aware UTC (`DateTime<Utc>`). Providers report
//! readings in UTC; callers holding local times convert before building
//! spans.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end. Use
/// [`TimeSpan::contains_inclusive`] where both ends count (source range
/// queries, feasible start ranges).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeSpan {
    /// Creates a new time span.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Creates a span of `length` starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, length: TimeDelta) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    /// Length of this span.
    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether an instant falls within [start, end].
    #[inline]
    pub fn contains_inclusive(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn encloses(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// Serde adapter storing a `TimeDelta` as whole milliseconds.
pub(crate) mod delta_ms {
    use chrono::TimeDelta;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Rejects millisecond counts outside the `TimeDelta` range.
    pub(super) fn from_ms<E: Error>(ms: i64) -> Result<TimeDelta, E> {
        TimeDelta::try_milliseconds(ms)
            .ok_or_else(|| E::custom(format!("duration of {ms} ms is out of range")))
    }

    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(delta.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        from_ms(i64::deserialize(deserializer)?)
    }

    /// Same encoding for optional fields.
    pub mod option {
        use chrono::TimeDelta;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::from_ms;

        pub fn serialize<S: Serializer>(
            delta: &Option<TimeDelta>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match delta {
                Some(d) => serializer.serialize_some(&d.num_milliseconds()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<TimeDelta>, D::Error> {
            Option::<i64>::deserialize(deserializer)?
                .map(from_ms)
                .transpose()
        }
    }
}
