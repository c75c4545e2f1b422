//! Carbon-aware scheduling domain models.
//!
//! Provides the value types exchanged between the data source, the
//! evaluator, and the scheduler. Everything here is immutable once built
//! and owned by a single decision.
//!
//! | Type | Role |
//! |------|------|
//! | `IntensitySample` | One timestamped gCO2/kWh reading |
//! | `IntensitySeries` | Sorted, validated readings for one region |
//! | `JobSpec` | Duration + flex window anchored at a start time |
//! | `ScheduleResult` | Optimal / median / naive / worst starts |

mod job;
mod outcome;
mod sample;
mod series;
pub(crate) mod window;

pub use job::JobSpec;
pub use outcome::{CandidateWindow, Policy, ScheduleResult, ScheduledStart};
pub use sample::IntensitySample;
pub use series::{IntensitySeries, SampleWindow};
pub use window::TimeSpan;
