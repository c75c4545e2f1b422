//! Carbon-aware start-time selection for deferrable jobs.
//!
//! Given a grid carbon-intensity time series, a job duration and a flex
//! window, picks the start time that minimizes the job's mean intensity,
//! along with median, naive (start now) and worst starts for comparison.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `IntensitySample`, `IntensitySeries`,
//!   `JobSpec`, `TimeSpan`, `ScheduleResult`
//! - **`scheduler`**: `JobIntensityEvaluator`, `CarbonScheduler`, `ScheduleKpi`
//! - **`validation`**: Input integrity checks (duplicate timestamps, bad
//!   values, malformed job specs)
//! - **`source`**: Data-source boundary and an in-memory source
//! - **`error`**: Error taxonomy
//!
//! # Architecture
//!
//! The core is synchronous and free of I/O. Acquiring readings,
//! plotting, and exporting results belong to the caller. Independent
//! decisions can run in parallel over the same immutable series.
//!
//! # References
//!
//! - Wiesner et al. (2021), "Let's Wait Awhile: How Temporal Workload
//!   Shifting Can Reduce Carbon Emissions in the Cloud"

pub mod error;
pub mod models;
pub mod scheduler;
pub mod source;
pub mod validation;

pub use error::{CarbonError, Result};
