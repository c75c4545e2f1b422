//! Carbon-aware scheduling and decision KPIs.
//!
//! # Pipeline
//!
//! `IntensitySeries` → `JobIntensityEvaluator` (mean intensity over an
//! interval) → `CarbonScheduler` (optimal / median / naive / worst start
//! within a flex window).
//!
//! # KPI
//!
//! `ScheduleKpi` reports what deferring the job saves over running it
//! immediately, optionally converted to grams of CO2 for a known energy
//! draw.

mod carbon;
mod evaluator;
mod kpi;

pub use carbon::CarbonScheduler;
pub use evaluator::JobIntensityEvaluator;
pub use kpi::ScheduleKpi;
