//! Scheduling decision model.
//!
//! A decision scores every candidate window in the job's search space and
//! picks one start per policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeSpan;

/// Start-time selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Lowest mean intensity.
    Optimal,
    /// Lower-middle mean intensity.
    Median,
    /// Earliest start, ignoring carbon.
    Naive,
    /// Highest mean intensity.
    Worst,
}

impl Policy {
    /// All policies in reporting order.
    pub const ALL: [Policy; 4] = [Policy::Optimal, Policy::Median, Policy::Naive, Policy::Worst];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Optimal => "optimal",
            Policy::Median => "median",
            Policy::Naive => "naive",
            Policy::Worst => "worst",
        }
    }
}

/// A duration-length window scored by its mean intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateWindow {
    /// Run interval [start, start + duration).
    pub span: TimeSpan,
    /// Mean intensity over the window (gCO2/kWh).
    pub mean_intensity: f64,
    /// Number of samples averaged.
    pub sample_count: usize,
}

impl CandidateWindow {
    /// Candidate start time (left edge of the window).
    pub fn start_time(&self) -> DateTime<Utc> {
        self.span.start
    }
}

/// A recommended start time and the intensity it incurs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStart {
    pub start_time: DateTime<Utc>,
    /// Mean intensity over the run (gCO2/kWh).
    pub mean_intensity: f64,
}

impl From<&CandidateWindow> for ScheduledStart {
    fn from(window: &CandidateWindow) -> Self {
        Self {
            start_time: window.span.start,
            mean_intensity: window.mean_intensity,
        }
    }
}

/// Outcome of one scheduling decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub optimal: ScheduledStart,
    pub median: ScheduledStart,
    pub naive: ScheduledStart,
    pub worst: ScheduledStart,
    /// The job's search space [start_time, start_time + flex_window].
    pub search_space: TimeSpan,
    /// Every scored window, in start order.
    pub candidates: Vec<CandidateWindow>,
}

impl ScheduleResult {
    /// The start selected by `policy`.
    pub fn get(&self, policy: Policy) -> &ScheduledStart {
        match policy {
            Policy::Optimal => &self.optimal,
            Policy::Median => &self.median,
            Policy::Naive => &self.naive,
            Policy::Worst => &self.worst,
        }
    }

    /// `(policy, start)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Policy, &ScheduledStart)> + '_ {
        Policy::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    /// Number of scored windows.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}
