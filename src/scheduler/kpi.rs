//! Scheduling decision metrics (KPIs).
//!
//! Quantifies what deferring a job buys relative to running it at once.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Savings vs naive | naive − optimal (gCO2/kWh) |
//! | Savings rate | (naive − optimal) / naive |
//! | Spread | worst − optimal (gCO2/kWh) |
//! | Emissions | mean intensity × energy (gCO2), per policy |

use std::collections::HashMap;

use crate::models::{Policy, ScheduleResult};

/// Decision performance indicators.
///
/// Intensities are in gCO2/kWh, emissions in grams of CO2.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    /// Intensity avoided by choosing optimal over naive.
    pub savings_vs_naive: f64,
    /// Fraction of the naive intensity avoided (0.0..1.0).
    pub savings_rate: f64,
    /// Range between worst and optimal.
    pub spread: f64,
    /// Number of scored windows.
    pub candidate_count: usize,
    /// Estimated emissions per policy; empty unless energy was given.
    pub emissions_by_policy: HashMap<Policy, f64>,
}

impl ScheduleKpi {
    /// Computes intensity-only KPIs from a decision.
    pub fn calculate(result: &ScheduleResult) -> Self {
        let naive = result.naive.mean_intensity;
        let optimal = result.optimal.mean_intensity;
        let savings = naive - optimal;

        let savings_rate = if naive > 0.0 { savings / naive } else { 0.0 };

        Self {
            savings_vs_naive: savings,
            savings_rate,
            spread: result.worst.mean_intensity - optimal,
            candidate_count: result.candidate_count(),
            emissions_by_policy: HashMap::new(),
        }
    }

    /// Adds emission estimates for a job drawing `energy_kwh` over its run.
    ///
    /// Non-finite or negative energy leaves the estimates empty.
    pub fn with_energy(mut self, result: &ScheduleResult, energy_kwh: f64) -> Self {
        self.emissions_by_policy.clear();
        if energy_kwh.is_finite() && energy_kwh >= 0.0 {
            for (policy, start) in result.iter() {
                self.emissions_by_policy
                    .insert(policy, start.mean_intensity * energy_kwh);
            }
        }
        self
    }

    /// Emissions avoided (grams) by optimal over naive, if energy was given.
    pub fn emissions_avoided(&self) -> Option<f64> {
        let naive = self.emissions_by_policy.get(&Policy::Naive)?;
        let optimal = self.emissions_by_policy.get(&Policy::Optimal)?;
        Some(naive - optimal)
    }

    /// Whether deferring is worth it at the given savings rate.
    pub fn meets_threshold(&self, min_savings_rate: f64) -> bool {
        self.savings_rate >= min_savings_rate
    }
}
