//! Flex-window carbon-aware scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the job spec.
//! 2. Restrict the series to the search space `[start_time, start_time + flex_window]`.
//! 3. Partition time from the first sample in the search space into
//!    contiguous, non-overlapping `duration`-length windows. A window is a
//!    candidate iff it ends no later than the search space end and the
//!    series' coverage end.
//! 4. Score each window by the mean of the samples inside it (half-open
//!    membership, so neighbouring windows never share a sample).
//! 5. Pick optimal (min), worst (max), median (lower middle) and naive
//!    (earliest). Ties on the mean go to the earliest start.
//!
//! # Complexity
//! O(n + w log w) where n = samples in the series, w = candidate windows.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::JobIntensityEvaluator;
use crate::error::{CarbonError, Result};
use crate::models::{
    CandidateWindow, IntensitySeries, JobSpec, ScheduleResult, ScheduledStart,
};

/// Carbon-aware start-time selector.
///
/// Pure: the same series and job always produce the same result, and a
/// scheduler may be shared across threads.
///
/// # Example
///
/// ```
/// use carbon_aware_schedule::models::{IntensitySeries, JobSpec};
/// use carbon_aware_schedule::scheduler::CarbonScheduler;
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let t0 = Utc.with_ymd_and_hms(2025, 4, 15, 0, 0, 0).unwrap();
/// let series = IntensitySeries::from_values(
///     [50.0, 10.0, 30.0, 90.0]
///         .into_iter()
///         .enumerate()
///         .map(|(i, v)| (t0 + TimeDelta::hours(i as i64), v)),
/// )
/// .unwrap();
/// let job = JobSpec::new(t0, TimeDelta::hours(1), TimeDelta::hours(4));
///
/// let result = CarbonScheduler::new().schedule(&series, &job).unwrap();
/// assert_eq!(result.optimal.start_time, t0 + TimeDelta::hours(1));
/// assert_eq!(result.optimal.mean_intensity, 10.0);
/// assert_eq!(result.naive.start_time, t0);
/// ```
#[derive(Debug, Clone)]
pub struct CarbonScheduler {
    min_samples: usize,
}

impl CarbonScheduler {
    /// Creates a scheduler that accepts any window holding at least one sample.
    pub fn new() -> Self {
        Self { min_samples: 1 }
    }

    /// Sets the minimum number of samples a window needs to be scored.
    ///
    /// Sparser windows are treated as data gaps and skipped. Values below 1
    /// are raised to 1. Naive is the earliest window that survives this
    /// filter, so a sparse first window moves naive to a later start.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples.max(1);
        self
    }

    /// Minimum samples per scored window.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Scores every feasible window in the job's search space.
    ///
    /// Returns candidates in start order.
    ///
    /// # Errors
    /// - [`CarbonError::InvalidJobSpec`] if the job fails validation.
    /// - [`CarbonError::InsufficientData`] if no full-duration window with
    ///   enough samples fits in the search space.
    pub fn candidates(
        &self,
        series: &IntensitySeries,
        job: &JobSpec,
    ) -> Result<Vec<CandidateWindow>> {
        job.validate()?;

        let space = job.search_space();
        let Some(origin) = series.filter(space.start, space.end).first() else {
            return Err(insufficient_data(series, job));
        };

        let limit = match series.coverage_end() {
            Some(coverage_end) => coverage_end.min(space.end),
            None => space.end,
        };

        let windows = series.partition(origin.timestamp, job.duration, limit);
        let mut candidates = Vec::with_capacity(windows.len());

        for window in &windows {
            let samples = series.window_samples(window);
            if samples.len() < self.min_samples {
                warn!(
                    start = %window.span.start,
                    end = %window.span.end,
                    samples = samples.len(),
                    required = self.min_samples,
                    "skipping window with insufficient samples"
                );
                continue;
            }
            let Some(mean_intensity) = JobIntensityEvaluator::mean_of(samples) else {
                continue;
            };
            candidates.push(CandidateWindow {
                span: window.span,
                mean_intensity,
                sample_count: samples.len(),
            });
        }

        if candidates.is_empty() {
            return Err(insufficient_data(series, job));
        }

        debug!(
            region = series.region().unwrap_or("-"),
            windows = windows.len(),
            candidates = candidates.len(),
            "scored candidate windows"
        );
        Ok(candidates)
    }

    /// Selects optimal, median, naive and worst starts for a job.
    ///
    /// # Selection
    /// - optimal: minimum mean, earliest start on ties
    /// - worst: maximum mean, earliest start on ties
    /// - median: lower middle of candidates ordered by (mean, start)
    /// - naive: earliest candidate
    ///
    /// # Errors
    /// Same as [`CarbonScheduler::candidates`].
    pub fn schedule(&self, series: &IntensitySeries, job: &JobSpec) -> Result<ScheduleResult> {
        let candidates = self.candidates(series, job)?;

        let naive = ScheduledStart::from(&candidates[0]);
        let optimal = ScheduledStart::from(select(&candidates, |candidate, best| candidate < best));
        let worst = ScheduledStart::from(select(&candidates, |candidate, best| candidate > best));

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            candidates[a]
                .mean_intensity
                .total_cmp(&candidates[b].mean_intensity)
                .then_with(|| candidates[a].span.start.cmp(&candidates[b].span.start))
        });
        let median = ScheduledStart::from(&candidates[order[(order.len() - 1) / 2]]);

        let result = ScheduleResult {
            optimal,
            median,
            naive,
            worst,
            search_space: job.search_space(),
            candidates,
        };

        info!(
            region = series.region().or(job.region.as_deref()).unwrap_or("-"),
            optimal_start = %result.optimal.start_time,
            optimal_intensity = result.optimal.mean_intensity,
            naive_intensity = result.naive.mean_intensity,
            candidates = result.candidates.len(),
            "job scheduled"
        );
        Ok(result)
    }

    /// Mean intensity if the job starts exactly at `start`.
    ///
    /// Uses the inclusive `[start, start + duration]` lookup of
    /// [`JobIntensityEvaluator::mean_intensity`], so a reading at exactly
    /// `start + duration` is counted. This can differ from the mean of the
    /// same start in [`CarbonScheduler::schedule`], whose windows are half-open.
    pub fn intensity_at(
        &self,
        series: &IntensitySeries,
        job: &JobSpec,
        start: DateTime<Utc>,
    ) -> Result<ScheduledStart> {
        job.validate()?;
        if !job.is_feasible_start(start) {
            return Err(CarbonError::InvalidJobSpec(format!(
                "start {start} is outside the feasible range [{}, {}]",
                job.start_time,
                job.latest_start()
            )));
        }
        let run = job.run_at(start);
        let mean_intensity = JobIntensityEvaluator::mean_intensity(series, run.start, run.end)?;
        Ok(ScheduledStart {
            start_time: start,
            mean_intensity,
        })
    }
}

impl Default for CarbonScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// First candidate (in start order) that no later candidate beats.
fn select(
    candidates: &[CandidateWindow],
    beats: impl Fn(f64, f64) -> bool,
) -> &CandidateWindow {
    candidates[1..].iter().fold(&candidates[0], |best, candidate| {
        if beats(candidate.mean_intensity, best.mean_intensity) {
            candidate
        } else {
            best
        }
    })
}

fn insufficient_data(series: &IntensitySeries, job: &JobSpec) -> CarbonError {
    let space = job.search_space();
    CarbonError::InsufficientData {
        start: space.start,
        end: space.end,
        duration: job.duration,
        available: series.bounds(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSpan;
    use chrono::{TimeDelta, TimeZone};

    fn at(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 15, 0, 0, 0).unwrap() + TimeDelta::hours(hour)
    }

    fn hourly(values: &[f64]) -> IntensitySeries {
        IntensitySeries::from_values(
            values.iter().enumerate().map(|(i, &v)| (at(i as i64), v)),
        )
        .unwrap()
    }

    fn job(start: i64, duration_h: i64, flex_h: i64) -> JobSpec {
        JobSpec::new(at(start), TimeDelta::hours(duration_h), TimeDelta::hours(flex_h))
    }

    #[test]
    fn test_four_policies() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0]);
        let result = CarbonScheduler::new().schedule(&series, &job(0, 1, 4)).unwrap();

        assert_eq!(result.optimal, ScheduledStart { start_time: at(1), mean_intensity: 10.0 });
        assert_eq!(result.worst, ScheduledStart { start_time: at(3), mean_intensity: 90.0 });
        assert_eq!(result.naive, ScheduledStart { start_time: at(0), mean_intensity: 50.0 });
        assert_eq!(result.median, ScheduledStart { start_time: at(2), mean_intensity: 30.0 });
        assert_eq!(result.candidate_count(), 4);
    }

    #[test]
    fn test_multi_hour_windows() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0, 20.0, 20.0]);
        let result = CarbonScheduler::new().schedule(&series, &job(0, 2, 6)).unwrap();

        // [0,2) = 30, [2,4) = 60, [4,6) = 20
        let means: Vec<f64> = result.candidates.iter().map(|c| c.mean_intensity).collect();
        assert_eq!(means, vec![30.0, 60.0, 20.0]);
        assert_eq!(result.optimal.start_time, at(4));
        assert_eq!(result.worst.start_time, at(2));
        assert_eq!(result.median.start_time, at(0));
        assert_eq!(result.naive.start_time, at(0));
    }

    #[test]
    fn test_flex_window_bounds_search_space() {
        // The cleanest hour (5.0) lies outside the flex window.
        let series = hourly(&[50.0, 40.0, 30.0, 5.0]);
        let result = CarbonScheduler::new().schedule(&series, &job(0, 1, 3)).unwrap();
        assert_eq!(result.candidate_count(), 3);
        assert_eq!(result.optimal, ScheduledStart { start_time: at(2), mean_intensity: 30.0 });
        assert_eq!(result.search_space, TimeSpan::new(at(0), at(3)));
    }

    #[test]
    fn test_start_time_anchors_search_space() {
        let series = hourly(&[5.0, 40.0, 30.0, 60.0, 70.0]);
        let result = CarbonScheduler::new().schedule(&series, &job(1, 1, 3)).unwrap();
        assert_eq!(result.naive.start_time, at(1));
        assert_eq!(result.optimal.start_time, at(2));
        assert!(result.candidates.iter().all(|c| c.span.start >= at(1)));
    }

    #[test]
    fn test_job_fits_in_flex_window() {
        let series = hourly(&[1.0; 10]);
        let j = job(0, 3, 8);
        let result = CarbonScheduler::new().schedule(&series, &j).unwrap();
        // [0,3) and [3,6); [6,9) would finish after the flex window
        assert_eq!(result.candidate_count(), 2);
        assert!(result
            .candidates
            .iter()
            .all(|c| j.search_space().encloses(&c.span)));
    }

    #[test]
    fn test_exact_flex_single_candidate() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0]);
        let result = CarbonScheduler::new()
            .schedule(&series, &JobSpec::fixed(at(1), TimeDelta::hours(2)))
            .unwrap();
        assert_eq!(result.candidate_count(), 1);
        assert_eq!(result.optimal, result.naive);
        assert_eq!(result.median, result.naive);
        assert_eq!(result.worst, result.naive);
        assert_eq!(result.optimal.mean_intensity, 20.0);
    }

    #[test]
    fn test_ties_go_to_earliest() {
        let series = hourly(&[20.0, 10.0, 10.0, 30.0, 30.0]);
        let result = CarbonScheduler::new().schedule(&series, &job(0, 1, 5)).unwrap();
        assert_eq!(result.optimal.start_time, at(1));
        assert_eq!(result.worst.start_time, at(3));
        // sorted: 10@1, 10@2, 20@0, 30@3, 30@4 -> lower middle index 2
        assert_eq!(result.median.start_time, at(0));
    }

    #[test]
    fn test_even_count_lower_median() {
        let series = hourly(&[40.0, 10.0, 30.0, 20.0]);
        let result = CarbonScheduler::new().schedule(&series, &job(0, 1, 4)).unwrap();
        // sorted 10, 20, 30, 40 -> lower middle 20
        assert_eq!(result.median, ScheduledStart { start_time: at(3), mean_intensity: 20.0 });
    }

    #[test]
    fn test_duration_longer_than_series() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0]);
        let err = CarbonScheduler::new().schedule(&series, &job(0, 5, 6)).unwrap_err();
        assert_eq!(
            err,
            CarbonError::InsufficientData {
                start: at(0),
                end: at(6),
                duration: TimeDelta::hours(5),
                available: Some(TimeSpan::new(at(0), at(3))),
            }
        );
    }

    #[test]
    fn test_no_samples_in_search_space() {
        let series = hourly(&[50.0, 10.0]);
        let err = CarbonScheduler::new().schedule(&series, &job(5, 1, 2)).unwrap_err();
        assert!(matches!(err, CarbonError::InsufficientData { .. }));

        let empty = IntensitySeries::new(Vec::new()).unwrap();
        let err = CarbonScheduler::new().schedule(&empty, &job(0, 1, 2)).unwrap_err();
        assert!(matches!(err, CarbonError::InsufficientData { available: None, .. }));
    }

    #[test]
    fn test_invalid_job_spec() {
        let series = hourly(&[50.0, 10.0]);
        let err = CarbonScheduler::new().schedule(&series, &job(0, 2, 1)).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidJobSpec(_)));

        let err = CarbonScheduler::new().schedule(&series, &job(0, 0, 1)).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidJobSpec(_)));
    }

    #[test]
    fn test_unrepresentable_flex_window() {
        let series = hourly(&[50.0, 10.0]);
        let j = JobSpec::new(at(0), TimeDelta::hours(1), TimeDelta::MAX);
        let scheduler = CarbonScheduler::new();

        let err = scheduler.schedule(&series, &j).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidJobSpec(_)));
        let err = scheduler.intensity_at(&series, &j, at(0)).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidJobSpec(_)));
    }

    #[test]
    fn test_coverage_boundary() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0]);
        let scheduler = CarbonScheduler::new();

        // Four hourly readings cover [0h, 4h).
        let result = scheduler
            .schedule(&series, &JobSpec::fixed(at(0), TimeDelta::hours(4)))
            .unwrap();
        assert_eq!(result.candidate_count(), 1);
        assert_eq!(result.optimal.mean_intensity, 45.0);

        let one_ms_over = TimeDelta::hours(4) + TimeDelta::milliseconds(1);
        let err = scheduler
            .schedule(&series, &JobSpec::fixed(at(0), one_ms_over))
            .unwrap_err();
        assert!(matches!(err, CarbonError::InsufficientData { duration, .. } if duration == one_ms_over));
    }

    #[test]
    fn test_gap_windows_skipped() {
        let series = IntensitySeries::from_values(vec![
            (at(0), 40.0),
            (at(2), 20.0),
            (at(3), 60.0),
        ])
        .unwrap();
        let result = CarbonScheduler::new().schedule(&series, &job(0, 1, 4)).unwrap();
        let starts: Vec<_> = result.candidates.iter().map(|c| c.start_time()).collect();
        assert_eq!(starts, vec![at(0), at(2), at(3)]);
        assert_eq!(result.optimal.start_time, at(2));
    }

    #[test]
    fn test_min_samples() {
        let five_min = |i: i64| at(0) + TimeDelta::minutes(5 * i);
        // First hour fully sampled, second hour only two readings.
        let mut values: Vec<_> = (0..12).map(|i| (five_min(i), 100.0)).collect();
        values.push((five_min(12), 1.0));
        values.push((five_min(23), 1.0));
        let series = IntensitySeries::from_values(values)
            .unwrap()
            .with_resolution(TimeDelta::minutes(5));

        let j = JobSpec::new(at(0), TimeDelta::hours(1), TimeDelta::hours(2));
        let lenient = CarbonScheduler::new().schedule(&series, &j).unwrap();
        assert_eq!(lenient.candidate_count(), 2);
        assert_eq!(lenient.optimal.start_time, at(1));
        assert_eq!(lenient.candidates[1].sample_count, 2);

        let strict = CarbonScheduler::new().with_min_samples(12);
        assert_eq!(strict.min_samples(), 12);
        let result = strict.schedule(&series, &j).unwrap();
        assert_eq!(result.candidate_count(), 1);
        assert_eq!(result.optimal.start_time, at(0));
    }

    #[test]
    fn test_sparse_first_window_moves_naive() {
        let five_min = |i: i64| at(0) + TimeDelta::minutes(5 * i);
        // First hour only two readings, second hour fully sampled.
        let mut values = vec![(five_min(0), 1.0), (five_min(6), 1.0)];
        values.extend((12..24).map(|i| (five_min(i), 100.0)));
        let series = IntensitySeries::from_values(values)
            .unwrap()
            .with_resolution(TimeDelta::minutes(5));
        let j = JobSpec::new(at(0), TimeDelta::hours(1), TimeDelta::hours(2));

        let lenient = CarbonScheduler::new().schedule(&series, &j).unwrap();
        assert_eq!(lenient.naive.start_time, at(0));

        let strict = CarbonScheduler::new().with_min_samples(12).schedule(&series, &j).unwrap();
        assert_eq!(strict.candidate_count(), 1);
        assert_eq!(strict.naive, ScheduledStart { start_time: at(1), mean_intensity: 100.0 });
    }

    #[test]
    fn test_idempotent() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0, 15.0, 70.0]);
        let scheduler = CarbonScheduler::new();
        let a = scheduler.schedule(&series, &job(0, 2, 6)).unwrap();
        let b = scheduler.schedule(&series, &job(0, 2, 6)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_intensity_at() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0]);
        let j = job(0, 1, 4);
        let s = CarbonScheduler::new().intensity_at(&series, &j, at(1)).unwrap();
        assert_eq!(s.mean_intensity, 20.0); // inclusive: samples at 1h and 2h

        // The scheduled window [1h, 2h) holds only the 1h reading.
        let result = CarbonScheduler::new().schedule(&series, &j).unwrap();
        assert_eq!(result.optimal, ScheduledStart { start_time: at(1), mean_intensity: 10.0 });

        let err = CarbonScheduler::new().intensity_at(&series, &j, at(4)).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidJobSpec(_)));
    }

    #[test]
    fn test_parallel_decisions_share_series() {
        let series = hourly(&[50.0, 10.0, 30.0, 90.0, 15.0, 70.0]);
        let scheduler = CarbonScheduler::new();
        let jobs = vec![job(0, 1, 6), job(1, 2, 4), job(2, 1, 3)];
        let (series_ref, scheduler_ref) = (&series, &scheduler);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|j| scope.spawn(move || scheduler_ref.schedule(series_ref, j)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (j, result) in jobs.iter().zip(results) {
            assert_eq!(result.unwrap(), scheduler.schedule(&series, j).unwrap());
        }
    }
}
