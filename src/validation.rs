//! Input validation for scheduling decisions.
//!
//! Checks integrity of raw intensity samples and job specs before any
//! aggregation runs. Detects:
//! - Duplicate timestamps (ambiguous ordering)
//! - Non-finite or negative intensity values
//! - Non-positive durations and flex windows
//! - Flex windows too short to hold the job
//! - Search spaces past the representable time range
//!
//! Every check runs; the caller receives all issues at once.

use std::collections::HashSet;

use chrono::TimeDelta;

use crate::error::CarbonError;
use crate::models::{IntensitySample, JobSpec};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Offending sample, for sample-level errors.
    pub sample: Option<IntensitySample>,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two samples share the same timestamp.
    DuplicateTimestamp,
    /// A sample value is NaN or infinite.
    NonFiniteValue,
    /// A sample value is below zero.
    NegativeValue,
    /// Job duration is zero or negative.
    NonPositiveDuration,
    /// Flex window is zero or negative.
    NonPositiveFlexWindow,
    /// Flex window cannot hold the job.
    FlexWindowTooShort,
    /// `start_time + flex_window` is not a representable instant.
    SearchSpaceOverflow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sample: None,
        }
    }

    fn for_sample(kind: ValidationErrorKind, message: impl Into<String>, sample: &IntensitySample) -> Self {
        Self {
            sample: Some(sample.clone()),
            ..Self::new(kind, message)
        }
    }
}

impl From<ValidationError> for CarbonError {
    fn from(err: ValidationError) -> Self {
        let ValidationError {
            kind,
            message,
            sample,
        } = err;

        match (kind, sample) {
            (ValidationErrorKind::DuplicateTimestamp, Some(sample)) => {
                CarbonError::MalformedSeries {
                    timestamp: sample.timestamp,
                }
            }
            (
                ValidationErrorKind::NonFiniteValue | ValidationErrorKind::NegativeValue,
                Some(sample),
            ) => CarbonError::InvalidSample {
                timestamp: sample.timestamp,
                value: sample.value,
            },
            // Job-level checks carry no sample.
            (_, _) => CarbonError::InvalidJobSpec(message),
        }
    }
}

/// Validates raw samples in the order given.
///
/// Checks:
/// 1. No two samples share a timestamp
/// 2. Every value is finite
/// 3. Every value is non-negative
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues in
/// sample order.
pub fn validate_samples(samples: &[IntensitySample]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen = HashSet::with_capacity(samples.len());

    for sample in samples {
        if !seen.insert(sample.timestamp) {
            errors.push(ValidationError::for_sample(
                ValidationErrorKind::DuplicateTimestamp,
                format!("Duplicate timestamp: {}", sample.timestamp),
                sample,
            ));
        }

        if !sample.value.is_finite() {
            errors.push(ValidationError::for_sample(
                ValidationErrorKind::NonFiniteValue,
                format!("Non-finite intensity at {}: {}", sample.timestamp, sample.value),
                sample,
            ));
        } else if sample.value < 0.0 {
            errors.push(ValidationError::for_sample(
                ValidationErrorKind::NegativeValue,
                format!("Negative intensity at {}: {}", sample.timestamp, sample.value),
                sample,
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a job spec.
///
/// Checks:
/// 1. `duration > 0`
/// 2. `flex_window > 0`
/// 3. `flex_window >= duration`
/// 4. `start_time + flex_window` does not overflow
pub fn validate_job(job: &JobSpec) -> ValidationResult {
    let mut errors = Vec::new();

    if job.duration <= TimeDelta::zero() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveDuration,
            format!("Job duration must be positive, got {}", job.duration),
        ));
    }

    if job.flex_window <= TimeDelta::zero() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveFlexWindow,
            format!("Job flex window must be positive, got {}", job.flex_window),
        ));
    }

    if job.flex_window < job.duration {
        errors.push(ValidationError::new(
            ValidationErrorKind::FlexWindowTooShort,
            format!(
                "Job flex window {} is shorter than its duration {}",
                job.flex_window, job.duration
            ),
        ));
    }

    if job.start_time.checked_add_signed(job.flex_window).is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::SearchSpaceOverflow,
            format!(
                "Job flex window {} from {} runs past the representable time range",
                job.flex_window, job.start_time
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
