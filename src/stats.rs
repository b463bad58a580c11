//! Reduction of raw trial samples to summary statistics.
//!
//! Aggregation computes the arithmetic mean and the population standard
//! deviation (divide by n, not n-1) over the metric scalar: the accuracy
//! percentage `actual / expected * 100` for throughput samples, or raw /
//! per-request-normalized nanoseconds for timing samples.

use serde::Serialize;

use crate::config::MetricKind;
use crate::error::StatsError;
use crate::parse::RawSample;

/// Summary statistics for one configuration point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateResult {
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Number of samples the summary was computed over.
    pub samples: usize,
}

/// Reduce an ordered sequence of same-kind samples to summary statistics.
///
/// `duration` is the caller-supplied normalization divisor for
/// `MetricKind::ElapsedNanos { per_request: true }` (the request count of
/// the sweep); it is unused otherwise. Fails with
/// [`StatsError::InsufficientData`] on empty input and
/// [`StatsError::UndefinedRatio`] when any throughput sample carries an
/// expected count of zero.
pub fn aggregate(
    samples: &[RawSample],
    metric: MetricKind,
    duration: u64,
) -> Result<AggregateResult, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::InsufficientData);
    }

    let mut values = Vec::with_capacity(samples.len());
    for (trial, sample) in samples.iter().enumerate() {
        values.push(metric_scalar(*sample, metric, duration, trial)?);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    Ok(AggregateResult {
        mean,
        std_dev: variance.sqrt(),
        samples: values.len(),
    })
}

/// Extract the metric scalar from one sample.
fn metric_scalar(
    sample: RawSample,
    metric: MetricKind,
    duration: u64,
    trial: usize,
) -> Result<f64, StatsError> {
    match (metric, sample) {
        (MetricKind::AccuracyPercent, RawSample::Throughput { expected, actual }) => {
            if expected == 0.0 {
                return Err(StatsError::UndefinedRatio { trial });
            }
            Ok(actual as f64 / expected * 100.0)
        }
        (MetricKind::ElapsedNanos { per_request }, RawSample::Timing { nanos }) => {
            if per_request {
                Ok(nanos as f64 / duration as f64)
            } else {
                Ok(nanos as f64)
            }
        }
        _ => Err(StatsError::KindMismatch { trial }),
    }
}
