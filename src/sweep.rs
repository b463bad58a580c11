//! Sweep driving: the Cartesian grid and series assembly.
//!
//! The driver iterates variants outer, cores inner, both in input order.
//! The order is part of the contract: repeated runs of the same
//! configuration produce identically ordered series, so result dumps can be
//! diffed.
//!
//! Per grid point the driver runs a trial batch, aggregates the valid
//! samples, and appends the result to the variant's series. A point with no
//! valid samples aborts only that variant's series; the sweep continues
//! with the remaining variants. Only an unstartable subject aborts the
//! whole sweep.

use serde::Serialize;

use crate::config::SweepConfig;
use crate::error::{HarnessError, StatsError};
use crate::stats::{aggregate, AggregateResult};
use crate::subject::{Invocation, Subject};
use crate::trial::run_trials;

/// Type alias for progress callback to reduce type complexity.
type ProgressCallback = Box<dyn Fn(f64, &str) + Send + Sync>;

/// One aggregated point in a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub cores: u32,
    pub result: AggregateResult,
}

/// A variant label plus its ordered aggregated points. Built by exactly one
/// sweep run; immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

/// A variant whose series could not be completed, with the point that
/// killed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSeries {
    pub label: String,
    pub cores: u32,
    pub error: StatsError,
}

/// Per-point record of trials discarded as data failures. Feeds the
/// partial-data warnings so discarded trials are visible next to the
/// results they were excluded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialLoss {
    pub label: String,
    pub cores: u32,
    pub failed: usize,
    pub trials: usize,
}

/// Everything one sweep run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResults {
    /// The configuration the sweep ran with, echoed for reports.
    pub config: SweepConfig,
    /// One series per surviving variant, in variant input order.
    pub series: Vec<Series>,
    /// Variants whose series aborted.
    pub failed: Vec<FailedSeries>,
    /// Points where some (but not necessarily all) trials were discarded.
    pub losses: Vec<TrialLoss>,
}

/// Drives a full sweep against one subject.
pub struct SweepRunner {
    subject: Box<dyn Subject>,
    progress: Option<ProgressCallback>,
}

impl SweepRunner {
    pub fn new(subject: Box<dyn Subject>) -> Self {
        Self {
            subject,
            progress: None,
        }
    }

    /// Set a progress callback, called after every trial batch with the
    /// completed fraction and a short task description.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64, &str) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    fn report_progress(&self, fraction: f64, task: &str) {
        if let Some(ref callback) = self.progress {
            callback(fraction, task);
        }
    }

    /// Run the full grid and assemble one series per variant.
    pub fn run(&self, config: &SweepConfig) -> Result<SweepResults, HarnessError> {
        config.validate()?;

        let grammar = config.metric.grammar();
        let total = config.total_trials() as f64;
        let mut completed = 0usize;

        let mut series = Vec::with_capacity(config.variants.len());
        let mut failed = Vec::new();
        let mut losses = Vec::new();

        for variant in &config.variants {
            let mut points = Vec::with_capacity(config.cores.len());
            let mut aborted = None;

            for &cores in &config.cores {
                let invocation = Invocation {
                    selector: variant.selector.clone(),
                    cores,
                    variant_id: variant.variant_id,
                    params: config.params,
                };
                let batch =
                    run_trials(self.subject.as_ref(), &invocation, grammar, config.trials)?;

                completed += config.trials;
                self.report_progress(
                    completed as f64 / total,
                    &format!("{} @ {} cores", variant.label, cores),
                );

                if batch.failure_count() > 0 {
                    losses.push(TrialLoss {
                        label: variant.label.clone(),
                        cores,
                        failed: batch.failure_count(),
                        trials: config.trials,
                    });
                }

                match aggregate(
                    &batch.valid_samples(),
                    config.metric,
                    config.params.duration,
                ) {
                    Ok(result) => points.push(SeriesPoint { cores, result }),
                    Err(error) => {
                        aborted = Some(FailedSeries {
                            label: variant.label.clone(),
                            cores,
                            error,
                        });
                        break;
                    }
                }
            }

            match aborted {
                Some(failure) => failed.push(failure),
                None => series.push(Series {
                    label: variant.label.clone(),
                    points,
                }),
            }
        }

        Ok(SweepResults {
            config: config.clone(),
            series,
            failed,
            losses,
        })
    }
}
