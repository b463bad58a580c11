//! Report rendering: console summaries and persisted chart artifacts.
//!
//! A sweep's results become two things: a line-oriented console summary
//! (one line per configuration point) and an SVG chart written to a
//! caller-specified path. The chart carries the fixed secondary parameters
//! as a caption so an artifact is interpretable on its own.

mod svg;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{MetricKind, SweepConfig};
use crate::error::HarnessError;
use crate::sweep::SweepResults;

/// Chart styling and destination.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub path: PathBuf,
    pub y_label: String,
    /// Decorate each point with a ±1 standard deviation error bar.
    pub error_bars: bool,
}

impl ChartSpec {
    /// Derive title, y-axis label, and file name from the sweep's metric.
    pub fn for_sweep(config: &SweepConfig, dir: &Path) -> Self {
        let (title, file) = match config.metric {
            MetricKind::AccuracyPercent => {
                ("Admission Accuracy by Core Count", "sweep_accuracy.svg")
            }
            MetricKind::ElapsedNanos { per_request: true } => {
                ("Per-Request Latency by Core Count", "sweep_latency.svg")
            }
            MetricKind::ElapsedNanos { per_request: false } => {
                ("Elapsed Time by Core Count", "sweep_latency.svg")
            }
        };
        Self {
            title: title.to_string(),
            path: dir.join(file),
            y_label: config.metric.axis_label().to_string(),
            error_bars: true,
        }
    }
}

/// The materialized report artifact. Created at the end of a sweep; never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub path: PathBuf,
    pub title: String,
    pub caption: String,
}

/// Caption naming the fixed secondary parameters of the sweep.
pub fn sweep_caption(config: &SweepConfig) -> String {
    let p = &config.params;
    match config.metric {
        MetricKind::AccuracyPercent => format!(
            "Runtime: {}s, Refill Rate: {}, Capacity: {}",
            p.duration, p.refill_rate, p.capacity
        ),
        MetricKind::ElapsedNanos { .. } => format!(
            "Requests: {}, Refill Rate: {}, Capacity: {}",
            p.duration, p.refill_rate, p.capacity
        ),
    }
}

/// Render the chart for one sweep and persist it to `spec.path`.
///
/// All series share the sweep's core-count axis; each surviving variant
/// becomes one line (with optional error bars). The only side effect is the
/// file write.
pub fn render_chart(results: &SweepResults, spec: &ChartSpec) -> Result<Report, HarnessError> {
    let caption = sweep_caption(&results.config);
    let document = svg::render(results, spec, &caption);
    fs::write(&spec.path, document).map_err(|source| HarnessError::Report {
        path: spec.path.clone(),
        source,
    })?;
    Ok(Report {
        path: spec.path.clone(),
        title: spec.title.clone(),
        caption,
    })
}

/// One console line per configuration point, in the documented formats:
///
/// ```text
/// <Label> - Cores: <n>, Avg Percentage: <p>%, Std Dev: <s>%
/// <Label> Performance <n> cores: <mean> ± <std>
/// ```
pub fn console_summary(results: &SweepResults) -> String {
    let mut out = String::new();
    for series in &results.series {
        for point in &series.points {
            match results.config.metric {
                MetricKind::AccuracyPercent => writeln!(
                    out,
                    "{} - Cores: {}, Avg Percentage: {:.3}%, Std Dev: {:.3}%",
                    series.label, point.cores, point.result.mean, point.result.std_dev
                ),
                MetricKind::ElapsedNanos { .. } => writeln!(
                    out,
                    "{} Performance {} cores: {:.3} ± {:.3}",
                    series.label, point.cores, point.result.mean, point.result.std_dev
                ),
            }
            .ok();
        }
    }
    out
}
