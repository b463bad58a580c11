//! # gatesweep
//!
//! Benchmark-sweep harness for concurrent admission-control subjects.
//!
//! The harness drives an externally built program (the "subject") through a
//! grid of configurations (core counts crossed with labeled limiter
//! variants), collects noisy repeated-trial measurements from its textual
//! output, reduces them to mean / population standard deviation summaries,
//! and renders comparative reports (SVG chart + console lines).
//!
//! The subject's algorithms and internal concurrency are out of scope: the
//! harness knows only the positional invocation contract and the
//! line-oriented output grammar.
//!
//! # Modules
//!
//! - [`config`]: sweep description, validation, presets
//! - [`subject`]: invocation seam, process execution, one-time build step
//! - [`parse`]: output grammars and the documented sentinel
//! - [`trial`]: sequential repeated-trial batches with failure tagging
//! - [`stats`]: aggregation to summary statistics
//! - [`sweep`]: grid driving and series assembly
//! - [`report`]: console summaries and SVG chart artifacts
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::Path;
//! use gatesweep::report::{console_summary, render_chart, ChartSpec};
//! use gatesweep::{ProcessSubject, SweepConfig, SweepRunner};
//!
//! let subject = ProcessSubject::new("./subject-exec");
//! let runner = SweepRunner::new(Box::new(subject));
//!
//! let config = SweepConfig::load_sweep();
//! let results = runner.run(&config)?;
//!
//! print!("{}", console_summary(&results));
//! let spec = ChartSpec::for_sweep(&results.config, Path::new("."));
//! let report = render_chart(&results, &spec)?;
//! println!("chart saved to {}", report.path.display());
//! ```

pub mod config;
pub mod error;
pub mod parse;
pub mod report;
pub mod stats;
pub mod subject;
pub mod sweep;
pub mod trial;

pub use config::{MetricKind, SweepConfig, SweepParams, Variant};
pub use error::{ConfigError, DataFailure, HarnessError, StatsError};
pub use parse::{parse_output, Grammar, ParsedOutput, RawSample};
pub use report::{console_summary, render_chart, sweep_caption, ChartSpec, Report};
pub use stats::{aggregate, AggregateResult};
pub use subject::{
    build_subject, Captured, Invocation, ProcessSubject, ScriptedSubject, Subject, Toolchain,
};
pub use sweep::{FailedSeries, Series, SeriesPoint, SweepResults, SweepRunner, TrialLoss};
pub use trial::{run_trials, TrialBatch, TrialOutcome};
