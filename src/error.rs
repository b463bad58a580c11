//! Error types for the harness.
//!
//! The taxonomy separates fatal classes (which abort the whole run) from
//! scoped classes (which are recorded alongside valid results so a partial
//! sweep still produces a report):
//!
//! - [`HarnessError`]: fatal. Build failures, an unstartable subject, or an
//!   artifact write that did not land.
//! - [`ConfigError`]: fatal, raised before any measurement.
//! - [`DataFailure`]: scoped to one trial. Never cancels the batch.
//! - [`StatsError`]: scoped to one configuration point. Aborts only the
//!   affected variant's series.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fatal errors that abort a run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The subject's compiler rejected the source. The diagnostic is the
    /// compiler's stderr, verbatim.
    #[error("subject build failed:\n{diagnostic}")]
    BuildFailure { diagnostic: String },

    /// The toolchain or subject binary could not be started at all
    /// (missing file, permission). No measurement is possible.
    #[error("failed to start {program}: {source}")]
    ExecutionFailure {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A report artifact could not be written.
    #[error("failed to write report to {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sweep configuration violated an invariant.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Violations of `SweepConfig` invariants, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("core list must not be empty")]
    EmptyCores,

    /// The independent-variable axis must be strictly increasing so every
    /// series shares a monotonic x-axis.
    #[error("core list must be strictly increasing: {prev} precedes {next}")]
    UnorderedCores { prev: u32, next: u32 },

    #[error("variant list must not be empty")]
    EmptyVariants,

    #[error("trial count must be at least 1")]
    ZeroTrials,

    /// Duration doubles as the per-request normalization divisor, so it
    /// cannot be zero.
    #[error("duration must be at least 1")]
    ZeroDuration,
}

/// Why a single trial produced no usable measurement.
///
/// Recorded per trial in the batch; one bad trial never discards the rest
/// of the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataFailure {
    /// The subject exited non-zero. Stderr is kept for diagnostics.
    #[error("subject exited with {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// No line of the subject's output matched the expected grammar.
    #[error("subject output matched no recognized grammar")]
    Unparsable,

    /// The bounded wait expired and the subject was killed.
    #[error("subject exceeded the invocation timeout and was killed")]
    TimedOut,
}

/// Errors from reducing a sample batch to summary statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum StatsError {
    /// The point has zero valid samples; there is nothing to aggregate.
    #[error("no valid samples to aggregate")]
    InsufficientData,

    /// A sample's expected count is zero, so the accuracy ratio is
    /// mathematically undefined. Rejected explicitly rather than letting a
    /// NaN or infinity flow into the mean.
    #[error("expected count is zero in trial {trial}; accuracy ratio undefined")]
    UndefinedRatio { trial: usize },

    /// A sample's kind does not match the requested metric.
    #[error("sample from trial {trial} does not match the requested metric")]
    KindMismatch { trial: usize },
}
