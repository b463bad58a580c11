//! Sweep configuration: the immutable description of one benchmark run.
//!
//! A [`SweepConfig`] names the core counts to sweep (the independent
//! variable), the labeled subject variants to compare, how many trials to
//! repeat per grid point, the fixed secondary parameters threaded through
//! every invocation, and which metric the sweep measures. Constructed once
//! from caller input and never mutated.
//!
//! Presets reproduce the two standard sweeps: [`SweepConfig::load_sweep`]
//! (admission accuracy under sustained load) and
//! [`SweepConfig::performance_sweep`] (per-request latency).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::parse::Grammar;

/// A labeled subject variant: one admission-control implementation under
/// test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Human-readable label used in legends and console lines.
    pub label: String,
    /// Benchmark mode selector passed as the subject's first argument.
    pub selector: String,
    /// Integer enum identifying the implementation inside the subject.
    pub variant_id: u32,
}

impl Variant {
    pub fn new(label: &str, selector: &str, variant_id: u32) -> Self {
        Self {
            label: label.to_string(),
            selector: selector.to_string(),
            variant_id,
        }
    }
}

/// Fixed secondary parameters threaded through every invocation and echoed
/// in chart captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepParams {
    /// Seconds in accuracy mode, request count in latency mode.
    pub duration: u64,
    /// Tokens added per second.
    pub refill_rate: u64,
    /// Bucket capacity.
    pub capacity: u64,
}

/// Which scalar the sweep measures and how it is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Ratio actual/expected admissions as a percentage
    /// (throughput-accuracy grammar).
    AccuracyPercent,
    /// Elapsed wall time in nanoseconds (timing grammar). With
    /// `per_request` the elapsed time is divided by the configured duration
    /// (a request count in this mode) to yield a ns/request rate.
    ElapsedNanos { per_request: bool },
}

impl MetricKind {
    /// The output grammar this metric expects from the subject.
    pub fn grammar(self) -> Grammar {
        match self {
            Self::AccuracyPercent => Grammar::Throughput,
            Self::ElapsedNanos { .. } => Grammar::Timing,
        }
    }

    /// Y-axis label for charts.
    pub fn axis_label(self) -> &'static str {
        match self {
            Self::AccuracyPercent => "Percentage of Expected Admissions",
            Self::ElapsedNanos { per_request: true } => "Time per Request (ns)",
            Self::ElapsedNanos { per_request: false } => "Elapsed Time (ns)",
        }
    }
}

/// Immutable description of one benchmark run request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Independent-variable axis; non-empty and strictly increasing.
    pub cores: Vec<u32>,
    /// Labeled variants to compare; non-empty. One series per variant.
    pub variants: Vec<Variant>,
    /// Trial repetitions per grid point; at least 1.
    pub trials: usize,
    pub params: SweepParams,
    pub metric: MetricKind,
}

impl SweepConfig {
    /// Build a validated configuration.
    pub fn new(
        cores: Vec<u32>,
        variants: Vec<Variant>,
        trials: usize,
        params: SweepParams,
        metric: MetricKind,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            cores,
            variants,
            trials,
            params,
            metric,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant. Also called by the sweep driver so that
    /// hand-assembled or deserialized configs cannot bypass validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cores.is_empty() {
            return Err(ConfigError::EmptyCores);
        }
        for pair in self.cores.windows(2) {
            if pair[0] >= pair[1] {
                return Err(ConfigError::UnorderedCores {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        if self.variants.is_empty() {
            return Err(ConfigError::EmptyVariants);
        }
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.params.duration == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }

    /// Standard accuracy sweep: every limiter variant hammered for a fixed
    /// number of seconds, measuring how close admitted counts track the
    /// refill budget.
    pub fn load_sweep() -> Self {
        Self {
            cores: vec![1, 2, 4, 8, 32, 64],
            variants: vec![
                Variant::new("Naive", "TokenBucketLoad", 1),
                Variant::new("Atomic", "TokenBucketLoad", 2),
                Variant::new("Locked", "TokenBucketLoad", 3),
                Variant::new("Sharded", "TokenBucketLoad", 4),
                Variant::new("Cascade", "CascadeLoad", 1),
            ],
            trials: 3,
            params: SweepParams {
                duration: 10,
                refill_rate: 10,
                capacity: 10,
            },
            metric: MetricKind::AccuracyPercent,
        }
    }

    /// Standard latency sweep: a fixed request count per core, measuring
    /// mean wall time per admission decision.
    pub fn performance_sweep() -> Self {
        Self {
            cores: vec![1, 2, 4, 8, 32, 64],
            variants: vec![
                Variant::new("Naive", "TokenBucketPerf", 1),
                Variant::new("Atomic", "TokenBucketPerf", 2),
                Variant::new("Locked", "TokenBucketPerf", 3),
                Variant::new("Sharded", "TokenBucketPerf", 4),
                Variant::new("Cascade", "CascadePerf", 1),
            ],
            trials: 20,
            params: SweepParams {
                duration: 1_000_000,
                refill_rate: 100,
                capacity: 10,
            },
            metric: MetricKind::ElapsedNanos { per_request: true },
        }
    }

    /// Number of grid points (cores × variants).
    pub fn total_points(&self) -> usize {
        self.cores.len() * self.variants.len()
    }

    /// Number of subject invocations a full sweep performs.
    pub fn total_trials(&self) -> usize {
        self.total_points() * self.trials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(SweepConfig::load_sweep().validate().is_ok());
        assert!(SweepConfig::performance_sweep().validate().is_ok());
    }

    #[test]
    fn rejects_empty_cores() {
        let mut config = SweepConfig::load_sweep();
        config.cores.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyCores));
    }

    #[test]
    fn rejects_unordered_cores() {
        let mut config = SweepConfig::load_sweep();
        config.cores = vec![1, 4, 2];
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnorderedCores { prev: 4, next: 2 })
        );
    }

    #[test]
    fn rejects_duplicate_cores() {
        let mut config = SweepConfig::load_sweep();
        config.cores = vec![2, 2];
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnorderedCores { prev: 2, next: 2 })
        );
    }

    #[test]
    fn rejects_zero_trials_and_empty_variants() {
        let mut config = SweepConfig::load_sweep();
        config.trials = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTrials));

        let mut config = SweepConfig::load_sweep();
        config.variants.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyVariants));
    }

    #[test]
    fn rejects_zero_duration() {
        let mut config = SweepConfig::load_sweep();
        config.params.duration = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn counts_grid_points_and_trials() {
        let config = SweepConfig::load_sweep();
        assert_eq!(config.total_points(), 6 * 5);
        assert_eq!(config.total_trials(), 6 * 5 * 3);
    }

    #[test]
    fn round_trips_through_json() {
        let config = SweepConfig::performance_sweep();
        let json = serde_json::to_string(&config).unwrap();
        let back: SweepConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn metric_selects_grammar() {
        assert_eq!(MetricKind::AccuracyPercent.grammar(), Grammar::Throughput);
        assert_eq!(
            MetricKind::ElapsedNanos { per_request: true }.grammar(),
            Grammar::Timing
        );
    }
}
