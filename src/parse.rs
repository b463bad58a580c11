//! Line-oriented grammars for subject output.
//!
//! The subject is expected to print exactly one measurement line to stdout.
//! Two grammars are recognized:
//!
//! - **Throughput-accuracy**: a line containing both an `Expected` and an
//!   `Actual` marker. The whitespace token immediately following each
//!   marker is, respectively, a floating-point expected count and an
//!   integer actual count. Example: `Expected 50.0 Tokens Actual 45 Tokens`.
//! - **Timing**: a line containing a `Time` marker followed by a colon.
//!   The remainder after the last colon is an integer duration in
//!   nanoseconds. Example: `Time: 4200`.
//!
//! Only the first matching line is honored; scanning stops there. When no
//! line matches, [`parse_output`] returns the documented zero sentinel
//! (`expected = 0.0, actual = 0` for throughput, `0` for timing) with
//! `matched = false` instead of failing. Callers must check `matched`
//! before treating the sentinel as a measurement; the trial runner records
//! unmatched output as a data failure so a malformed or empty subject
//! response is never aggregated as a real zero.

const EXPECTED_MARKER: &str = "Expected";
const ACTUAL_MARKER: &str = "Actual";
const TIME_MARKER: &str = "Time";

/// Which grammar to apply when scanning subject output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    Throughput,
    Timing,
}

/// One scalar measurement parsed from one invocation's output, tagged by
/// which grammar matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSample {
    /// Expected vs actual admitted count (throughput-accuracy tests).
    Throughput { expected: f64, actual: u64 },
    /// Elapsed wall time in nanoseconds (latency tests).
    Timing { nanos: u64 },
}

impl RawSample {
    /// The documented zero sentinel for a grammar.
    pub fn sentinel(grammar: Grammar) -> Self {
        match grammar {
            Grammar::Throughput => Self::Throughput {
                expected: 0.0,
                actual: 0,
            },
            Grammar::Timing => Self::Timing { nanos: 0 },
        }
    }
}

/// Result of scanning subject output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedOutput {
    pub sample: RawSample,
    /// False when no line matched and `sample` is the zero sentinel.
    pub matched: bool,
}

/// Scan `text` line by line and extract the first measurement matching
/// `grammar`. Never fails; see the module docs for the sentinel contract.
pub fn parse_output(text: &str, grammar: Grammar) -> ParsedOutput {
    for line in text.lines() {
        let hit = match grammar {
            Grammar::Throughput => {
                line.contains(EXPECTED_MARKER) && line.contains(ACTUAL_MARKER)
            }
            Grammar::Timing => line.contains(TIME_MARKER) && line.contains(':'),
        };
        if !hit {
            continue;
        }
        // First matching line wins, even if its tokens turn out malformed.
        let sample = match grammar {
            Grammar::Throughput => parse_throughput_line(line),
            Grammar::Timing => parse_timing_line(line),
        };
        return match sample {
            Some(sample) => ParsedOutput {
                sample,
                matched: true,
            },
            None => ParsedOutput {
                sample: RawSample::sentinel(grammar),
                matched: false,
            },
        };
    }
    ParsedOutput {
        sample: RawSample::sentinel(grammar),
        matched: false,
    }
}

fn parse_throughput_line(line: &str) -> Option<RawSample> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let expected_at = tokens.iter().position(|t| *t == EXPECTED_MARKER)?;
    let actual_at = tokens.iter().position(|t| *t == ACTUAL_MARKER)?;
    let expected: f64 = tokens.get(expected_at + 1)?.parse().ok()?;
    let actual: u64 = tokens.get(actual_at + 1)?.parse().ok()?;
    Some(RawSample::Throughput { expected, actual })
}

fn parse_timing_line(line: &str) -> Option<RawSample> {
    let (_, rest) = line.rsplit_once(':')?;
    let nanos: u64 = rest.trim().parse().ok()?;
    Some(RawSample::Timing { nanos })
}
