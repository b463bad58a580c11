//! Repeated-trial execution for one configuration point.
//!
//! A batch performs n sequential invoke+parse round trips against the
//! subject. Trials are independent: trial i always precedes trial i+1, no
//! two run concurrently, and one trial's failure never cancels the rest of
//! the batch. Only an unstartable subject aborts, since no measurement is
//! possible at all.

use crate::error::{DataFailure, HarnessError};
use crate::parse::{parse_output, Grammar, RawSample};
use crate::subject::{Invocation, Subject};

/// Outcome of one trial: the parsed sample plus its failure tag, if any.
/// A failed trial still carries the (sentinel) sample so batches stay
/// ordered and index-addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub trial: usize,
    pub sample: RawSample,
    pub failure: Option<DataFailure>,
}

/// Ordered outcomes of one configuration point's trial batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialBatch {
    pub outcomes: Vec<TrialOutcome>,
}

impl TrialBatch {
    /// Samples from trials that completed without a data failure, in trial
    /// order.
    pub fn valid_samples(&self) -> Vec<RawSample> {
        self.outcomes
            .iter()
            .filter(|o| o.failure.is_none())
            .map(|o| o.sample)
            .collect()
    }

    /// Trials that produced a data failure, in trial order.
    pub fn failures(&self) -> Vec<(usize, &DataFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure.as_ref().map(|f| (o.trial, f)))
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failure.is_some()).count()
    }
}

/// Run `trials` sequential invoke+parse round trips for one configuration
/// point.
///
/// Classification per trial: a timed-out subject is
/// [`DataFailure::TimedOut`]; a non-zero exit is
/// [`DataFailure::NonZeroExit`]; output matching no grammar is
/// [`DataFailure::Unparsable`]. [`HarnessError::ExecutionFailure`]
/// propagates immediately.
pub fn run_trials(
    subject: &dyn Subject,
    invocation: &Invocation,
    grammar: Grammar,
    trials: usize,
) -> Result<TrialBatch, HarnessError> {
    let mut outcomes = Vec::with_capacity(trials);
    for trial in 0..trials {
        let captured = subject.invoke(invocation)?;
        let parsed = parse_output(&captured.stdout, grammar);

        let failure = if captured.timed_out {
            Some(DataFailure::TimedOut)
        } else if !captured.success() {
            Some(DataFailure::NonZeroExit {
                code: captured.code,
                stderr: captured.stderr.trim().to_string(),
            })
        } else if !parsed.matched {
            Some(DataFailure::Unparsable)
        } else {
            None
        };

        outcomes.push(TrialOutcome {
            trial,
            sample: parsed.sample,
            failure,
        });
    }
    Ok(TrialBatch { outcomes })
}
