//! Scripted failure sources: deterministic stand-ins for flaky dependencies.
//!
//! A [`ScriptedSequence`] is a fixed plan of outcomes. A
//! [`ScriptedFailureSource`] owns one and plays it back one outcome per call,
//! so a retry loop under test sees exactly the failures the test intended.
//!
//! # Examples
//!
//! ```rust
//! use faultscript::{ScriptedFailureSource, ScriptedOutcome, ScriptedSequence, SyntheticFailureFactory};
//!
//! let factory = SyntheticFailureFactory::new();
//! let source = ScriptedFailureSource::new(
//!     ScriptedSequence::new()
//!         .fail(factory.deadlock())
//!         .succeed("saved"),
//! );
//!
//! assert!(source.next().unwrap().is_fail());
//! assert_eq!(source.next().unwrap(), ScriptedOutcome::Success("saved"));
//! // Sticky tail: the last outcome repeats.
//! assert_eq!(source.next().unwrap(), ScriptedOutcome::Success("saved"));
//! ```
//!
//! # Exhaustion
//!
//! What happens after the last outcome is configured with [`ExhaustionMode`]:
//! repeat the final outcome (the default), or fail with
//! [`ExhaustedSequenceError`](crate::ExhaustedSequenceError) so tests can
//! assert an exact call count.

mod source;

pub use source::{ExhaustionMode, OutcomeSource, ScriptedFailureSource};

use crate::failure::FailureDescriptor;

/// One scripted response from a simulated dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome<T> {
    /// The call succeeds with this value.
    Success(T),
    /// The call fails with this synthetic failure.
    Fail(FailureDescriptor),
}

impl<T> ScriptedOutcome<T> {
    /// True for [`ScriptedOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ScriptedOutcome::Success(_))
    }

    /// True for [`ScriptedOutcome::Fail`].
    pub fn is_fail(&self) -> bool {
        matches!(self, ScriptedOutcome::Fail(_))
    }

    /// The failure, if this outcome is one.
    pub fn failure(&self) -> Option<&FailureDescriptor> {
        match self {
            ScriptedOutcome::Fail(d) => Some(d),
            ScriptedOutcome::Success(_) => None,
        }
    }

    /// Convert to the `Result` a real dependency method would return.
    pub fn into_result(self) -> Result<T, FailureDescriptor> {
        match self {
            ScriptedOutcome::Success(v) => Ok(v),
            ScriptedOutcome::Fail(d) => Err(d),
        }
    }
}

impl<T> From<Result<T, FailureDescriptor>> for ScriptedOutcome<T> {
    fn from(result: Result<T, FailureDescriptor>) -> Self {
        match result {
            Ok(v) => ScriptedOutcome::Success(v),
            Err(d) => ScriptedOutcome::Fail(d),
        }
    }
}

/// An ordered plan of outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedSequence<T> {
    outcomes: Vec<ScriptedOutcome<T>>,
}

impl<T> ScriptedSequence<T> {
    /// An empty plan.
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    /// Append a success.
    pub fn succeed(mut self, value: T) -> Self {
        self.outcomes.push(ScriptedOutcome::Success(value));
        self
    }

    /// Append a failure.
    pub fn fail(mut self, failure: FailureDescriptor) -> Self {
        self.outcomes.push(ScriptedOutcome::Fail(failure));
        self
    }

    /// Append the same failure `times` times.
    pub fn fail_times(mut self, failure: FailureDescriptor, times: usize) -> Self {
        self.outcomes
            .extend(std::iter::repeat_n(failure, times).map(ScriptedOutcome::Fail));
        self
    }

    /// Append an arbitrary outcome.
    pub fn then(mut self, outcome: ScriptedOutcome<T>) -> Self {
        self.outcomes.push(outcome);
        self
    }

    /// Number of scripted outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if nothing is scripted.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// The scripted outcomes in order.
    pub fn outcomes(&self) -> &[ScriptedOutcome<T>] {
        &self.outcomes
    }
}

impl<T> Default for ScriptedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<ScriptedOutcome<T>>> for ScriptedSequence<T> {
    fn from(outcomes: Vec<ScriptedOutcome<T>>) -> Self {
        Self { outcomes }
    }
}

impl<T> FromIterator<ScriptedOutcome<T>> for ScriptedSequence<T> {
    fn from_iter<I: IntoIterator<Item = ScriptedOutcome<T>>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests;
