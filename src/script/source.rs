//! Thread-safe playback of a scripted sequence.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ScriptedOutcome, ScriptedSequence};
use crate::error::ExhaustedSequenceError;

/// Behaviour of a source once every scripted outcome has been returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustionMode {
    /// Keep returning the final outcome.
    #[default]
    StickyTail,
    /// Fail every further call with [`ExhaustedSequenceError`].
    Strict,
}

/// Anything that can stand in for a dependency call by producing outcomes.
///
/// Test doubles take an `OutcomeSource` rather than a concrete source so the
/// backing behaviour can be swapped per test.
pub trait OutcomeSource<T> {
    /// Produce the next outcome.
    fn next_outcome(&self) -> Result<ScriptedOutcome<T>, ExhaustedSequenceError>;

    /// Produce the next outcome as the `Result` a dependency would return.
    fn next_result(&self) -> Result<Result<T, crate::FailureDescriptor>, ExhaustedSequenceError> {
        self.next_outcome().map(ScriptedOutcome::into_result)
    }
}

#[derive(Debug, Default)]
struct Cursor {
    position: usize,
    calls: usize,
}

/// Plays back a [`ScriptedSequence`] one outcome per call.
///
/// Every call to [`next`](ScriptedFailureSource::next) reads the outcome at
/// the cursor and advances it under a single lock, so concurrent callers each
/// receive a distinct index. [`reset`](ScriptedFailureSource::reset) takes the
/// same lock.
///
/// # Examples
///
/// ```rust
/// use faultscript::{ExhaustedSequenceError, ScriptedFailureSource, ScriptedSequence, SyntheticFailureFactory};
///
/// let factory = SyntheticFailureFactory::new();
/// let source = ScriptedFailureSource::strict(
///     ScriptedSequence::new()
///         .fail(factory.lock_timeout())
///         .succeed(1),
/// );
///
/// assert!(source.next().is_ok());
/// assert!(source.next().is_ok());
/// assert_eq!(
///     source.next().unwrap_err(),
///     ExhaustedSequenceError { length: 2, call: 3 }
/// );
///
/// source.reset();
/// assert!(source.next().unwrap().is_fail());
/// ```
#[derive(Debug)]
pub struct ScriptedFailureSource<T> {
    outcomes: Vec<ScriptedOutcome<T>>,
    mode: ExhaustionMode,
    cursor: Mutex<Cursor>,
}

impl<T> ScriptedFailureSource<T> {
    /// A source that repeats its final outcome once exhausted.
    pub fn new(sequence: impl Into<ScriptedSequence<T>>) -> Self {
        Self::with_mode(sequence, ExhaustionMode::StickyTail)
    }

    /// A source that fails once exhausted.
    pub fn strict(sequence: impl Into<ScriptedSequence<T>>) -> Self {
        Self::with_mode(sequence, ExhaustionMode::Strict)
    }

    /// A source with an explicit exhaustion mode.
    pub fn with_mode(sequence: impl Into<ScriptedSequence<T>>, mode: ExhaustionMode) -> Self {
        Self {
            outcomes: sequence.into().outcomes,
            mode,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    // The cursor is updated in one assignment per call, so a panic elsewhere
    // cannot leave it half-written.
    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewind to the first outcome and clear the call count.
    pub fn reset(&self) {
        *self.lock() = Cursor::default();
    }

    /// The configured exhaustion mode.
    pub fn mode(&self) -> ExhaustionMode {
        self.mode
    }

    /// Number of scripted outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if nothing was scripted.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Index of the next outcome to be returned, at most [`len`](Self::len).
    pub fn cursor(&self) -> usize {
        self.lock().position
    }

    /// Calls to `next` since construction or the last reset.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Scripted outcomes not yet returned.
    pub fn remaining(&self) -> usize {
        self.outcomes.len() - self.lock().position
    }

    /// True once every scripted outcome has been returned.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl<T: Clone> ScriptedFailureSource<T> {
    /// Return the next outcome and advance the cursor.
    ///
    /// An empty script is exhausted on the first call in either mode, since
    /// there is no final outcome to repeat.
    pub fn next(&self) -> Result<ScriptedOutcome<T>, ExhaustedSequenceError> {
        self.next_indexed().map(|(_, outcome)| outcome)
    }

    /// Like [`next`](Self::next), also returning the index of the outcome.
    pub fn next_indexed(&self) -> Result<(usize, ScriptedOutcome<T>), ExhaustedSequenceError> {
        let mut cursor = self.lock();
        cursor.calls += 1;

        if let Some(outcome) = self.outcomes.get(cursor.position) {
            let index = cursor.position;
            cursor.position += 1;
            return Ok((index, outcome.clone()));
        }

        let exhausted = ExhaustedSequenceError {
            length: self.outcomes.len(),
            call: cursor.calls,
        };
        match (self.mode, self.outcomes.last()) {
            (ExhaustionMode::StickyTail, Some(last)) => Ok((self.outcomes.len() - 1, last.clone())),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    length = exhausted.length,
                    call = exhausted.call,
                    "scripted sequence exhausted"
                );
                Err(exhausted)
            }
        }
    }
}

impl<T: Clone> OutcomeSource<T> for ScriptedFailureSource<T> {
    fn next_outcome(&self) -> Result<ScriptedOutcome<T>, ExhaustedSequenceError> {
        self.next()
    }
}
