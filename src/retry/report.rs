//! What a retry loop did.

use std::time::Duration;

use crate::classify::Decision;
use crate::failure::FailureDescriptor;

/// The result of an executor run along with how it got there.
///
/// # Examples
///
/// ```rust
/// use faultscript::{Decision, RetryExecutor, RetryPolicy, SyntheticFailureFactory};
///
/// let timeout = SyntheticFailureFactory::new().command_timeout();
/// let report = RetryExecutor::new()
///     .execute_with_report(|| Err::<(), _>(timeout.clone()), &RetryPolicy::new(2));
///
/// assert_eq!(report.attempts, 2);
/// assert_eq!(report.final_decision, Some(Decision::Retry));
/// assert!(report.exhausted());
/// assert_eq!(report.into_result(), Err(timeout));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport<T> {
    /// The success value, or the failure that ended the loop.
    pub result: Result<T, FailureDescriptor>,
    /// Total invocations of the operation.
    pub attempts: u32,
    /// Classification of the terminating failure; `None` on success.
    pub final_decision: Option<Decision>,
    /// Sum of every pause taken between attempts.
    pub total_delay: Duration,
}

impl<T> RetryReport<T> {
    /// Extract the result, discarding metadata.
    pub fn into_result(self) -> Result<T, FailureDescriptor> {
        self.result
    }

    /// True if the operation eventually succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The terminating failure, if any.
    pub fn failure(&self) -> Option<&FailureDescriptor> {
        self.result.as_ref().err()
    }

    /// True if the loop stopped because attempts ran out while the failure
    /// was still retryable.
    pub fn exhausted(&self) -> bool {
        self.final_decision == Some(Decision::Retry)
    }
}

/// Information about a failed attempt that is about to be retried.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The failure from that attempt.
    pub failure: &'a FailureDescriptor,
    /// Pause before the next attempt.
    pub next_delay: Duration,
}
