//! Running an operation under a [`RetryPolicy`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::pause::{Pause, ThreadSleep};
use super::policy::RetryPolicy;
use super::report::{RetryEvent, RetryReport};
use crate::classify::{classify, Decision};
use crate::failure::FailureDescriptor;

type RetryHook = Arc<dyn Fn(&RetryEvent<'_>) + Send + Sync>;

/// Invokes an operation until it succeeds, its failure is not retryable, or
/// the policy's attempts run out.
///
/// Each failure is classified with the policy's overrides. Only
/// [`Decision::Retry`] continues the loop; [`Decision::Abort`] and
/// [`Decision::Surface`] stop it immediately. The operation is never invoked
/// more than [`RetryPolicy::max_attempts`] times, and the terminating failure
/// is always returned, never swallowed.
///
/// # Examples
///
/// ```rust
/// use faultscript::{
///     RetryExecutor, RetryPolicy, ScriptedFailureSource, ScriptedSequence,
///     SyntheticFailureFactory, VirtualClock,
/// };
///
/// let factory = SyntheticFailureFactory::new();
/// let source = ScriptedFailureSource::new(
///     ScriptedSequence::new()
///         .fail_times(factory.command_timeout(), 2)
///         .succeed(42),
/// );
///
/// let clock = VirtualClock::new();
/// let executor = RetryExecutor::new().with_pause(clock.clone());
///
/// let result = executor.execute(
///     || source.next().unwrap().into_result(),
///     &RetryPolicy::new(3),
/// );
///
/// assert_eq!(result, Ok(42));
/// assert_eq!(source.calls(), 3);
/// assert_eq!(clock.pause_count(), 2);
/// ```
#[derive(Clone)]
pub struct RetryExecutor<P = ThreadSleep> {
    pause: P,
    on_retry: Option<RetryHook>,
}

impl<P: fmt::Debug> fmt::Debug for RetryExecutor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("pause", &self.pause)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl RetryExecutor<ThreadSleep> {
    /// An executor that sleeps the current thread between attempts.
    pub fn new() -> Self {
        Self {
            pause: ThreadSleep,
            on_retry: None,
        }
    }
}

impl Default for RetryExecutor<ThreadSleep> {
    fn default() -> Self {
        Self::new()
    }
}

enum Step {
    Wait(Duration),
    Stop(Decision),
}

impl<P> RetryExecutor<P> {
    /// Replace how the executor waits between attempts.
    pub fn with_pause<Q: Pause>(self, pause: Q) -> RetryExecutor<Q> {
        RetryExecutor {
            pause,
            on_retry: self.on_retry,
        }
    }

    /// Call `hook` before every retry.
    ///
    /// The hook runs synchronously after the failure is classified and before
    /// the pause.
    pub fn on_retry<H>(mut self, hook: H) -> Self
    where
        H: Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    fn step(&self, attempt: u32, failure: &FailureDescriptor, policy: &RetryPolicy) -> Step {
        let decision = classify(failure, Some(policy.overrides()));
        if !decision.is_retry() || !policy.allows_retry_after(attempt) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                attempt,
                code = ?failure.code(),
                category = %failure.category(),
                %decision,
                "giving up"
            );
            return Step::Stop(decision);
        }

        let delay = policy.delay_with_jitter(attempt);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            code = ?failure.code(),
            category = %failure.category(),
            ?delay,
            "retrying after failure"
        );
        if let Some(hook) = &self.on_retry {
            hook(&RetryEvent {
                attempt,
                failure,
                next_delay: delay,
            });
        }
        Step::Wait(delay)
    }
}

impl<P: Pause> RetryExecutor<P> {
    /// Run `operation` under `policy`.
    pub fn execute<T, F>(&self, operation: F, policy: &RetryPolicy) -> Result<T, FailureDescriptor>
    where
        F: FnMut() -> Result<T, FailureDescriptor>,
    {
        self.execute_with_report(operation, policy).result
    }

    /// Run `operation` under `policy`, keeping attempt metadata.
    pub fn execute_with_report<T, F>(&self, mut operation: F, policy: &RetryPolicy) -> RetryReport<T>
    where
        F: FnMut() -> Result<T, FailureDescriptor>,
    {
        let mut attempt = 1u32;
        let mut total_delay = Duration::ZERO;

        loop {
            let failure = match operation() {
                Ok(value) => {
                    return RetryReport {
                        result: Ok(value),
                        attempts: attempt,
                        final_decision: None,
                        total_delay,
                    };
                }
                Err(failure) => failure,
            };

            match self.step(attempt, &failure, policy) {
                Step::Wait(delay) => {
                    self.pause.pause(delay);
                    total_delay = total_delay.saturating_add(delay);
                    attempt += 1;
                }
                Step::Stop(decision) => {
                    return RetryReport {
                        result: Err(failure),
                        attempts: attempt,
                        final_decision: Some(decision),
                        total_delay,
                    };
                }
            }
        }
    }
}

#[cfg(feature = "async")]
impl<P> RetryExecutor<P> {
    /// Run an async `operation` under `policy`.
    ///
    /// Pauses are `tokio::time::sleep` calls, so tests can use tokio's paused
    /// clock; the executor's [`Pause`] is not consulted.
    ///
    /// ```rust
    /// use faultscript::{RetryExecutor, RetryPolicy, SyntheticFailureFactory};
    ///
    /// # tokio_test::block_on(async {
    /// let deadlock = SyntheticFailureFactory::new().deadlock();
    /// let report = RetryExecutor::new()
    ///     .execute_async(|| async { Err::<(), _>(deadlock.clone()) }, &RetryPolicy::new(2))
    ///     .await;
    /// assert_eq!(report.attempts, 2);
    /// # });
    /// ```
    pub async fn execute_async<T, F, Fut>(&self, mut operation: F, policy: &RetryPolicy) -> RetryReport<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, FailureDescriptor>>,
    {
        let mut attempt = 1u32;
        let mut total_delay = Duration::ZERO;

        loop {
            let failure = match operation().await {
                Ok(value) => {
                    return RetryReport {
                        result: Ok(value),
                        attempts: attempt,
                        final_decision: None,
                        total_delay,
                    };
                }
                Err(failure) => failure,
            };

            match self.step(attempt, &failure, policy) {
                Step::Wait(delay) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    total_delay = total_delay.saturating_add(delay);
                    attempt += 1;
                }
                Step::Stop(decision) => {
                    return RetryReport {
                        result: Err(failure),
                        attempts: attempt,
                        final_decision: Some(decision),
                        total_delay,
                    };
                }
            }
        }
    }
}
