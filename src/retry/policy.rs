//! Retry policy types and configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::classify::PolicyOverrides;
use crate::failure::FailureCategory;

/// How many times to try, how long to wait between tries, and which
/// failure categories may be retried.
///
/// Policies are pure data. They describe retry behaviour; a
/// [`RetryExecutor`](super::RetryExecutor) carries it out.
///
/// # Bounds
///
/// `max_attempts` counts every invocation, including the first, and is never
/// below 1. There is no unbounded policy.
///
/// # Examples
///
/// ```rust
/// use faultscript::{Backoff, FailureCategory, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(4)
///     .with_backoff(Backoff::exponential(Duration::from_millis(100)))
///     .with_max_delay(Duration::from_millis(250))
///     .with_retryable_categories([FailureCategory::Deadlock, FailureCategory::LockTimeout]);
///
/// assert_eq!(policy.max_attempts(), 4);
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
/// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(250)); // capped
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
    overrides: PolicyOverrides,
}

/// Delay before the next attempt, as a function of the attempt that just failed.
///
/// Attempts are 1-indexed, so every built-in strategy waits `base` after the
/// first failure.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Backoff {
    /// No wait. Retries are still ordered after the failure they follow.
    #[default]
    Immediate,
    /// Fixed delay.
    Constant(Duration),
    /// `base * attempt`.
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// `base * 2^(attempt - 1)`.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// `base * fib(attempt)`.
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
    /// Caller-supplied function.
    Custom(BackoffFn),
}

/// A shareable `attempt -> delay` function for [`Backoff::Custom`].
///
/// Two `BackoffFn`s are equal only if they are clones of the same function.
#[derive(Clone)]
pub struct BackoffFn(Arc<dyn Fn(u32) -> Duration + Send + Sync>);

impl BackoffFn {
    /// Wrap a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    fn call(&self, attempt: u32) -> Duration {
        (self.0)(attempt)
    }
}

impl fmt::Debug for BackoffFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackoffFn(<fn>)")
    }
}

impl PartialEq for BackoffFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Strategy for adding randomness to delays.
///
/// Without the `jitter` feature every strategy behaves like `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
    /// Random delay between 0 and the calculated delay.
    Full,
}

impl Backoff {
    /// Fixed delay.
    pub fn constant(delay: Duration) -> Self {
        Backoff::Constant(delay)
    }

    /// Linearly increasing delay.
    pub fn linear(base: Duration) -> Self {
        Backoff::Linear { base }
    }

    /// Doubling delay.
    pub fn exponential(base: Duration) -> Self {
        Backoff::Exponential { base }
    }

    /// Fibonacci delay.
    pub fn fibonacci(base: Duration) -> Self {
        Backoff::Fibonacci { base }
    }

    /// Delay computed by `f(attempt)`.
    ///
    /// ```rust
    /// use faultscript::{Backoff, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(3)
    ///     .with_backoff(Backoff::custom(|attempt| Duration::from_secs(u64::from(attempt) * 7)));
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(14));
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Backoff::Custom(BackoffFn::new(f))
    }

    /// Delay after the 1-indexed `attempt` failed.
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self {
            Backoff::Immediate => Duration::ZERO,
            Backoff::Constant(d) => *d,
            Backoff::Linear { base } => base.saturating_mul(attempt),
            Backoff::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(attempt - 1))
            }
            Backoff::Fibonacci { base } => base.saturating_mul(fibonacci(attempt)),
            Backoff::Custom(f) => f.call(attempt),
        }
    }
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` total invocations with no delay.
    ///
    /// Values below 1 are raised to 1: the first invocation always happens.
    /// Retryability follows the catalog until overrides are set.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Immediate,
            max_delay: None,
            jitter: JitterStrategy::None,
            overrides: PolicyOverrides::new(),
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the maximum delay cap.
    ///
    /// Delays never exceed this value, regardless of backoff or jitter.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Retry only `categories`; every other known category aborts.
    ///
    /// Unknown failures always surface.
    pub fn with_retryable_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = FailureCategory>,
    {
        self.overrides = PolicyOverrides::only(categories);
        self
    }

    /// Use explicit per-category overrides.
    pub fn with_overrides(mut self, overrides: PolicyOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Add ±`factor` proportional jitter, clamped to `0.0..=1.0`.
    ///
    /// Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = JitterStrategy::Proportional(factor.clamp(0.0, 1.0));
        self
    }

    /// Use full jitter: a random delay between zero and the computed delay.
    ///
    /// Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Total invocations allowed, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The backoff strategy.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Category overrides handed to the classifier.
    pub fn overrides(&self) -> &PolicyOverrides {
        &self.overrides
    }

    /// True if `attempt` is not the last one allowed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay after the 1-indexed `attempt` failed, before jitter, with the cap applied.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.backoff.delay(attempt);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Delay with jitter applied. Used by the executor.
    #[doc(hidden)]
    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        self.jitter
            .apply(self.delay_for_attempt(attempt), self.max_delay)
    }
}

impl Default for RetryPolicy {
    /// Three attempts, no delay, catalog retryability.
    fn default() -> Self {
        Self::new(3)
    }
}

impl JitterStrategy {
    /// Apply jitter to `base_delay`, then cap at `max_delay`.
    pub fn apply(&self, base_delay: Duration, max_delay: Option<Duration>) -> Duration {
        let jittered = match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let min = (1.0 - factor).max(0.0);
                let max = 1.0 + factor;
                if factor.is_nan() || max <= min {
                    base_delay
                } else {
                    let scale = rand::rng().random_range(min..=max);
                    Duration::try_from_secs_f64(base_delay.as_secs_f64() * scale)
                        .unwrap_or(Duration::MAX)
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                if base_delay.is_zero() {
                    Duration::ZERO
                } else {
                    base_delay.mul_f64(rand::rng().random_range(0.0..=1.0))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Full => base_delay,
        };

        match max_delay {
            Some(max) => jittered.min(max),
            None => jittered,
        }
    }
}

/// Calculate the nth Fibonacci number.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let temp = a.saturating_add(b);
        a = b;
        b = temp;
    }
    b
}
