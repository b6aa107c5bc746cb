//! Retry loops driven by failure classification.
//!
//! - [`RetryPolicy`] is plain data: attempt bound, backoff, category overrides.
//! - [`RetryExecutor`] runs an operation under a policy, classifying each
//!   failure and pausing between attempts.
//! - [`Pause`] decides what "pausing" means: a real sleep ([`ThreadSleep`]),
//!   nothing ([`NoPause`]), or a recorded step of a [`VirtualClock`].
//!
//! # Quick Start
//!
//! ```rust
//! use faultscript::{
//!     Backoff, RetryExecutor, RetryPolicy, ScriptedFailureSource, ScriptedSequence,
//!     SyntheticFailureFactory, VirtualClock,
//! };
//! use std::time::Duration;
//!
//! let factory = SyntheticFailureFactory::new();
//! let source = ScriptedFailureSource::new(
//!     ScriptedSequence::new()
//!         .fail(factory.deadlock())
//!         .fail(factory.lock_timeout())
//!         .succeed("committed"),
//! );
//!
//! let clock = VirtualClock::new();
//! let policy = RetryPolicy::new(5).with_backoff(Backoff::exponential(Duration::from_millis(50)));
//! let report = RetryExecutor::new()
//!     .with_pause(clock.clone())
//!     .execute_with_report(|| source.next().unwrap().into_result(), &policy);
//!
//! assert_eq!(report.result, Ok("committed"));
//! assert_eq!(report.attempts, 3);
//! assert_eq!(clock.pauses(), vec![Duration::from_millis(50), Duration::from_millis(100)]);
//! ```
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to randomise delays:
//!
//! ```toml
//! faultscript = { version = "...", features = ["jitter"] }
//! ```

mod executor;
mod pause;
mod policy;
mod report;

pub use executor::RetryExecutor;
pub use pause::{NoPause, Pause, ThreadSleep, VirtualClock};
pub use policy::{Backoff, BackoffFn, JitterStrategy, RetryPolicy};
pub use report::{RetryEvent, RetryReport};

#[cfg(test)]
mod tests;
