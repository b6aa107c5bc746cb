//! # faultscript
//!
//! Synthetic database-driver failures for testing failure-handling code.
//!
//! Service code that talks to a database needs to behave correctly when the
//! driver reports a command timeout, a lock timeout, a deadlock, a snapshot
//! conflict, or when a distributed transaction is aborted. Provoking those
//! conditions against a real server is slow and flaky. This crate produces
//! them as plain values instead:
//!
//! - [`SyntheticFailureFactory`] builds [`FailureDescriptor`]s from driver
//!   codes, consulting a [`FailureCatalog`].
//! - [`classify()`] maps a descriptor to a [`Decision`]: retry, abort, or surface.
//! - [`ScriptedFailureSource`] plays back a fixed sequence of failures and
//!   successes, one per call, safely across threads.
//! - [`RetryExecutor`] runs an operation under a [`RetryPolicy`], using the
//!   classifier to decide whether to try again.
//!
//! ## Quick Example
//!
//! ```rust
//! use faultscript::prelude::*;
//!
//! let factory = SyntheticFailureFactory::new();
//!
//! // The dependency times out twice, then answers.
//! let source = ScriptedFailureSource::new(
//!     ScriptedSequence::new()
//!         .fail_times(factory.command_timeout(), 2)
//!         .succeed(42),
//! );
//!
//! let executor = RetryExecutor::new().with_pause(VirtualClock::new());
//! let result = executor.execute(|| source.next().unwrap().into_result(), &RetryPolicy::new(3));
//!
//! assert_eq!(result, Ok(42));
//! assert_eq!(source.calls(), 3);
//!
//! // With one attempt fewer, the second timeout is what the caller sees.
//! source.reset();
//! let result = executor.execute(|| source.next().unwrap().into_result(), &RetryPolicy::new(2));
//! assert_eq!(result.unwrap_err().code(), Some(-2));
//! assert_eq!(source.calls(), 2);
//! ```
//!
//! ## Features
//!
//! - `async`: [`RetryExecutor::execute_async`] on tokio's timer.
//! - `tracing`: log retry decisions and sequence exhaustion.
//! - `serde`: `Serialize`/`Deserialize` for descriptors, categories and decisions.
//! - `jitter`: randomised backoff.
//! - `proptest`: `Arbitrary` for categories and descriptors.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod classify;
pub mod error;
pub mod failure;
pub mod retry;
pub mod script;
pub mod testing;

// Re-exports
pub use classify::{classify, Decision, PolicyOverrides};
pub use error::{CatalogError, DuplicateCodeError, ExhaustedSequenceError};
pub use failure::{
    CatalogEntry, FailureCatalog, FailureCategory, FailureDescriptor, FailureOrigin, Overwrite,
    SyntheticFailureFactory,
};
pub use retry::{
    Backoff, BackoffFn, JitterStrategy, NoPause, Pause, RetryEvent, RetryExecutor, RetryPolicy,
    RetryReport, ThreadSleep, VirtualClock,
};
pub use script::{
    ExhaustionMode, OutcomeSource, ScriptedFailureSource, ScriptedOutcome, ScriptedSequence,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classify::{classify, Decision, PolicyOverrides};
    pub use crate::failure::{FailureCategory, FailureDescriptor, SyntheticFailureFactory};
    pub use crate::retry::{Backoff, RetryExecutor, RetryPolicy, VirtualClock};
    pub use crate::script::{
        ExhaustionMode, OutcomeSource, ScriptedFailureSource, ScriptedOutcome, ScriptedSequence,
    };
}
