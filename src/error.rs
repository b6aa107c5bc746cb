//! Setup and sequencing errors.
//!
//! These are the only conditions in the crate that are *errors* in the Rust
//! sense. Simulated database failures are ordinary [`FailureDescriptor`]
//! values and never appear here.
//!
//! [`FailureDescriptor`]: crate::FailureDescriptor

use thiserror::Error;

use crate::failure::FailureCategory;

/// A code was registered twice without asking for the old entry to be replaced.
///
/// # Examples
///
/// ```rust
/// use faultscript::{CatalogError, FailureCatalog, FailureCategory};
///
/// let mut catalog = FailureCatalog::with_defaults();
/// let err = catalog
///     .register(1205, FailureCategory::Deadlock, "again", true)
///     .unwrap_err();
///
/// assert!(matches!(err, CatalogError::Duplicate(ref dup) if dup.code == 1205));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failure code {code} is already registered")]
pub struct DuplicateCodeError {
    /// The code that was already present.
    pub code: i32,
}

/// Errors raised while configuring a [`FailureCatalog`](crate::FailureCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The code already has an entry and overwriting was not requested.
    #[error(transparent)]
    Duplicate(#[from] DuplicateCodeError),

    /// The category cannot carry a code: `Unknown` marks codes absent from the
    /// catalog and `TransactionAbort` is reserved for the coordinator entry.
    #[error("category {category} is reserved and cannot be registered for code {code}")]
    ReservedCategory {
        /// The rejected code.
        code: i32,
        /// The rejected category.
        category: FailureCategory,
    },
}

/// A strict [`ScriptedFailureSource`](crate::ScriptedFailureSource) was asked
/// for more outcomes than were scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scripted sequence of {length} outcomes exhausted on call {call}")]
pub struct ExhaustedSequenceError {
    /// Number of outcomes in the script.
    pub length: usize,
    /// The 1-indexed call that found the script exhausted.
    pub call: usize,
}
