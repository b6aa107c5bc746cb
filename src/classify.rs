//! Mapping a failure to a handling decision.
//!
//! [`classify`] is a total, pure function: it reads a [`FailureDescriptor`]
//! and an optional set of [`PolicyOverrides`] and returns a [`Decision`].
//! Nothing is mutated, so tests can assert on classification with no setup.
//!
//! # Rules
//!
//! 1. [`FailureCategory::Unknown`] always yields [`Decision::Surface`].
//! 2. An override marking the category non-retryable yields [`Decision::Abort`].
//! 3. An override marking it retryable, or (with no override for the
//!    category) a retryable descriptor, yields [`Decision::Retry`].
//! 4. Anything else yields [`Decision::Surface`].
//!
//! # Examples
//!
//! ```rust
//! use faultscript::{classify, Decision, FailureCategory, PolicyOverrides, SyntheticFailureFactory};
//!
//! let factory = SyntheticFailureFactory::new();
//! let deadlock = factory.deadlock();
//!
//! assert_eq!(classify(&deadlock, None), Decision::Retry);
//!
//! let overrides = PolicyOverrides::new().deny(FailureCategory::Deadlock);
//! assert_eq!(classify(&deadlock, Some(&overrides)), Decision::Abort);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::failure::{FailureCategory, FailureDescriptor};

/// How a caller should handle a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Decision {
    /// Try the operation again.
    Retry,
    /// Stop: policy forbids retrying this category.
    Abort,
    /// Stop and report the failure to the caller as-is.
    Surface,
}

impl Decision {
    /// True for [`Decision::Retry`].
    pub fn is_retry(self) -> bool {
        matches!(self, Decision::Retry)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Retry => "retry",
            Decision::Abort => "abort",
            Decision::Surface => "surface",
        })
    }
}

/// Per-category retryability that takes precedence over catalog defaults.
///
/// A category with no entry falls back to the descriptor's own
/// retryability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyOverrides {
    rules: BTreeMap<FailureCategory, bool>,
}

impl PolicyOverrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides that allow exactly `categories` and deny every other known category.
    ///
    /// `Unknown` is never given a rule; it always surfaces.
    pub fn only<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = FailureCategory>,
    {
        let mut overrides = Self::new();
        for category in FailureCategory::ALL {
            if category != FailureCategory::Unknown {
                overrides = overrides.deny(category);
            }
        }
        categories
            .into_iter()
            .fold(overrides, |overrides, category| overrides.allow(category))
    }

    /// Mark `category` explicitly retryable.
    pub fn allow(self, category: FailureCategory) -> Self {
        self.set(category, true)
    }

    /// Mark `category` explicitly non-retryable.
    pub fn deny(self, category: FailureCategory) -> Self {
        self.set(category, false)
    }

    /// Set the rule for `category`, replacing any previous one.
    pub fn set(mut self, category: FailureCategory, retryable: bool) -> Self {
        if category != FailureCategory::Unknown {
            self.rules.insert(category, retryable);
        }
        self
    }

    /// The explicit rule for `category`, if any.
    pub fn get(&self, category: FailureCategory) -> Option<bool> {
        self.rules.get(&category).copied()
    }

    /// True if no category has a rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<(FailureCategory, bool)> for PolicyOverrides {
    fn from_iter<I: IntoIterator<Item = (FailureCategory, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |overrides, (category, retryable)| {
                overrides.set(category, retryable)
            })
    }
}

/// Decide how to handle `descriptor`.
pub fn classify(descriptor: &FailureDescriptor, overrides: Option<&PolicyOverrides>) -> Decision {
    let category = descriptor.category();
    if category == FailureCategory::Unknown {
        return Decision::Surface;
    }

    match overrides.and_then(|o| o.get(category)) {
        Some(false) => Decision::Abort,
        Some(true) => Decision::Retry,
        None if descriptor.is_retryable() => Decision::Retry,
        None => Decision::Surface,
    }
}

impl FailureDescriptor {
    /// Shorthand for [`classify`] with no overrides.
    pub fn decision(&self) -> Decision {
        classify(self, None)
    }
}
