//! Assertion helpers and property-testing support for synthetic failures.
//!
//! # Examples
//!
//! ```rust
//! use faultscript::{assert_category, assert_decision, assert_failure_code};
//! use faultscript::{Decision, FailureCategory, SyntheticFailureFactory};
//!
//! let factory = SyntheticFailureFactory::new();
//! let deadlock = factory.deadlock();
//!
//! assert_category!(deadlock, FailureCategory::Deadlock);
//! assert_decision!(deadlock, Decision::Retry);
//!
//! let result: Result<(), _> = Err(deadlock);
//! assert_failure_code!(result, 1205);
//! ```

/// Assert that classifying a descriptor yields the expected decision.
///
/// An optional `overrides = expr` argument passes [`PolicyOverrides`] to the
/// classifier.
///
/// # Example
///
/// ```rust
/// use faultscript::{assert_decision, Decision, FailureCategory, PolicyOverrides, SyntheticFailureFactory};
///
/// let timeout = SyntheticFailureFactory::new().command_timeout();
/// let deny = PolicyOverrides::new().deny(FailureCategory::CommandTimeout);
///
/// assert_decision!(timeout, Decision::Retry);
/// assert_decision!(timeout, overrides = &deny, Decision::Abort);
/// ```
///
/// [`PolicyOverrides`]: crate::PolicyOverrides
#[macro_export]
macro_rules! assert_decision {
    ($descriptor:expr, overrides = $overrides:expr, $expected:expr) => {{
        let descriptor = &$descriptor;
        let actual = $crate::classify(descriptor, Some($overrides));
        if actual != $expected {
            panic!(
                "Expected decision {:?} for {}, got {:?}",
                $expected, descriptor, actual
            );
        }
    }};
    ($descriptor:expr, $expected:expr) => {{
        let descriptor = &$descriptor;
        let actual = $crate::classify(descriptor, None);
        if actual != $expected {
            panic!(
                "Expected decision {:?} for {}, got {:?}",
                $expected, descriptor, actual
            );
        }
    }};
}

/// Assert that a descriptor has the expected category.
///
/// # Example
///
/// ```rust
/// use faultscript::{assert_category, FailureCategory, SyntheticFailureFactory};
///
/// let unknown = SyntheticFailureFactory::new().create(999_999, None);
/// assert_category!(unknown, FailureCategory::Unknown);
/// ```
#[macro_export]
macro_rules! assert_category {
    ($descriptor:expr, $expected:expr) => {{
        let descriptor = &$descriptor;
        if descriptor.category() != $expected {
            panic!(
                "Expected category {:?}, got {:?} ({})",
                $expected,
                descriptor.category(),
                descriptor
            );
        }
    }};
}

/// Assert that a `Result<_, FailureDescriptor>` failed with the given code.
///
/// This macro will panic if the result is `Ok` or carries a different code.
///
/// # Example
///
/// ```rust
/// use faultscript::{assert_failure_code, SyntheticFailureFactory};
///
/// let result: Result<u8, _> = Err(SyntheticFailureFactory::new().lock_timeout());
/// assert_failure_code!(result, 1222);
/// ```
#[macro_export]
macro_rules! assert_failure_code {
    ($result:expr, $code:expr) => {
        match $result {
            Err(failure) => {
                if failure.code() != Some($code) {
                    panic!(
                        "Expected failure code {}, got {:?} ({})",
                        $code,
                        failure.code(),
                        failure
                    );
                }
            }
            Ok(v) => {
                panic!("Expected failure code {}, got Ok: {:?}", $code, v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
use crate::{FailureCategory, FailureDescriptor, SyntheticFailureFactory};

#[cfg(feature = "proptest")]
impl Arbitrary for FailureCategory {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        proptest::sample::select(FailureCategory::ALL.to_vec()).boxed()
    }
}

/// Descriptors built through the global catalog: mostly seeded codes, some
/// unknown codes, and coordinator aborts, each with an optional message.
#[cfg(feature = "proptest")]
impl Arbitrary for FailureDescriptor {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let message = proptest::option::of("[a-z ]{1,24}");
        prop_oneof![
            3 => (proptest::sample::select(vec![-2, 1222, 1205, 3960]), message.clone())
                .prop_map(|(code, msg)| SyntheticFailureFactory::new().create(code, msg.as_deref())),
            2 => (any::<i32>(), message.clone())
                .prop_map(|(code, msg)| SyntheticFailureFactory::new().create(code, msg.as_deref())),
            1 => message.prop_map(|msg| SyntheticFailureFactory::new()
                .create_transaction_abort(msg.as_deref().unwrap_or(""))),
        ]
        .boxed()
    }
}
