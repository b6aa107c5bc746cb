//! The failure taxonomy and the values that carry it.
//!
//! A [`FailureDescriptor`] is the synthetic stand-in for an error a database
//! driver or a distributed transaction coordinator would raise. It is plain
//! data: built once by a [`SyntheticFailureFactory`], cloned freely, and
//! inspected by the [`classify`](crate::classify()) function instead of by
//! matching on message text.
//!
//! # Examples
//!
//! ```rust
//! use faultscript::{FailureCategory, FailureOrigin, SyntheticFailureFactory};
//!
//! let factory = SyntheticFailureFactory::new();
//!
//! let deadlock = factory.create(1205, None);
//! assert_eq!(deadlock.code(), Some(1205));
//! assert_eq!(deadlock.category(), FailureCategory::Deadlock);
//! assert_eq!(deadlock.origin(), FailureOrigin::Server);
//! assert!(deadlock.is_retryable());
//!
//! let abort = factory.create_transaction_abort("coordinator timed out");
//! assert_eq!(abort.code(), None);
//! assert_eq!(abort.origin(), FailureOrigin::TransactionManager);
//! ```

mod catalog;
mod factory;

pub use catalog::{CatalogEntry, FailureCatalog, Overwrite};
pub use factory::SyntheticFailureFactory;

use std::fmt;

/// The semantic kind of a synthetic failure.
///
/// The set is closed. Every catalog entry has exactly one category, and
/// [`Unknown`](FailureCategory::Unknown) is reserved for codes the catalog
/// does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureCategory {
    /// The command exceeded its client-side timeout.
    CommandTimeout,
    /// A lock could not be acquired within the lock timeout.
    LockTimeout,
    /// The session was chosen as a deadlock victim.
    Deadlock,
    /// A snapshot-isolation update conflicted with a concurrent writer.
    SnapshotConflict,
    /// The distributed transaction coordinator aborted the transaction.
    TransactionAbort,
    /// The code is not in the catalog.
    Unknown,
}

impl FailureCategory {
    /// Every category, in declaration order.
    pub const ALL: [FailureCategory; 6] = [
        FailureCategory::CommandTimeout,
        FailureCategory::LockTimeout,
        FailureCategory::Deadlock,
        FailureCategory::SnapshotConflict,
        FailureCategory::TransactionAbort,
        FailureCategory::Unknown,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::CommandTimeout => "command_timeout",
            FailureCategory::LockTimeout => "lock_timeout",
            FailureCategory::Deadlock => "deadlock",
            FailureCategory::SnapshotConflict => "snapshot_conflict",
            FailureCategory::TransactionAbort => "transaction_abort",
            FailureCategory::Unknown => "unknown",
        }
    }

    /// The simulated subsystem that raises failures of this category.
    ///
    /// Unknown codes are attributed to the server, since only the driver
    /// reports numeric codes.
    pub fn origin(self) -> FailureOrigin {
        match self {
            FailureCategory::TransactionAbort => FailureOrigin::TransactionManager,
            _ => FailureOrigin::Server,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The simulated subsystem a failure comes from.
///
/// This separates driver-level failures, which carry a numeric server code,
/// from coordinator-level failures, which do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FailureOrigin {
    /// The database server, reached through the driver.
    Server,
    /// The distributed transaction manager.
    TransactionManager,
}

impl FailureOrigin {
    /// Stable name: `"server"` or `"transaction-manager"`.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureOrigin::Server => "server",
            FailureOrigin::TransactionManager => "transaction-manager",
        }
    }
}

impl fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, introspectable synthetic failure.
///
/// Descriptors are `Send + Sync` and never change after construction, so the
/// same value can be scripted into a source, handed to several threads, and
/// compared in assertions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FailureDescriptor {
    code: Option<i32>,
    category: FailureCategory,
    message: String,
    retryable: bool,
    origin: FailureOrigin,
}

/// Wire form of a descriptor; `origin` is optional and checked against the
/// category on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DescriptorFields {
    code: Option<i32>,
    category: FailureCategory,
    message: String,
    retryable: bool,
    #[serde(default)]
    origin: Option<FailureOrigin>,
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FailureDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let fields = <DescriptorFields as serde::Deserialize>::deserialize(deserializer)?;
        let expected = fields.category.origin();
        if let Some(origin) = fields.origin {
            if origin != expected {
                return Err(D::Error::custom(format!(
                    "origin {} does not match category {} (expected {})",
                    origin, fields.category, expected
                )));
            }
        }
        if fields.category == FailureCategory::TransactionAbort {
            if let Some(code) = fields.code {
                return Err(D::Error::custom(format!(
                    "category {} carries no code, found {}",
                    fields.category, code
                )));
            }
        }

        Ok(Self::new(
            fields.code,
            fields.category,
            fields.message,
            fields.retryable,
        ))
    }
}

impl FailureDescriptor {
    /// Build a descriptor directly, bypassing any catalog.
    ///
    /// The origin is derived from the category. Most callers want
    /// [`SyntheticFailureFactory::create`] instead.
    pub fn new(
        code: Option<i32>,
        category: FailureCategory,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            code,
            category,
            message: message.into(),
            retryable,
            origin: category.origin(),
        }
    }

    /// The numeric driver code, or `None` for coordinator-level failures.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// The semantic category.
    pub fn category(&self) -> FailureCategory {
        self.category
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the catalog considers this failure safe to retry.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// The simulated subsystem that raised the failure.
    pub fn origin(&self) -> FailureOrigin {
        self.origin
    }

    /// True for failures raised by the transaction coordinator rather than the server.
    pub fn is_coordinator_level(&self) -> bool {
        self.origin == FailureOrigin::TransactionManager
    }
}

impl fmt::Display for FailureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(
                f,
                "{} error {} ({}): {}",
                self.origin, code, self.category, self.message
            ),
            None => write!(f, "{} error ({}): {}", self.origin, self.category, self.message),
        }
    }
}

impl std::error::Error for FailureDescriptor {}
