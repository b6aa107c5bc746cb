//! Registry of known failure codes.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::FailureCategory;
use crate::error::{CatalogError, DuplicateCodeError};

/// Client-side command timeout.
pub(crate) const COMMAND_TIMEOUT: i32 = -2;
/// Lock request timeout.
pub(crate) const LOCK_TIMEOUT: i32 = 1222;
/// Deadlock victim.
pub(crate) const DEADLOCK: i32 = 1205;
/// Snapshot isolation update conflict.
pub(crate) const SNAPSHOT_CONFLICT: i32 = 3960;

const COMMAND_TIMEOUT_MESSAGE: &str = "Execution Timeout Expired. The timeout period elapsed \
     prior to completion of the operation or the server is not responding.";
const LOCK_TIMEOUT_MESSAGE: &str = "Lock request time out period exceeded.";
const DEADLOCK_MESSAGE: &str = "Transaction was deadlocked on lock resources with another \
     process and has been chosen as the deadlock victim. Rerun the transaction.";
const SNAPSHOT_CONFLICT_MESSAGE: &str = "Snapshot isolation transaction aborted due to update \
     conflict. Retry the transaction or change the isolation level for the update/delete \
     statement.";
const TRANSACTION_ABORT_MESSAGE: &str = "The transaction has aborted.";

/// What to do when a code is registered a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Fail with [`DuplicateCodeError`].
    #[default]
    Reject,
    /// Replace the existing entry entirely.
    Replace,
}

/// Catalog metadata for one failure code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    code: Option<i32>,
    category: FailureCategory,
    default_message: String,
    retryable: bool,
}

impl CatalogEntry {
    fn new(
        code: Option<i32>,
        category: FailureCategory,
        default_message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            code,
            category,
            default_message: default_message.into(),
            retryable,
        }
    }

    /// The registered code; `None` for the category-only coordinator entry.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// The category every failure with this code belongs to.
    pub fn category(&self) -> FailureCategory {
        self.category
    }

    /// Message used when the caller does not supply one.
    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    /// Whether retrying a failure with this code is considered safe.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

/// Maps failure codes to their [`CatalogEntry`].
///
/// A catalog is assembled during test setup and treated as read-only once
/// handed to a [`SyntheticFailureFactory`](super::SyntheticFailureFactory).
/// The process-wide default is available through [`FailureCatalog::global`].
///
/// # Examples
///
/// ```rust
/// use faultscript::{FailureCatalog, FailureCategory, Overwrite};
///
/// let mut catalog = FailureCatalog::with_defaults();
/// catalog
///     .register(40501, FailureCategory::CommandTimeout, "The service is busy.", true)
///     .unwrap();
///
/// // A second registration must opt in to replacing the first.
/// assert!(catalog
///     .register(40501, FailureCategory::LockTimeout, "busy", false)
///     .is_err());
/// catalog
///     .register_with(40501, FailureCategory::LockTimeout, "busy", false, Overwrite::Replace)
///     .unwrap();
///
/// let entry = catalog.lookup(40501).unwrap();
/// assert_eq!(entry.category(), FailureCategory::LockTimeout);
/// assert!(!entry.is_retryable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureCatalog {
    entries: BTreeMap<i32, CatalogEntry>,
    transaction_abort: CatalogEntry,
}

impl FailureCatalog {
    /// A catalog with no coded entries.
    ///
    /// The category-only transaction abort entry is always present.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            transaction_abort: CatalogEntry::new(
                None,
                FailureCategory::TransactionAbort,
                TRANSACTION_ABORT_MESSAGE,
                false,
            ),
        }
    }

    /// A catalog seeded with the standard driver codes.
    ///
    /// | code | category | retryable |
    /// |------|----------|-----------|
    /// | -2 | `CommandTimeout` | yes |
    /// | 1222 | `LockTimeout` | yes |
    /// | 1205 | `Deadlock` | yes |
    /// | 3960 | `SnapshotConflict` | yes |
    /// | (none) | `TransactionAbort` | no |
    pub fn with_defaults() -> Self {
        let mut catalog = Self::empty();
        let seed = [
            (COMMAND_TIMEOUT, FailureCategory::CommandTimeout, COMMAND_TIMEOUT_MESSAGE),
            (LOCK_TIMEOUT, FailureCategory::LockTimeout, LOCK_TIMEOUT_MESSAGE),
            (DEADLOCK, FailureCategory::Deadlock, DEADLOCK_MESSAGE),
            (SNAPSHOT_CONFLICT, FailureCategory::SnapshotConflict, SNAPSHOT_CONFLICT_MESSAGE),
        ];
        for (code, category, message) in seed {
            catalog
                .entries
                .insert(code, CatalogEntry::new(Some(code), category, message, true));
        }
        catalog
    }

    /// The process-wide default catalog.
    ///
    /// Seeded on first use and never mutated afterwards. Tests that need extra
    /// codes build their own catalog with [`FailureCatalog::with_defaults`].
    pub fn global() -> &'static FailureCatalog {
        static GLOBAL: OnceLock<FailureCatalog> = OnceLock::new();
        GLOBAL.get_or_init(FailureCatalog::with_defaults)
    }

    /// Look up a code.
    pub fn lookup(&self, code: i32) -> Option<&CatalogEntry> {
        self.entries.get(&code)
    }

    /// The category-only entry describing a coordinator-level abort.
    pub fn transaction_abort_entry(&self) -> &CatalogEntry {
        &self.transaction_abort
    }

    /// True if `code` has an entry.
    pub fn contains(&self, code: i32) -> bool {
        self.entries.contains_key(&code)
    }

    /// Number of coded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no coded entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coded entries in ascending code order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Register a new code, failing if it already exists.
    pub fn register(
        &mut self,
        code: i32,
        category: FailureCategory,
        message: impl Into<String>,
        retryable: bool,
    ) -> Result<(), CatalogError> {
        self.register_with(code, category, message, retryable, Overwrite::Reject)
    }

    /// Register a code, replacing an existing entry only if `overwrite` allows it.
    ///
    /// `Unknown` and `TransactionAbort` cannot be attached to a code: the first
    /// marks codes absent from the catalog, the second belongs to the
    /// category-only coordinator entry.
    pub fn register_with(
        &mut self,
        code: i32,
        category: FailureCategory,
        message: impl Into<String>,
        retryable: bool,
        overwrite: Overwrite,
    ) -> Result<(), CatalogError> {
        if matches!(
            category,
            FailureCategory::Unknown | FailureCategory::TransactionAbort
        ) {
            return Err(CatalogError::ReservedCategory { code, category });
        }
        if overwrite == Overwrite::Reject && self.entries.contains_key(&code) {
            return Err(DuplicateCodeError { code }.into());
        }

        let entry = CatalogEntry::new(Some(code), category, message, retryable);
        let _replaced = self.entries.insert(code, entry);

        #[cfg(feature = "tracing")]
        if let Some(old) = _replaced {
            tracing::debug!(
                code,
                old_category = %old.category,
                new_category = %category,
                "replaced catalog entry"
            );
        }

        Ok(())
    }

    /// Change the message and retryability of the coordinator abort entry.
    pub fn configure_transaction_abort(&mut self, message: impl Into<String>, retryable: bool) {
        self.transaction_abort = CatalogEntry::new(
            None,
            FailureCategory::TransactionAbort,
            message,
            retryable,
        );
    }
}

impl Default for FailureCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}
