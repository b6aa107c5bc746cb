//! Construction of synthetic failures from catalog codes.

use std::sync::Arc;

use super::catalog::{COMMAND_TIMEOUT, DEADLOCK, LOCK_TIMEOUT, SNAPSHOT_CONFLICT};
use super::{FailureCatalog, FailureCategory, FailureDescriptor};

#[derive(Debug, Clone)]
enum CatalogRef {
    Global,
    Owned(Arc<FailureCatalog>),
}

/// Builds [`FailureDescriptor`] values by consulting a [`FailureCatalog`].
///
/// Construction never fails: a code the catalog does not know still produces
/// a descriptor, categorised as [`FailureCategory::Unknown`] and not
/// retryable, because real drivers report unexpected codes too.
///
/// # Examples
///
/// ```rust
/// use faultscript::{FailureCategory, SyntheticFailureFactory};
///
/// let factory = SyntheticFailureFactory::new();
///
/// let timeout = factory.create(-2, Some("query took too long"));
/// assert_eq!(timeout.category(), FailureCategory::CommandTimeout);
/// assert_eq!(timeout.message(), "query took too long");
///
/// let odd = factory.create(50000, None);
/// assert_eq!(odd.category(), FailureCategory::Unknown);
/// assert!(!odd.is_retryable());
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticFailureFactory {
    catalog: CatalogRef,
}

impl SyntheticFailureFactory {
    /// A factory backed by [`FailureCatalog::global`].
    pub fn new() -> Self {
        Self {
            catalog: CatalogRef::Global,
        }
    }

    /// A factory backed by a caller-assembled catalog.
    pub fn with_catalog(catalog: Arc<FailureCatalog>) -> Self {
        Self {
            catalog: CatalogRef::Owned(catalog),
        }
    }

    /// The catalog this factory consults.
    pub fn catalog(&self) -> &FailureCatalog {
        match &self.catalog {
            CatalogRef::Global => FailureCatalog::global(),
            CatalogRef::Owned(catalog) => catalog.as_ref(),
        }
    }

    /// Build the descriptor for `code`.
    ///
    /// `message_override` replaces the catalog's default message. It never
    /// changes the category or retryability.
    pub fn create(&self, code: i32, message_override: Option<&str>) -> FailureDescriptor {
        match self.catalog().lookup(code) {
            Some(entry) => FailureDescriptor::new(
                Some(code),
                entry.category(),
                message_override.unwrap_or(entry.default_message()),
                entry.is_retryable(),
            ),
            None => {
                let message = match message_override {
                    Some(m) => m.to_string(),
                    None => format!("unknown failure code {}", code),
                };
                FailureDescriptor::new(Some(code), FailureCategory::Unknown, message, false)
            }
        }
    }

    /// Build a coordinator-level transaction abort.
    ///
    /// No code is looked up. An empty `message` falls back to the catalog's
    /// default abort message.
    pub fn create_transaction_abort(&self, message: &str) -> FailureDescriptor {
        let entry = self.catalog().transaction_abort_entry();
        let message = if message.is_empty() {
            entry.default_message()
        } else {
            message
        };
        FailureDescriptor::new(None, entry.category(), message, entry.is_retryable())
    }

    /// Code -2 with its default message.
    pub fn command_timeout(&self) -> FailureDescriptor {
        self.create(COMMAND_TIMEOUT, None)
    }

    /// Code 1222 with its default message.
    pub fn lock_timeout(&self) -> FailureDescriptor {
        self.create(LOCK_TIMEOUT, None)
    }

    /// Code 1205 with its default message.
    pub fn deadlock(&self) -> FailureDescriptor {
        self.create(DEADLOCK, None)
    }

    /// Code 3960 with its default message.
    pub fn snapshot_conflict(&self) -> FailureDescriptor {
        self.create(SNAPSHOT_CONFLICT, None)
    }
}

impl Default for SyntheticFailureFactory {
    fn default() -> Self {
        Self::new()
    }
}
