//! Configuration of a couchmap instance.

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::index::IndexManager;
use crate::query::Consistency;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Settings shared by every component of a couchmap instance.
///
/// The configuration is cheap to clone; clones share state. Once the instance
/// is opened the configuration is frozen and setters fail.
#[derive(Clone)]
pub struct CouchmapConfig {
    inner: Arc<CouchmapConfigInner>,
}

impl Default for CouchmapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CouchmapConfig {
    pub fn new() -> Self {
        CouchmapConfig {
            inner: Arc::new(CouchmapConfigInner::new()),
        }
    }

    /// The bucket entities are stored in, once known.
    pub fn bucket_name(&self) -> Option<String> {
        self.inner.bucket_name.get().cloned()
    }

    /// Sets the bucket name. It can be set once and must not be empty.
    pub fn set_bucket_name(&self, bucket_name: &str) -> CouchmapResult<()> {
        self.inner.set_bucket_name(bucket_name)
    }

    /// Consistency level used by repository queries.
    pub fn consistency(&self) -> Consistency {
        self.inner.consistency.read_with(|it| *it)
    }

    pub fn set_consistency(&self, consistency: Consistency) -> CouchmapResult<()> {
        self.inner.ensure_not_configured("Consistency")?;
        self.inner.consistency.write_with(|it| *it = consistency);
        Ok(())
    }

    /// Field the converter writes the entity type name to, if any.
    pub fn type_key(&self) -> Option<String> {
        self.inner.type_key.read_with(|it| it.clone())
    }

    pub fn set_type_key(&self, type_key: Option<&str>) -> CouchmapResult<()> {
        self.inner.ensure_not_configured("Type key")?;
        if type_key.is_some_and(str::is_empty) {
            log::error!("Type key cannot be empty");
            return Err(CouchmapError::new(
                "Type key cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }
        self.inner
            .type_key
            .write_with(|it| *it = type_key.map(str::to_string));
        Ok(())
    }

    /// Index manager honoring the configured ignore flags.
    pub fn index_manager(&self) -> IndexManager {
        IndexManager::new(
            self.inner.ignore_views.load(Ordering::Relaxed),
            self.inner.ignore_n1ql_primary.load(Ordering::Relaxed),
            self.inner.ignore_n1ql_secondary.load(Ordering::Relaxed),
        )
    }

    pub fn set_ignore_views(&self, ignore: bool) -> CouchmapResult<()> {
        self.inner.ensure_not_configured("Index settings")?;
        self.inner.ignore_views.store(ignore, Ordering::Relaxed);
        Ok(())
    }

    pub fn set_ignore_n1ql_primary(&self, ignore: bool) -> CouchmapResult<()> {
        self.inner.ensure_not_configured("Index settings")?;
        self.inner.ignore_n1ql_primary.store(ignore, Ordering::Relaxed);
        Ok(())
    }

    pub fn set_ignore_n1ql_secondary(&self, ignore: bool) -> CouchmapResult<()> {
        self.inner.ensure_not_configured("Index settings")?;
        self.inner.ignore_n1ql_secondary.store(ignore, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// Freezes the configuration. A bucket name is required by then.
    pub(crate) fn initialize(&self) -> CouchmapResult<()> {
        if self.inner.bucket_name.get().is_none() {
            log::error!("No bucket name configured");
            return Err(CouchmapError::new(
                "Bucket name is not configured",
                ErrorKind::ConfigurationError,
            ));
        }
        self.inner.configured.store(true, Ordering::Relaxed);
        Ok(())
    }
}

struct CouchmapConfigInner {
    configured: AtomicBool,
    bucket_name: OnceLock<String>,
    consistency: Atomic<Consistency>,
    type_key: Atomic<Option<String>>,
    ignore_views: AtomicBool,
    ignore_n1ql_primary: AtomicBool,
    ignore_n1ql_secondary: AtomicBool,
}

impl CouchmapConfigInner {
    fn new() -> Self {
        CouchmapConfigInner {
            configured: AtomicBool::new(false),
            bucket_name: OnceLock::new(),
            consistency: atomic(Consistency::DEFAULT),
            type_key: atomic(None),
            ignore_views: AtomicBool::new(false),
            ignore_n1ql_primary: AtomicBool::new(false),
            ignore_n1ql_secondary: AtomicBool::new(false),
        }
    }

    fn ensure_not_configured(&self, setting: &str) -> CouchmapResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(CouchmapError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn set_bucket_name(&self, bucket_name: &str) -> CouchmapResult<()> {
        self.ensure_not_configured("Bucket name")?;
        if bucket_name.trim().is_empty() {
            log::error!("Bucket name cannot be empty");
            return Err(CouchmapError::new(
                "Bucket name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        let current = self.bucket_name.get_or_init(|| bucket_name.to_string());
        if current != bucket_name {
            log::error!("Bucket name already set to {}", current);
            return Err(CouchmapError::new(
                &format!("Bucket name is already set to '{}'", current),
                ErrorKind::ConfigurationError,
            ));
        }
        Ok(())
    }
}
