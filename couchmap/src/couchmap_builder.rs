use crate::couchmap::Couchmap;
use crate::couchmap_config::CouchmapConfig;
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::query::Consistency;
use crate::store::StoreClient;
use std::sync::Arc;

/// Builder for a [Couchmap] instance.
///
/// Setting errors are captured and reported by [CouchmapBuilder::open], so
/// calls can be chained without checking each one.
///
/// ```rust,ignore
/// let couchmap = Couchmap::builder()
///     .bucket_name("travel")
///     .consistency(Consistency::StronglyConsistent)
///     .type_key("_class")
///     .open(Arc::new(InMemoryStoreClient::new("travel")))?;
/// ```
#[derive(Default)]
pub struct CouchmapBuilder {
    error: Option<CouchmapError>,
    config: CouchmapConfig,
}

impl CouchmapBuilder {
    pub fn new() -> Self {
        CouchmapBuilder {
            error: None,
            config: CouchmapConfig::new(),
        }
    }

    /// Sets the bucket name. Defaults to the bucket of the store client.
    pub fn bucket_name(mut self, bucket_name: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_bucket_name(bucket_name) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn consistency(mut self, consistency: Consistency) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_consistency(consistency) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the consistency level by name, e.g. from a settings file.
    pub fn consistency_name(mut self, name: &str) -> Self {
        if self.error.is_none() {
            let result = name
                .parse::<Consistency>()
                .and_then(|consistency| self.config.set_consistency(consistency));
            if let Err(e) = result {
                self.error = Some(e);
            }
        }
        self
    }

    /// Writes the entity type name under `type_key` in every document.
    pub fn type_key(mut self, type_key: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_type_key(Some(type_key)) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn ignore_views(mut self, ignore: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_ignore_views(ignore) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn ignore_n1ql_primary(mut self, ignore: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_ignore_n1ql_primary(ignore) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn ignore_n1ql_secondary(mut self, ignore: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_ignore_n1ql_secondary(ignore) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens a couchmap instance over `client`.
    ///
    /// Fails with the first captured setting error, or when the configured
    /// bucket differs from the bucket of the client.
    pub fn open(self, client: Arc<dyn StoreClient>) -> CouchmapResult<Couchmap> {
        if let Some(error) = self.error {
            return Err(error);
        }

        match self.config.bucket_name() {
            Some(bucket_name) if bucket_name != client.bucket_name() => {
                log::error!(
                    "Configured bucket {} does not match client bucket {}",
                    bucket_name,
                    client.bucket_name()
                );
                return Err(CouchmapError::new(
                    &format!(
                        "Configured bucket '{}' does not match store client bucket '{}'",
                        bucket_name,
                        client.bucket_name()
                    ),
                    ErrorKind::ConfigurationError,
                ));
            }
            Some(_) => {}
            None => self.config.set_bucket_name(client.bucket_name())?,
        }

        self.config.initialize()?;
        log::info!(
            "Opened couchmap on bucket {} with {} consistency",
            client.bucket_name(),
            self.config.consistency()
        );
        Ok(Couchmap::new(self.config, client))
    }
}
