use crate::convert::{JsonTranslationService, MappingConverter};
use crate::couchmap_builder::CouchmapBuilder;
use crate::couchmap_config::CouchmapConfig;
use crate::errors::CouchmapResult;
use crate::index::{IndexManager, IndexReport};
use crate::mapping::{MappedEntity, MappingContext, PersistentEntity};
use crate::repository::{CouchbaseRepository, CouchbaseTemplate};
use crate::store::StoreClient;
use std::sync::Arc;

/// Entry point of couchmap: ties a [StoreClient] to the mapping metadata,
/// the converter and the index manager.
///
/// The instance is cheap to clone and clones share the same mapping cache.
///
/// # Examples
///
/// ```rust,ignore
/// use couchmap::couchmap::Couchmap;
/// use couchmap::store::InMemoryStoreClient;
///
/// let couchmap = Couchmap::builder().open(Arc::new(InMemoryStoreClient::new("travel")))?;
/// let airlines = couchmap.repository::<Airline>()?;
/// airlines.save(&airline)?;
/// ```
#[derive(Clone)]
pub struct Couchmap {
    inner: Arc<CouchmapInner>,
}

impl Couchmap {
    /// Creates a builder to configure and open an instance.
    pub fn builder() -> CouchmapBuilder {
        CouchmapBuilder::new()
    }

    pub(crate) fn new(config: CouchmapConfig, client: Arc<dyn StoreClient>) -> Self {
        let context = MappingContext::new();
        let converter = MappingConverter::new(context.clone(), Arc::new(JsonTranslationService::new()))
            .with_type_key(config.type_key().as_deref());
        let template = CouchbaseTemplate::new(client.clone(), converter.clone());
        let index_manager = config.index_manager();

        Couchmap {
            inner: Arc::new(CouchmapInner {
                config,
                client,
                context,
                converter,
                template,
                index_manager,
            }),
        }
    }

    pub fn config(&self) -> &CouchmapConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<dyn StoreClient> {
        &self.inner.client
    }

    pub fn mapping_context(&self) -> &MappingContext {
        &self.inner.context
    }

    pub fn converter(&self) -> &MappingConverter {
        &self.inner.converter
    }

    pub fn template(&self) -> &CouchbaseTemplate {
        &self.inner.template
    }

    pub fn index_manager(&self) -> &IndexManager {
        &self.inner.index_manager
    }

    /// Resolves the mapping metadata of `T`, building it on first use.
    pub fn persistent_entity<T: MappedEntity>(&self) -> CouchmapResult<Arc<PersistentEntity<T>>> {
        self.inner.context.persistent_entity::<T>()
    }

    /// Ensures the indexes declared by `T` exist in the bucket.
    pub fn build_indexes<T: MappedEntity>(&self) -> CouchmapResult<Vec<IndexReport>> {
        let entity = self.persistent_entity::<T>()?;
        self.inner
            .index_manager
            .build_indexes(&entity, self.inner.client.as_ref())
    }

    /// Creates a repository for `T` using the configured consistency.
    ///
    /// Declared indexes are created first, unless the index manager is told
    /// to ignore them.
    pub fn repository<T: MappedEntity>(&self) -> CouchmapResult<CouchbaseRepository<T>> {
        let entity = self.persistent_entity::<T>()?;
        let reports = self
            .inner
            .index_manager
            .build_indexes(&entity, self.inner.client.as_ref())?;
        log::debug!(
            "Created repository for {} with {} index declarations",
            entity.name(),
            reports.len()
        );
        Ok(CouchbaseRepository::new(
            self.inner.template.clone(),
            entity,
            self.inner.config.consistency(),
        ))
    }
}

struct CouchmapInner {
    config: CouchmapConfig,
    client: Arc<dyn StoreClient>,
    context: MappingContext,
    converter: MappingConverter,
    template: CouchbaseTemplate,
    index_manager: IndexManager,
}
