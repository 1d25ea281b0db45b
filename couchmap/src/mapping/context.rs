use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::mapping::{MappedEntity, PersistentEntity};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

type EntityCache = DashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Registry of entity metadata, keyed by entity type.
///
/// Metadata of a type is built on first request and shared afterwards. The
/// context is cheap to clone; clones share the same cache.
#[derive(Clone, Default)]
pub struct MappingContext {
    inner: Arc<MappingContextInner>,
}

#[derive(Default)]
struct MappingContextInner {
    entities: EntityCache,
}

impl MappingContext {
    pub fn new() -> Self {
        MappingContext::default()
    }

    /// Returns the metadata of `T`, building and caching it if needed.
    ///
    /// Concurrent first requests for the same type build the metadata exactly
    /// once; every caller observes the same instance.
    pub fn persistent_entity<T: MappedEntity>(&self) -> CouchmapResult<Arc<PersistentEntity<T>>> {
        let type_id = TypeId::of::<T>();
        if let Some(entry) = self.inner.entities.get(&type_id) {
            return downcast(entry.value().clone());
        }

        let cached = {
            let entry = self.inner.entities.entry(type_id).or_try_insert_with(|| {
                let entity = T::describe().build()?;
                log::debug!(
                    "Built mapping metadata for {} with {} properties",
                    entity.name(),
                    entity.properties().len()
                );
                Ok::<_, CouchmapError>(Arc::new(entity) as Arc<dyn Any + Send + Sync>)
            })?;
            entry.value().clone()
        };
        downcast(cached)
    }

    /// Checks whether metadata of `T` has been built already.
    pub fn contains<T: MappedEntity>(&self) -> bool {
        self.inner.entities.contains_key(&TypeId::of::<T>())
    }

    /// Number of entity types with cached metadata.
    pub fn len(&self) -> usize {
        self.inner.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entities.is_empty()
    }
}

fn downcast<T: MappedEntity>(
    cached: Arc<dyn Any + Send + Sync>,
) -> CouchmapResult<Arc<PersistentEntity<T>>> {
    cached.downcast::<PersistentEntity<T>>().map_err(|_| {
        log::error!("Cached mapping metadata has an unexpected type");
        CouchmapError::new(
            &format!("No mapping metadata found for entity of type {}", std::any::type_name::<T>()),
            ErrorKind::InternalError,
        )
    })
}
