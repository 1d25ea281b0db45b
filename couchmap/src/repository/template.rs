use crate::convert::MappingConverter;
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::mapping::MappedEntity;
use crate::query::{BoundQuery, ViewQuery};
use crate::repository::{N1qlExecution, QueryExecution};
use crate::store::{QueryResult, StoreClient, StoredDocument};
use std::sync::Arc;

/// Entity level operations over a [StoreClient].
#[derive(Clone)]
pub struct CouchbaseTemplate {
    client: Arc<dyn StoreClient>,
    converter: MappingConverter,
}

impl CouchbaseTemplate {
    pub fn new(client: Arc<dyn StoreClient>, converter: MappingConverter) -> Self {
        CouchbaseTemplate { client, converter }
    }

    pub fn client(&self) -> &Arc<dyn StoreClient> {
        &self.client
    }

    pub fn converter(&self) -> &MappingConverter {
        &self.converter
    }

    pub fn bucket_name(&self) -> &str {
        self.client.bucket_name()
    }

    /// Inserts or replaces `entity` and returns the new CAS.
    ///
    /// When the entity carries a version, the stored document must still have
    /// that CAS, otherwise the save fails with `CasMismatch`.
    pub fn save<T: MappedEntity>(&self, entity: &T) -> CouchmapResult<u64> {
        let stored = self.to_stored(entity)?;
        self.client.upsert(stored)
    }

    /// Inserts `entity`, failing with `DocumentExists` when the id is taken.
    pub fn insert<T: MappedEntity>(&self, entity: &T) -> CouchmapResult<u64> {
        let stored = self.to_stored(entity)?;
        self.client.insert(stored.with_cas(0))
    }

    pub fn find_by_id<T: MappedEntity>(&self, id: &str) -> CouchmapResult<Option<T>> {
        match self.client.get(id)? {
            Some(stored) => self
                .converter
                .read_raw(stored.id(), stored.content(), stored.cas())
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn exists(&self, id: &str) -> CouchmapResult<bool> {
        Ok(self.client.get(id)?.is_some())
    }

    pub fn remove_by_id(&self, id: &str) -> CouchmapResult<()> {
        self.client.remove(id)
    }

    /// Runs a query and fails with `QueryError` unless it succeeded.
    pub fn query_n1ql(&self, query: &BoundQuery) -> CouchmapResult<QueryResult> {
        let result = self.client.query(query)?;
        if result.is_success() {
            Ok(result)
        } else {
            log::error!("Query {} failed: {:?}", query.statement(), result.errors());
            Err(CouchmapError::new(
                &format!(
                    "Unable to execute query '{}': {}",
                    query.statement(),
                    result.errors().join(", ")
                ),
                ErrorKind::QueryError,
            ))
        }
    }

    /// Runs an entity query and converts every row.
    pub fn find_by_n1ql<T: MappedEntity>(&self, query: &BoundQuery) -> CouchmapResult<Vec<T>> {
        N1qlExecution::<T>::new(self.client.clone(), self.converter.clone()).execute_collection(query)
    }

    /// Loads the documents emitting the rows of a view.
    ///
    /// Rows without a document id, and ids whose document is gone, are
    /// skipped.
    pub fn find_by_view<T: MappedEntity>(&self, query: &ViewQuery) -> CouchmapResult<Vec<T>> {
        let rows = self.client.query_view(query)?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(id) = row.id() {
                if let Some(entity) = self.find_by_id(id)? {
                    entities.push(entity);
                }
            }
        }
        Ok(entities)
    }

    fn to_stored<T: MappedEntity>(&self, entity: &T) -> CouchmapResult<StoredDocument> {
        let document = self.converter.to_document(entity)?;
        let (Some(id), Some(raw_value)) = (document.id(), document.raw_value()) else {
            log::error!("Converted document has no id or content");
            return Err(CouchmapError::new(
                "Converted document is missing its id or content",
                ErrorKind::InternalError,
            ));
        };

        Ok(StoredDocument::new(id, raw_value)
            .with_cas(document.version().unwrap_or(0))
            .with_expiry(document.expiry()))
    }
}
