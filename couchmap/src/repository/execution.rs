use crate::common::{SELECT_CAS, SELECT_COUNT, SELECT_ID};
use crate::convert::{json_to_document, MappingConverter};
use crate::document::Document;
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::mapping::MappedEntity;
use crate::query::{BoundQuery, Page, PageRequest, Slice, Statement};
use crate::store::StoreClient;
use std::marker::PhantomData;
use std::sync::Arc;

/// Entities converted one row at a time while iterating.
pub struct EntityStream<T> {
    inner: Box<dyn Iterator<Item = CouchmapResult<T>> + Send>,
}

impl<T> EntityStream<T> {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = CouchmapResult<T>> + Send + 'static,
    {
        EntityStream { inner: Box::new(iter) }
    }
}

impl<T> Iterator for EntityStream<T> {
    type Item = CouchmapResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Typed result of an executed query method.
pub enum QueryOutcome<T> {
    Entity(Option<T>),
    Collection(Vec<T>),
    Stream(EntityStream<T>),
    Page(Page<T>),
    Slice(Slice<T>),
}

impl<T> QueryOutcome<T> {
    /// Collects any outcome into a vector of entities.
    pub fn into_vec(self) -> CouchmapResult<Vec<T>> {
        match self {
            QueryOutcome::Entity(entity) => Ok(entity.into_iter().collect()),
            QueryOutcome::Collection(entities) => Ok(entities),
            QueryOutcome::Stream(stream) => stream.collect(),
            QueryOutcome::Page(page) => Ok(page.into_content()),
            QueryOutcome::Slice(slice) => Ok(slice.into_content()),
        }
    }
}

/// The execution paths a dispatched query method can take.
pub trait QueryExecution<T> {
    fn execute_entity(&self, query: &BoundQuery) -> CouchmapResult<Option<T>>;

    fn execute_collection(&self, query: &BoundQuery) -> CouchmapResult<Vec<T>>;

    fn execute_stream(&self, query: &BoundQuery) -> CouchmapResult<EntityStream<T>>;

    fn execute_paged(
        &self,
        count: &BoundQuery,
        content: &BoundQuery,
        page: PageRequest,
    ) -> CouchmapResult<Page<T>>;

    /// `content` is expected to fetch one row more than the page size.
    fn execute_sliced(
        &self,
        content: &BoundQuery,
        count: &BoundQuery,
        page: PageRequest,
    ) -> CouchmapResult<Slice<T>>;
}

/// Executes N1QL queries through a [StoreClient] and converts the rows.
pub struct N1qlExecution<T> {
    client: Arc<dyn StoreClient>,
    converter: MappingConverter,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for N1qlExecution<T> {
    fn clone(&self) -> Self {
        N1qlExecution {
            client: self.client.clone(),
            converter: self.converter.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: MappedEntity> N1qlExecution<T> {
    pub fn new(client: Arc<dyn StoreClient>, converter: MappingConverter) -> Self {
        N1qlExecution {
            client,
            converter,
            _marker: PhantomData,
        }
    }

    fn fetch_rows(&self, query: &BoundQuery) -> CouchmapResult<Vec<serde_json::Value>> {
        let result = self.client.query(query)?;
        if !result.is_success() {
            log::error!("Query {} failed: {:?}", query.statement(), result.errors());
            return Err(CouchmapError::new(
                &format!(
                    "Unable to execute query '{}': {}",
                    query.statement(),
                    result.errors().join(", ")
                ),
                ErrorKind::QueryError,
            ));
        }
        Ok(result.into_rows())
    }

    fn convert(&self, row: serde_json::Value) -> CouchmapResult<T> {
        let document = row_to_document(row, self.client.bucket_name())?;
        self.converter.read(&document)
    }

    fn convert_all(&self, rows: Vec<serde_json::Value>) -> CouchmapResult<Vec<T>> {
        rows.into_iter().map(|row| self.convert(row)).collect()
    }
}

impl<T: MappedEntity> QueryExecution<T> for N1qlExecution<T> {
    fn execute_entity(&self, query: &BoundQuery) -> CouchmapResult<Option<T>> {
        self.fetch_rows(query)?
            .into_iter()
            .next()
            .map(|row| self.convert(row))
            .transpose()
    }

    fn execute_collection(&self, query: &BoundQuery) -> CouchmapResult<Vec<T>> {
        let rows = self.fetch_rows(query)?;
        self.convert_all(rows)
    }

    fn execute_stream(&self, query: &BoundQuery) -> CouchmapResult<EntityStream<T>> {
        let rows = self.fetch_rows(query)?;
        let converter = self.converter.clone();
        let bucket_name = self.client.bucket_name().to_string();
        Ok(EntityStream::new(rows.into_iter().map(move |row| {
            let document = row_to_document(row, &bucket_name)?;
            converter.read(&document)
        })))
    }

    fn execute_paged(
        &self,
        count: &BoundQuery,
        content: &BoundQuery,
        page: PageRequest,
    ) -> CouchmapResult<Page<T>> {
        let total = count_from_rows(&self.fetch_rows(count)?, count.statement())?;
        let rows = self.fetch_rows(content)?;
        Ok(Page::new(self.convert_all(rows)?, page, total))
    }

    fn execute_sliced(
        &self,
        content: &BoundQuery,
        _count: &BoundQuery,
        page: PageRequest,
    ) -> CouchmapResult<Slice<T>> {
        let mut rows = self.fetch_rows(content)?;
        let has_next = rows.len() > page.page_size();
        rows.truncate(page.page_size());
        Ok(Slice::new(self.convert_all(rows)?, page, has_next))
    }
}

/// Reads the total from the first row of a count query.
///
/// No rows count as zero. A first row without an unsigned `count` column
/// is a query error.
pub fn count_from_rows(rows: &[serde_json::Value], statement: &Statement) -> CouchmapResult<u64> {
    let Some(row) = rows.first() else {
        return Ok(0);
    };
    match row.get(SELECT_COUNT).and_then(|count| count.as_u64()) {
        Some(total) => Ok(total),
        None => {
            log::error!("Count query {} returned {}", statement, row);
            Err(CouchmapError::new(
                &format!(
                    "Count query '{}' returned no unsigned '{}' column",
                    statement, SELECT_COUNT
                ),
                ErrorKind::QueryError,
            ))
        }
    }
}

/// Turns a query row into a document.
///
/// `_ID` and `_CAS` become id and version. When the remaining row is the
/// document nested under the bucket name, as produced by `b.*`-less
/// projections, that object is unwrapped.
pub fn row_to_document(row: serde_json::Value, bucket_name: &str) -> CouchmapResult<Document> {
    let mut map = match row {
        serde_json::Value::Object(map) => map,
        other => {
            log::error!("Query row {} is not an object", other);
            return Err(CouchmapError::new(
                "Query row must be a JSON object",
                ErrorKind::QueryError,
            ));
        }
    };

    // shift removal keeps the remaining columns in row order
    let id = map.shift_remove(SELECT_ID);
    let cas = map.shift_remove(SELECT_CAS);

    let only_field = map.len() == 1;
    let nested = match map.get_mut(bucket_name) {
        Some(serde_json::Value::Object(inner)) if only_field => Some(std::mem::take(inner)),
        _ => None,
    };
    let content = nested.unwrap_or(map);

    let mut document = json_to_document(content);
    match id {
        Some(serde_json::Value::String(id)) => document.set_id(id),
        Some(serde_json::Value::Number(id)) => document.set_id(id.to_string()),
        _ => {}
    }
    if let Some(cas) = cas.and_then(|cas| cas.as_u64()).filter(|cas| *cas != 0) {
        document.set_version(cas);
    }
    Ok(document)
}
