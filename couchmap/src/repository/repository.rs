use crate::common::Value;
use crate::errors::CouchmapResult;
use crate::mapping::{MappedEntity, PersistentEntity};
use crate::query::{build_query, Consistency, Page, PageRequest, SelectBuilder};
use crate::repository::{
    count_from_rows, CouchbaseTemplate, N1qlExecution, QueryExecution, QueryMethod, QueryOutcome,
    StringN1qlQuery,
};
use std::sync::Arc;

/// CRUD operations and query methods for one entity type.
pub struct CouchbaseRepository<T> {
    template: CouchbaseTemplate,
    entity: Arc<PersistentEntity<T>>,
    consistency: Consistency,
}

impl<T: MappedEntity> CouchbaseRepository<T> {
    pub fn new(
        template: CouchbaseTemplate,
        entity: Arc<PersistentEntity<T>>,
        consistency: Consistency,
    ) -> Self {
        CouchbaseRepository {
            template,
            entity,
            consistency,
        }
    }

    pub fn entity(&self) -> &PersistentEntity<T> {
        &self.entity
    }

    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    pub fn template(&self) -> &CouchbaseTemplate {
        &self.template
    }

    /// Saves `entity` and returns its new CAS.
    pub fn save(&self, entity: &T) -> CouchmapResult<u64> {
        self.template.save(entity)
    }

    pub fn insert(&self, entity: &T) -> CouchmapResult<u64> {
        self.template.insert(entity)
    }

    pub fn find_by_id(&self, id: &str) -> CouchmapResult<Option<T>> {
        self.template.find_by_id(id)
    }

    pub fn exists_by_id(&self, id: &str) -> CouchmapResult<bool> {
        self.template.exists(id)
    }

    pub fn delete_by_id(&self, id: &str) -> CouchmapResult<()> {
        self.template.remove_by_id(id)
    }

    /// Finds all entities of this type, one page at a time.
    ///
    /// Documents are told apart by the type key. Without one, every document
    /// of the bucket is taken to be of this type.
    pub fn find_all(&self, page: PageRequest) -> CouchmapResult<Page<T>> {
        let select = self.select_all();
        let content = select.clone().limit(page.page_size()).offset(page.offset());
        let scan_consistency = self.consistency.query_consistency();
        self.execution().execute_paged(
            &build_query(select.build_count(), vec![], scan_consistency),
            &build_query(content.build(), vec![], scan_consistency),
            page,
        )
    }

    /// Counts the entities of this type.
    pub fn count(&self) -> CouchmapResult<u64> {
        let query = build_query(
            self.select_all().build_count(),
            vec![],
            self.consistency.query_consistency(),
        );
        let result = self.template.query_n1ql(&query)?;
        count_from_rows(result.rows(), query.statement())
    }

    /// Declares a query method backed by a statement template.
    pub fn string_query(&self, template: &str, method: QueryMethod) -> StringN1qlQuery<T> {
        StringN1qlQuery::new(
            template,
            method,
            self.consistency,
            self.execution(),
            self.template.bucket_name(),
        )
    }

    /// Declares and runs a query method in one go.
    pub fn query(
        &self,
        template: &str,
        method: QueryMethod,
        args: Vec<Value>,
        page: Option<PageRequest>,
    ) -> CouchmapResult<QueryOutcome<T>> {
        self.string_query(template, method).execute(args, page)
    }

    fn execution(&self) -> N1qlExecution<T> {
        N1qlExecution::new(self.template.client().clone(), self.template.converter().clone())
    }

    fn select_all(&self) -> SelectBuilder {
        let select = SelectBuilder::new(self.template.bucket_name());
        match self.template.converter().type_key() {
            Some(type_key) => select.type_filter(type_key, self.entity.name()),
            None => select,
        }
    }
}
