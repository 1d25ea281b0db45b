use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::index::DesignDocument;
use crate::query::{BoundQuery, ViewQuery};
use crate::store::{QueryResult, StoreClient, StoredDocument, ViewRow};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Answers N1QL queries for an [InMemoryStoreClient].
pub type QueryHandler = Arc<dyn Fn(&BoundQuery) -> CouchmapResult<QueryResult> + Send + Sync>;

/// Answers view queries for an [InMemoryStoreClient].
pub type ViewHandler = Arc<dyn Fn(&ViewQuery) -> CouchmapResult<Vec<ViewRow>> + Send + Sync>;

/// Store client keeping one bucket in memory.
///
/// Key-value operations behave like a real bucket, with a CAS that grows on
/// every mutation. There is no query engine: queries are answered by the
/// registered handlers, and every executed query is recorded. Expiry is
/// stored but documents are never evicted.
pub struct InMemoryStoreClient {
    bucket_name: String,
    documents: RwLock<HashMap<String, StoredDocument>>,
    design_documents: RwLock<HashMap<String, DesignDocument>>,
    cas_sequence: AtomicU64,
    query_handler: Option<QueryHandler>,
    view_handler: Option<ViewHandler>,
    executed_queries: Mutex<Vec<BoundQuery>>,
}

impl InMemoryStoreClient {
    pub fn new(bucket_name: &str) -> Self {
        InMemoryStoreClient {
            bucket_name: bucket_name.to_string(),
            documents: RwLock::new(HashMap::new()),
            design_documents: RwLock::new(HashMap::new()),
            cas_sequence: AtomicU64::new(0),
            query_handler: None,
            view_handler: None,
            executed_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_query_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&BoundQuery) -> CouchmapResult<QueryResult> + Send + Sync + 'static,
    {
        self.query_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_view_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ViewQuery) -> CouchmapResult<Vec<ViewRow>> + Send + Sync + 'static,
    {
        self.view_handler = Some(Arc::new(handler));
        self
    }

    /// Queries executed so far, in execution order.
    pub fn executed_queries(&self) -> Vec<BoundQuery> {
        self.executed_queries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn next_cas(&self) -> u64 {
        self.cas_sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl StoreClient for InMemoryStoreClient {
    fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    fn get(&self, id: &str) -> CouchmapResult<Option<StoredDocument>> {
        Ok(self.documents.read().get(id).cloned())
    }

    fn insert(&self, document: StoredDocument) -> CouchmapResult<u64> {
        let mut documents = self.documents.write();
        if documents.contains_key(document.id()) {
            log::error!("Document {} already exists", document.id());
            return Err(CouchmapError::new(
                &format!("Document with id '{}' already exists", document.id()),
                ErrorKind::DocumentExists,
            ));
        }

        let cas = self.next_cas();
        let id = document.id().to_string();
        documents.insert(id, document.with_cas(cas));
        Ok(cas)
    }

    fn upsert(&self, document: StoredDocument) -> CouchmapResult<u64> {
        let mut documents = self.documents.write();
        if document.cas() != 0 {
            match documents.get(document.id()) {
                Some(existing) if existing.cas() == document.cas() => {}
                Some(existing) => {
                    log::error!(
                        "CAS mismatch for {}: expected {}, found {}",
                        document.id(),
                        document.cas(),
                        existing.cas()
                    );
                    return Err(CouchmapError::new(
                        &format!("CAS mismatch for document '{}'", document.id()),
                        ErrorKind::CasMismatch,
                    ));
                }
                None => {
                    log::error!("Document {} not found for CAS update", document.id());
                    return Err(CouchmapError::new(
                        &format!("Document with id '{}' not found", document.id()),
                        ErrorKind::DocumentNotFound,
                    ));
                }
            }
        }

        let cas = self.next_cas();
        let id = document.id().to_string();
        documents.insert(id, document.with_cas(cas));
        Ok(cas)
    }

    fn remove(&self, id: &str) -> CouchmapResult<()> {
        match self.documents.write().remove(id) {
            Some(_) => Ok(()),
            None => {
                log::error!("Document {} not found for removal", id);
                Err(CouchmapError::new(
                    &format!("Document with id '{}' not found", id),
                    ErrorKind::DocumentNotFound,
                ))
            }
        }
    }

    fn query(&self, query: &BoundQuery) -> CouchmapResult<QueryResult> {
        self.executed_queries.lock().push(query.clone());
        log::debug!("Executing {}", query.statement());

        match &self.query_handler {
            Some(handler) => handler(query),
            None => {
                log::error!("No query handler registered for bucket {}", self.bucket_name);
                Err(CouchmapError::new(
                    "In-memory store has no query handler",
                    ErrorKind::QueryError,
                ))
            }
        }
    }

    fn query_view(&self, query: &ViewQuery) -> CouchmapResult<Vec<ViewRow>> {
        let exists = self
            .design_documents
            .read()
            .get(query.design_document())
            .is_some_and(|design| design.view(query.view_name()).is_some());
        if !exists {
            log::error!("View {}/{} not found", query.design_document(), query.view_name());
            return Err(CouchmapError::new(
                &format!(
                    "View '{}' not found in design document '{}'",
                    query.view_name(),
                    query.design_document()
                ),
                ErrorKind::QueryError,
            ));
        }

        match &self.view_handler {
            Some(handler) => handler(query),
            None => Ok(Vec::new()),
        }
    }

    fn get_design_document(&self, name: &str) -> CouchmapResult<Option<DesignDocument>> {
        Ok(self.design_documents.read().get(name).cloned())
    }

    fn upsert_design_document(&self, design_document: DesignDocument) -> CouchmapResult<()> {
        self.design_documents
            .write()
            .insert(design_document.name().to_string(), design_document);
        Ok(())
    }
}
