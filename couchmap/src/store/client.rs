use crate::errors::CouchmapResult;
use crate::index::DesignDocument;
use crate::query::{BoundQuery, ViewQuery};

/// A document as held by the store: id, encoded body, CAS and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    id: String,
    content: String,
    cas: u64,
    expiry: u32,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        StoredDocument {
            id: id.into(),
            content: content.into(),
            cas: 0,
            expiry: 0,
        }
    }

    /// CAS the stored version must match; `0` skips the check.
    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    pub fn with_expiry(mut self, expiry: u32) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cas(&self) -> u64 {
        self.cas
    }

    pub fn expiry(&self) -> u32 {
        self.expiry
    }
}

/// Rows and status of an executed N1QL query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    rows: Vec<serde_json::Value>,
    errors: Vec<String>,
    final_success: bool,
}

impl QueryResult {
    pub fn success(rows: Vec<serde_json::Value>) -> Self {
        QueryResult {
            rows,
            errors: Vec::new(),
            final_success: true,
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        QueryResult {
            rows: Vec::new(),
            errors,
            final_success: false,
        }
    }

    pub fn rows(&self) -> &[serde_json::Value] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<serde_json::Value> {
        self.rows
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_success(&self) -> bool {
        self.final_success
    }
}

/// One emitted row of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    id: Option<String>,
    key: serde_json::Value,
    value: serde_json::Value,
}

impl ViewRow {
    pub fn new(id: Option<String>, key: serde_json::Value, value: serde_json::Value) -> Self {
        ViewRow { id, key, value }
    }

    /// Id of the emitting document; absent for reduced rows.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn key(&self) -> &serde_json::Value {
        &self.key
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

/// Access to a single bucket of a document store.
///
/// Network concerns such as timeouts and retries belong to implementations.
pub trait StoreClient: Send + Sync {
    fn bucket_name(&self) -> &str;

    fn get(&self, id: &str) -> CouchmapResult<Option<StoredDocument>>;

    /// Stores a new document and returns its CAS. Fails with
    /// `DocumentExists` when the id is taken.
    fn insert(&self, document: StoredDocument) -> CouchmapResult<u64>;

    /// Stores a document and returns its new CAS. A non-zero CAS on
    /// `document` must match the stored one, otherwise `CasMismatch`.
    fn upsert(&self, document: StoredDocument) -> CouchmapResult<u64>;

    /// Removes a document. Fails with `DocumentNotFound` for unknown ids.
    fn remove(&self, id: &str) -> CouchmapResult<()>;

    fn query(&self, query: &BoundQuery) -> CouchmapResult<QueryResult>;

    fn query_view(&self, query: &ViewQuery) -> CouchmapResult<Vec<ViewRow>>;

    fn get_design_document(&self, name: &str) -> CouchmapResult<Option<DesignDocument>>;

    fn upsert_design_document(&self, design_document: DesignDocument) -> CouchmapResult<()>;
}
