use crate::common::Value;
use crate::convert::value_to_json;
use crate::errors::CouchmapResult;
use crate::query::{Consistency, ViewScanConsistency};
use itertools::Itertools;

/// Query against a map/reduce view of a design document.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewQuery {
    design_document: String,
    view_name: String,
    key: Option<Value>,
    keys: Vec<Value>,
    limit: Option<usize>,
    skip: Option<usize>,
    descending: bool,
    reduce: Option<bool>,
    consistency: ViewScanConsistency,
}

impl ViewQuery {
    /// Query with the scan consistency of the default [Consistency] level.
    pub fn new(design_document: &str, view_name: &str) -> Self {
        ViewQuery {
            design_document: design_document.to_string(),
            view_name: view_name.to_string(),
            key: None,
            keys: Vec::new(),
            limit: None,
            skip: None,
            descending: false,
            reduce: None,
            consistency: Consistency::DEFAULT.view_consistency(),
        }
    }

    pub fn key(mut self, key: impl Into<Value>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn keys(mut self, keys: Vec<Value>) -> Self {
        self.keys = keys;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn reduce(mut self, reduce: bool) -> Self {
        self.reduce = Some(reduce);
        self
    }

    pub fn consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency.view_consistency();
        self
    }

    pub fn design_document(&self) -> &str {
        &self.design_document
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn scan_consistency(&self) -> ViewScanConsistency {
        self.consistency
    }

    pub fn key_value(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn skip_value(&self) -> Option<usize> {
        self.skip
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// Request parameters in a fixed order, keys JSON-encoded and
    /// percent-escaped.
    pub fn to_query_string(&self) -> CouchmapResult<String> {
        let mut params = vec![format!("stale={}", self.consistency.stale_param())];
        if self.descending {
            params.push("descending=true".to_string());
        }
        if let Some(key) = &self.key {
            params.push(format!("key={}", encode_json(key)?));
        }
        if !self.keys.is_empty() {
            params.push(format!("keys={}", encode_json(&Value::Array(self.keys.clone()))?));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        if let Some(skip) = self.skip {
            params.push(format!("skip={}", skip));
        }
        if let Some(reduce) = self.reduce {
            params.push(format!("reduce={}", reduce));
        }
        Ok(params.iter().join("&"))
    }
}

fn encode_json(value: &Value) -> CouchmapResult<String> {
    let text = value_to_json(value)?.to_string();
    Ok(urlencoding::encode(&text).into_owned())
}
