use crate::common::{Value, N1QL_ARGS, N1QL_SCAN_CONSISTENCY, N1QL_STATEMENT};
use crate::convert::value_to_json;
use crate::errors::CouchmapResult;
use crate::query::{QueryScanConsistency, Statement};
use serde_json::{json, Map};

/// Request parameters attached to every bound query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryParams {
    consistency: QueryScanConsistency,
}

impl QueryParams {
    /// Parameters with not-bounded scan consistency.
    pub fn build() -> Self {
        QueryParams {
            consistency: QueryScanConsistency::NotBounded,
        }
    }

    pub fn consistency(mut self, consistency: QueryScanConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn scan_consistency(&self) -> QueryScanConsistency {
        self.consistency
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams::build()
    }
}

/// A statement ready to be executed by a store client.
///
/// A query without arguments is [BoundQuery::Simple]; one with positional
/// arguments is [BoundQuery::Parameterized]. Store clients may treat the two
/// differently, e.g. prepare parameterized statements.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundQuery {
    Simple {
        statement: Statement,
        params: QueryParams,
    },
    Parameterized {
        statement: Statement,
        args: Vec<Value>,
        params: QueryParams,
    },
}

impl BoundQuery {
    pub fn statement(&self) -> &Statement {
        match self {
            BoundQuery::Simple { statement, .. } => statement,
            BoundQuery::Parameterized { statement, .. } => statement,
        }
    }

    /// Positional arguments; empty for simple queries.
    pub fn args(&self) -> &[Value] {
        match self {
            BoundQuery::Simple { .. } => &[],
            BoundQuery::Parameterized { args, .. } => args,
        }
    }

    pub fn params(&self) -> QueryParams {
        match self {
            BoundQuery::Simple { params, .. } => *params,
            BoundQuery::Parameterized { params, .. } => *params,
        }
    }

    pub fn is_parameterized(&self) -> bool {
        matches!(self, BoundQuery::Parameterized { .. })
    }

    /// Same arguments and parameters over another statement.
    pub fn with_statement(&self, statement: Statement) -> BoundQuery {
        match self {
            BoundQuery::Simple { params, .. } => BoundQuery::Simple {
                statement,
                params: *params,
            },
            BoundQuery::Parameterized { args, params, .. } => BoundQuery::Parameterized {
                statement,
                args: args.clone(),
                params: *params,
            },
        }
    }

    /// The JSON request body of this query.
    ///
    /// ```text
    /// {"statement": "...", "scan_consistency": "not_bounded", "args": [...]}
    /// ```
    ///
    /// `args` is only present for parameterized queries.
    pub fn to_n1ql(&self) -> CouchmapResult<serde_json::Value> {
        let mut body = Map::new();
        body.insert(N1QL_STATEMENT.to_string(), json!(self.statement().as_str()));
        body.insert(
            N1QL_SCAN_CONSISTENCY.to_string(),
            json!(self.params().scan_consistency().as_str()),
        );
        if let BoundQuery::Parameterized { args, .. } = self {
            let args = args
                .iter()
                .map(value_to_json)
                .collect::<CouchmapResult<Vec<_>>>()?;
            body.insert(N1QL_ARGS.to_string(), serde_json::Value::Array(args));
        }
        Ok(serde_json::Value::Object(body))
    }
}

/// Binds positional arguments and a scan consistency to `statement`.
pub fn build_query(
    statement: Statement,
    args: Vec<Value>,
    consistency: QueryScanConsistency,
) -> BoundQuery {
    let params = QueryParams::build().consistency(consistency);
    if args.is_empty() {
        BoundQuery::Simple { statement, params }
    } else {
        BoundQuery::Parameterized {
            statement,
            args,
            params,
        }
    }
}
