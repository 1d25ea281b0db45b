use crate::common::Value;
use crate::errors::CouchmapResult;
use crate::mapping::MappedEntity;
use crate::query::{build_query, Consistency, PageRequest, Statement, StatementBuilder};
use crate::repository::{dispatch, ExecutionPath, N1qlExecution, QueryMethod, QueryOutcome};

/// A repository query method backed by a N1QL statement template.
///
/// The template is prepared once against the bucket; each execution binds
/// positional arguments, derives the content statement for the requested
/// page and dispatches on the method's return shape.
pub struct StringN1qlQuery<T> {
    statement: Statement,
    count_statement: Statement,
    method: QueryMethod,
    consistency: Consistency,
    execution: N1qlExecution<T>,
}

impl<T: MappedEntity> StringN1qlQuery<T> {
    pub fn new(
        template: &str,
        method: QueryMethod,
        consistency: Consistency,
        execution: N1qlExecution<T>,
        bucket_name: &str,
    ) -> Self {
        let statement = StatementBuilder::prepare(template, bucket_name);
        let count_statement = StatementBuilder::prepare_count(template, bucket_name);
        log::debug!("Prepared query method {}: {}", method.name(), statement);
        StringN1qlQuery {
            statement,
            count_statement,
            method,
            consistency,
            execution,
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn count_statement(&self) -> &Statement {
        &self.count_statement
    }

    pub fn method(&self) -> &QueryMethod {
        &self.method
    }

    /// Overrides the consistency level of this query.
    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Builds the execution path for `args` without running it.
    pub fn prepare_execution(
        &self,
        args: Vec<Value>,
        page: Option<PageRequest>,
    ) -> CouchmapResult<ExecutionPath> {
        let content_statement = match page {
            Some(page) if self.method.is_page_query() => self.statement.with_page(&page),
            Some(page) if self.method.is_slice_query() => self
                .statement
                .with_limit(page.page_size() + 1, page.offset()),
            _ => self.statement.clone(),
        };

        let scan_consistency = self.consistency.query_consistency();
        let content = build_query(content_statement, args.clone(), scan_consistency);
        let count = build_query(self.count_statement.clone(), args, scan_consistency);

        dispatch(
            content,
            count,
            &self.method,
            page,
            self.method.is_page_query(),
            self.method.is_slice_query(),
            self.method.is_modifying(),
        )
    }

    /// Executes the query method with positional `args`.
    pub fn execute(&self, args: Vec<Value>, page: Option<PageRequest>) -> CouchmapResult<QueryOutcome<T>> {
        let path = self.prepare_execution(args, page)?;
        log::debug!("Executing {} via {:?} path", self.method.name(), path.kind());
        path.execute(&self.execution)
    }
}
