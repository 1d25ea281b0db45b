use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::query::{BoundQuery, PageRequest};
use crate::repository::{QueryExecution, QueryMethod, QueryOutcome};

/// Which execution path a dispatch selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionKind {
    Paged,
    Sliced,
    Collection,
    Entity,
    Stream,
}

/// The execution path chosen for one query method invocation, carrying
/// everything the path needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionPath {
    Paged {
        count: BoundQuery,
        content: BoundQuery,
        page: PageRequest,
    },
    Sliced {
        content: BoundQuery,
        count: BoundQuery,
        page: PageRequest,
    },
    Collection(BoundQuery),
    Entity(BoundQuery),
    Stream(BoundQuery),
}

impl ExecutionPath {
    pub fn kind(&self) -> ExecutionKind {
        match self {
            ExecutionPath::Paged { .. } => ExecutionKind::Paged,
            ExecutionPath::Sliced { .. } => ExecutionKind::Sliced,
            ExecutionPath::Collection(_) => ExecutionKind::Collection,
            ExecutionPath::Entity(_) => ExecutionKind::Entity,
            ExecutionPath::Stream(_) => ExecutionKind::Stream,
        }
    }

    /// Runs exactly one method of `execution`, the one matching this path.
    pub fn execute<T, E>(&self, execution: &E) -> CouchmapResult<QueryOutcome<T>>
    where
        E: QueryExecution<T> + ?Sized,
    {
        Ok(match self {
            ExecutionPath::Paged {
                count,
                content,
                page,
            } => QueryOutcome::Page(execution.execute_paged(count, content, *page)?),
            ExecutionPath::Sliced {
                content,
                count,
                page,
            } => QueryOutcome::Slice(execution.execute_sliced(content, count, *page)?),
            ExecutionPath::Collection(query) => {
                QueryOutcome::Collection(execution.execute_collection(query)?)
            }
            ExecutionPath::Entity(query) => QueryOutcome::Entity(execution.execute_entity(query)?),
            ExecutionPath::Stream(query) => QueryOutcome::Stream(execution.execute_stream(query)?),
        })
    }
}

/// Selects the execution path of a query method invocation.
///
/// Modifying methods are rejected first. Otherwise the first matching rule
/// wins: paged, sliced, collection, single entity, stream. A method matching
/// none of them is a declaration error.
pub fn dispatch(
    content: BoundQuery,
    count: BoundQuery,
    method: &QueryMethod,
    page: Option<PageRequest>,
    is_paged: bool,
    is_sliced: bool,
    is_modifying: bool,
) -> CouchmapResult<ExecutionPath> {
    if is_modifying {
        log::error!("Query method {} is modifying", method.name());
        return Err(CouchmapError::new(
            &format!("Modifying query method '{}' is not supported", method.name()),
            ErrorKind::UnsupportedShape,
        ));
    }

    if is_paged {
        return Ok(ExecutionPath::Paged {
            count,
            content,
            page: require_page(method, page)?,
        });
    }

    if is_sliced {
        return Ok(ExecutionPath::Sliced {
            content,
            count,
            page: require_page(method, page)?,
        });
    }

    if method.is_collection_query() {
        Ok(ExecutionPath::Collection(content))
    } else if method.is_query_for_entity() {
        Ok(ExecutionPath::Entity(content))
    } else if method.is_stream_query() {
        Ok(ExecutionPath::Stream(content))
    } else {
        log::error!("No execution path for query method {}", method.name());
        Err(CouchmapError::new(
            &format!(
                "Unsupported return shape {:?} of query method '{}'",
                method.return_shape(),
                method.name()
            ),
            ErrorKind::UnsupportedShape,
        ))
    }
}

fn require_page(method: &QueryMethod, page: Option<PageRequest>) -> CouchmapResult<PageRequest> {
    page.ok_or_else(|| {
        log::error!("Query method {} needs a page request", method.name());
        CouchmapError::new(
            &format!("Query method '{}' requires a page request", method.name()),
            ErrorKind::InvalidOperation,
        )
    })
}
