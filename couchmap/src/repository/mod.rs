//! Repository support: query method dispatch, execution and template
//! operations.

mod dispatcher;
mod execution;
mod query_method;
mod repository;
mod string_query;
mod template;

pub use dispatcher::*;
pub use execution::*;
pub use query_method::*;
pub use repository::*;
pub use string_query::*;
pub use template::*;
