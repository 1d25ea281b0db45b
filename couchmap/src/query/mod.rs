//! Statements, bound queries, consistency levels and paging.

mod bound_query;
mod consistency;
mod page;
mod select;
mod statement;
mod view_query;

pub use bound_query::*;
pub use consistency::*;
pub use page::*;
pub use select::*;
pub use statement::*;
pub use view_query::*;
