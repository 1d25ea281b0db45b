//! Index declarations of entity types and their creation.

mod design_document;
mod entity_index;
mod index_manager;

pub use design_document::*;
pub use entity_index::*;
pub use index_manager::*;
