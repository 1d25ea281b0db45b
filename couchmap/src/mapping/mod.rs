//! Entity metadata: which properties an entity type persists and how.

mod context;
mod entity;
mod property;
mod value_provider;

pub use context::*;
pub use entity::*;
pub use property::*;
pub use value_provider::*;
