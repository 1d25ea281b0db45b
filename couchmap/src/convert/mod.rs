//! Entity to document conversion and the JSON text form of documents.

mod converter;
mod translation;

pub use converter::*;
pub use translation::*;
