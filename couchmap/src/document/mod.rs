//! The document model: an ordered field map with out-of-band id, CAS and expiry.

mod document;

pub use document::*;
