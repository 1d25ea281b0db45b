//! The store client seam and an in-memory implementation of it.

mod client;
mod memory;

pub use client::*;
pub use memory::*;
