#![allow(
    dead_code,
    unused_imports,
    clippy::module_inception,
)]
//! # couchmap - object-document mapping for Couchbase-style stores
//!
//! couchmap maps plain Rust structs to JSON documents stored under a string
//! key with an out-of-band CAS version and expiry, and runs N1QL repository
//! queries that hand back typed results.
//!
//! ## Key Features
//!
//! - **Descriptor metadata**: entity types describe their properties once, through
//!   `#[derive(CouchbaseEntity)]` or by hand, and the description is cached per type
//! - **Round trip**: `MappingConverter::write` and `MappingConverter::read` are inverse
//!   for every entity with an id property
//! - **Statement templates**: `$SELECT_ENTITY$`, `$BUCKET$` and `$ENTITY$` placeholders
//!   are expanded against the bucket
//! - **Return shapes**: query methods dispatch to entity, collection, stream, page or
//!   slice execution
//! - **Indexes**: declared primary, secondary and view indexes are created on demand
//! - **Pluggable store**: everything talks to a `StoreClient`, with an in-memory one included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use couchmap::couchmap::Couchmap;
//! use couchmap::query::PageRequest;
//! use couchmap::repository::{QueryMethod, ReturnShape};
//! use couchmap::store::InMemoryStoreClient;
//! use couchmap_derive::CouchbaseEntity;
//!
//! #[derive(CouchbaseEntity, Default)]
//! #[entity(name = "Airline", n1ql_primary)]
//! struct Airline {
//!     #[entity(id)]
//!     id: String,
//!     name: String,
//!     country: String,
//! }
//!
//! let couchmap = Couchmap::builder()
//!     .type_key("_class")
//!     .open(Arc::new(InMemoryStoreClient::new("travel")))?;
//! let airlines = couchmap.repository::<Airline>()?;
//! airlines.save(&Airline { id: "airline::1".into(), name: "Air".into(), country: "FR".into() })?;
//!
//! let by_country = airlines.query(
//!     "$SELECT_ENTITY$ WHERE country = $1",
//!     QueryMethod::new("find_by_country", ReturnShape::Page),
//!     vec!["FR".into()],
//!     Some(PageRequest::of_size(20)?),
//! )?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Values, conversion trait, constants and shared utilities
//! - [`convert`] - Mapping converter and JSON translation service
//! - [`couchmap`] - Facade tying a store client to mapping and repositories
//! - [`couchmap_builder`] - Builder for opening an instance
//! - [`couchmap_config`] - Instance configuration
//! - [`document`] - Ordered document model
//! - [`errors`] - Error types and result definitions
//! - [`index`] - Index declarations and the index manager
//! - [`mapping`] - Entity metadata and the mapping context
//! - [`query`] - Statements, bound queries, consistency levels and paging
//! - [`repository`] - Query dispatch, execution, templates and repositories
//! - [`store`] - Store client abstraction and in-memory implementation

pub mod common;
pub mod convert;
pub mod couchmap;
pub mod couchmap_builder;
pub mod couchmap_config;
pub mod document;
pub mod errors;
pub mod index;
pub mod mapping;
pub mod query;
pub mod repository;
pub mod store;

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
