#![recursion_limit = "128"]
//! # couchmap derive macros
//!
//! ## Macros
//!
//! ### `Convertible`
//!
//! Derives `couchmap::common::Convertible` for structs with named fields and
//! for enums, so they can be nested inside entities.
//!
//! - **Container attribute**: `#[converter(ignored = "a, b")]` skips fields; they
//!   come back as their default value
//!
//! ```rust,ignore
//! use couchmap_derive::Convertible;
//!
//! #[derive(Convertible, Default)]
//! pub struct Geo {
//!     pub lat: f64,
//!     pub lon: f64,
//! }
//!
//! #[derive(Convertible)]
//! pub enum Rating {
//!     Unrated,
//!     Stars(u8),
//! }
//! ```
//!
//! ### `CouchbaseEntity`
//!
//! Derives `couchmap::mapping::MappedEntity`, describing the persistent
//! properties of a struct. The struct must implement `Default`.
//!
//! - **Container attributes**: `name = "..."`, `expiry = N`, `n1ql_primary`,
//!   `n1ql_secondary = "index"`, `view(design = "...", name = "...")`
//! - **Field attributes**: `id`, `version`, `field = "stored_name"`,
//!   `constructor`, `transient`
//!
//! ```rust,ignore
//! use couchmap_derive::CouchbaseEntity;
//!
//! #[derive(CouchbaseEntity, Default)]
//! #[entity(name = "Hotel", expiry = 3600, n1ql_secondary = "idx_hotel")]
//! pub struct Hotel {
//!     #[entity(id)]
//!     pub id: String,
//!     #[entity(version)]
//!     pub cas: u64,
//!     #[entity(field = "hotel_name")]
//!     pub name: String,
//!     #[entity(transient)]
//!     pub cached_rank: u32,
//! }
//! ```

extern crate proc_macro;
mod convertible;
mod couchbase_entity;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::couchbase_entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `Convertible` for a struct with named fields or an enum.
///
/// Structs become documents keyed by field name. Enums become a document
/// with a `variant` name and a `value` payload.
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convert(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_convertible_for_struct(&ast, data),
        Data::Enum(ref data) => generate_convertible_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Convertible for unions",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => syn::Error::new_spanned(
            &ast,
            format!("Failed to derive Convertible for '{}': {}", ast.ident, e),
        )
        .to_compile_error()
        .into(),
    }
}

/// Derives `MappedEntity` for a struct with named fields.
///
/// Every field that is not `transient` becomes a persistent property whose
/// type implements `Convertible` and `Default`. A null stored value resets
/// the field to its default. Fields marked `constructor` are resolved before
/// the others and passed to the struct literal that creates the instance.
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union or a tuple struct
/// - An attribute is unknown or malformed
/// - A `transient` field is also an id, a version or a constructor argument
#[proc_macro_derive(CouchbaseEntity, attributes(entity))]
pub fn derive_couchbase_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!(
                    "Failed to derive CouchbaseEntity for struct '{}': {}",
                    ast.ident, e
                ),
            )
            .to_compile_error()
            .into(),
        },
        Data::Enum(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive CouchbaseEntity for enums. Only structs are supported.",
        )
        .to_compile_error()
        .into(),
        Data::Union(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive CouchbaseEntity for unions. Only structs are supported.",
        )
        .to_compile_error()
        .into(),
    }
}
