//! Common types shared across the crate: values, conversion and constants.

mod constants;
mod convertible;
mod type_utils;
mod value;

pub use constants::*;
pub use convertible::*;
pub use type_utils::*;
pub use value::*;
