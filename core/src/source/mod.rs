#![deny(missing_docs)]

//! # Source Parsing
//!
//! Reads handler functions out of Rust source:
//! - `types`: type syntax to [`TypeDescriptor`](crate::signature::TypeDescriptor).
//! - `attributes`: routing, `oai` and response attributes to metadata.
//! - `handlers`: functions to endpoint descriptors.

pub mod attributes;
pub mod handlers;
pub mod types;

pub use attributes::OaiAttribute;
pub use handlers::parse_handlers;
pub use types::parse_type_str;
