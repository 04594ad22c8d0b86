#![deny(missing_docs)]

//! # Opinfer Core
//!
//! Infers OpenAPI operations for HTTP endpoints from their handler signature,
//! declarative metadata and route template.

/// Shared error types.
pub mod error;

/// Describe options (YAML).
pub mod config;

/// Handler signature descriptors.
pub mod signature;

/// Endpoint metadata annotations.
pub mod metadata;

/// Route template parsing.
pub mod route;

/// Memoized type capability checks.
pub mod capabilities;

/// Type mapping logic (Rust -> OpenAPI schema).
pub mod type_mapping;

/// Operation inference.
pub mod describe;

/// Handler extraction from Rust source.
pub mod source;

pub use capabilities::{CapabilityCache, NoServices, RegisteredServices, ServiceRegistry};
pub use config::DescribeOptions;
pub use describe::{
    EndpointDescriptor, Operation, OperationGenerator, Parameter, ParameterLocation, RequestBody,
    Response, Tag,
};
pub use error::{AppError, AppResult};
pub use metadata::{EndpointAnnotation, EndpointMetadata, HttpMethod};
pub use route::RoutePattern;
pub use signature::{HandlerSignature, ParameterDescriptor, TypeDescriptor};
pub use source::parse_handlers;
pub use type_mapping::{RustTypeSchemaResolver, SchemaResolver};
