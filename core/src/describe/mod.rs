#![deny(missing_docs)]

//! # Operation Description
//!
//! - **models**: The produced operation value and its `utoipa` conversion.
//! - **params**: Parameter classification (path/query/header/body/ignored).
//! - **body**: Request body resolution.
//! - **responses**: Response map resolution.
//! - **tags**: Tag resolution.
//! - **builder**: Applicability checks and orchestration.

pub mod body;
pub mod builder;
pub mod models;
pub mod params;
pub mod responses;
pub mod tags;

pub use builder::{EndpointDescriptor, OperationGenerator};
pub use models::{Operation, Parameter, ParameterLocation, RequestBody, Response, Tag};
pub use params::{Classification, ParameterClassifier};
