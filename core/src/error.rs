//! # Errors
//!
//! Failures raised while describing an endpoint.

use derive_more::{Display, From};

/// Every failure the inference core reports.
///
/// A bare `String` converts into `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Reading options or sources from disk failed.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Two response entries claimed the same status code for one operation.
    #[from(ignore)]
    #[display("Duplicate response status code {status} for operation '{operation}'")]
    DuplicateStatusCode {
        /// The conflicting HTTP status code.
        status: u16,
        /// Operation id, or `METHOD /route` when the endpoint is unnamed.
        operation: String,
    },

    /// The schema resolver could not produce a schema for a type.
    #[from(ignore)]
    #[display("Schema Error: {_0}")]
    Schema(String),

    /// Anything else, such as malformed options or unparseable source.
    #[display("General Error: {_0}")]
    General(String),
}

impl std::error::Error for AppError {}

/// Result of a fallible inference step.
pub type AppResult<T> = Result<T, AppError>;
