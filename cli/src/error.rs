#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use opinfer_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Failure reported by the inference core.
    #[display("{}", _0)]
    Core(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Walking the source tree failed.
    #[display("Source walk failed: {}", _0)]
    Walk(walkdir::Error),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// `General(String)` has no error source, so this is written by hand.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_display_passes_through() {
        let err: CliError = AppError::General("bad".into()).into();
        assert_eq!(err.to_string(), "General Error: bad");

        let err = CliError::General("no handlers".into());
        assert_eq!(err.to_string(), "Operation failed: no handlers");
    }
}
