//! Error types for uploader operations.
//!
//! Every failure is terminal for the run: errors propagate with `?` up to
//! [`crate::cli::run`], which prints them and maps them to the failing exit code.

use thiserror::Error;

use crate::build_tool::BuildToolError;
use crate::server::ServerError;

/// Result type alias for uploader operations
pub type Result<T> = std::result::Result<T, UploaderError>;

/// Main error type for all uploader operations
#[derive(Error, Debug)]
pub enum UploaderError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport errors talking to the build server
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The build server answered, but not with what we expected
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Build tool invocation errors
    #[error("Build tool error: {0}")]
    BuildTool(#[from] BuildToolError),

    /// Endpoint URL could not be derived from the base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_category() {
        let usage: UploaderError = CliError::InvalidArguments {
            reason: "expected 3 arguments".to_string(),
        }
        .into();
        assert_eq!(
            usage.to_string(),
            "CLI error: Invalid arguments: expected 3 arguments"
        );

        let io: UploaderError = std::io::Error::other("disk gone").into();
        assert_eq!(io.to_string(), "IO error: disk gone");
    }
}
