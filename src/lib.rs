//! Dev build uploader
//!
//! CI helper that keeps a build server's dev builds in step with a branch:
//! - asks the server for the last commit it has a build for
//! - asks the build tool for the commits since then
//! - uploads the freshly built package with that commit log, if there is one
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod build_tool;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use error::{CliError, Result, UploaderError};
pub use pipeline::{Outcome, UploadPipeline};
