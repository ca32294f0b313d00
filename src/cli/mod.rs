//! Command line interface for the dev build uploader.
//!
//! Parses arguments, wires the real build tool into the upload pipeline and
//! maps the result to a process exit code.

mod args;
mod output;

pub use args::{Args, DEFAULT_APK_PATH, RuntimeConfig};
pub use output::OutputManager;

use crate::build_tool::GradleRunner;
use crate::error::{CliError, Result};
use crate::pipeline::{Outcome, UploadPipeline};
use clap::error::ErrorKind;

/// Exit code for a successful upload or a legitimate no-op
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for any failure
pub const EXIT_FAILURE: i32 = -1;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = match Args::try_parse_args() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(EXIT_SUCCESS);
        }
        Err(e) => {
            return Err(CliError::InvalidArguments {
                reason: e.render().to_string().trim().to_string(),
            }
            .into());
        }
    };

    let config = RuntimeConfig::try_from(&args)?;
    run_with_config(&config).await
}

/// Runs the pipeline for already validated configuration
pub async fn run_with_config(config: &RuntimeConfig) -> Result<i32> {
    let tool = GradleRunner::locate(&config.build_tool, &config.project_dir, config.task_timeout)?;

    let outcome = UploadPipeline::new(config, tool).run().await?;
    match outcome {
        Outcome::BranchMissing { .. } => config.warn(&outcome.to_string())?,
        _ => config.success(&outcome.to_string())?,
    }

    Ok(EXIT_SUCCESS)
}
