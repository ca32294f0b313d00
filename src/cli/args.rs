//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation and
//! conversion into the [`RuntimeConfig`] the pipeline runs from.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::build_tool::{DEFAULT_BUILD_TOOL, DEFAULT_TASK_TIMEOUT};
use crate::error::{CliError, Result};
use crate::server::{DEFAULT_HTTP_TIMEOUT, SecretKey};

/// Package path produced by the dev release build, relative to the project directory.
pub const DEFAULT_APK_PATH: &str = "app/build/outputs/apk/dev/release/app-dev-release.apk";

/// Upload a freshly built dev package and its commit log to the build server
#[derive(Parser, Debug)]
#[command(
    name = "upload_dev_build",
    version,
    about = "Upload a freshly built dev package and its commit log to the build server",
    long_about = "Asks the build server for the last commit it has a build for, collects the \
commits made on BRANCH_NAME since then, and uploads the package together with that commit log.

Nothing is uploaded when there are no new commits.

Usage:
  upload_dev_build <SECRET_KEY> https://builds.example.com dev
  upload_dev_build <SECRET_KEY> https://builds.example.com dev --apk-path out/app.apk

Exit code 0 = uploaded, or nothing to upload. Any failure exits non-zero."
)]
pub struct Args {
    /// Shared secret sent in the SECRET_KEY header
    #[arg(value_name = "SECRET_KEY")]
    pub secret_key: SecretKey,

    /// Build server base URL
    #[arg(value_name = "BASE_URL")]
    pub base_url: Url,

    /// Branch whose commits are uploaded
    #[arg(value_name = "BRANCH_NAME")]
    pub branch_name: String,

    /// Package to upload, relative to the project directory unless absolute
    #[arg(long, value_name = "PATH", env = "UPLOADER_APK_PATH", default_value = DEFAULT_APK_PATH)]
    pub apk_path: PathBuf,

    /// Project directory the build tool runs in
    #[arg(long, value_name = "DIR", env = "UPLOADER_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Build tool executable, relative to the project directory or looked up on PATH
    #[arg(long, value_name = "PROGRAM", env = "UPLOADER_BUILD_TOOL", default_value = DEFAULT_BUILD_TOOL)]
    pub build_tool: PathBuf,

    /// Deadline for each request to the build server, in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub http_timeout_secs: u64,

    /// Deadline for each build tool task, in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TASK_TIMEOUT.as_secs())]
    pub task_timeout_secs: u64,

    /// Do not ask the build tool whether the branch exists first
    #[arg(long)]
    pub skip_branch_check: bool,
}

impl Args {
    /// Parse command line arguments, returning clap's error instead of exiting
    pub fn try_parse_args() -> std::result::Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.secret_key.is_empty() {
            return Err("Secret key cannot be empty".to_string());
        }

        if self.branch_name.trim().is_empty() {
            return Err("Branch name cannot be empty".to_string());
        }

        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(format!(
                "Invalid base URL: {}. Only http and https are supported",
                self.base_url
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err("--http-timeout-secs must be greater than 0".to_string());
        }

        if self.task_timeout_secs == 0 {
            return Err("--task-timeout-secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Shared secret
    pub secret_key: SecretKey,
    /// Build server base URL
    pub base_url: Url,
    /// Branch whose commits are uploaded
    pub branch_name: String,
    /// Package to upload
    pub apk_path: PathBuf,
    /// Build tool working directory
    pub project_dir: PathBuf,
    /// Build tool executable
    pub build_tool: PathBuf,
    /// Per-request deadline
    pub http_timeout: Duration,
    /// Per-task deadline
    pub task_timeout: Duration,
    /// Whether to check that the branch exists before anything else
    pub check_branch: bool,

    /// Output manager for terminal output
    output: super::OutputManager,
}

impl TryFrom<&Args> for RuntimeConfig {
    type Error = crate::error::UploaderError;

    fn try_from(args: &Args) -> Result<Self> {
        args.validate()
            .map_err(|reason| CliError::InvalidArguments { reason })?;

        let apk_path = if args.apk_path.is_absolute() {
            args.apk_path.clone()
        } else {
            args.project_dir.join(&args.apk_path)
        };

        Ok(Self {
            secret_key: args.secret_key.clone(),
            base_url: args.base_url.clone(),
            branch_name: args.branch_name.trim().to_string(),
            apk_path,
            project_dir: args.project_dir.clone(),
            build_tool: args.build_tool.clone(),
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            task_timeout: Duration::from_secs(args.task_timeout_secs),
            check_branch: !args.skip_branch_check,
            output: super::OutputManager::new(false),
        })
    }
}

impl RuntimeConfig {
    /// Silence progress output (errors are still printed)
    pub fn quiet(mut self) -> Self {
        self.output = super::OutputManager::new(true);
        self
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
