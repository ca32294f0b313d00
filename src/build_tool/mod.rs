//! Build tool collaborator.
//!
//! The build tool (Gradle, via the project's wrapper script) is treated as a
//! black box: we hand it a task name plus `-P` properties and read whatever
//! it prints to stdout. This module provides:
//!
//! - [`BuildTool`] - the seam the pipeline talks to
//! - [`GradleRunner`] - the real subprocess-backed implementation
//! - [`BuildTasks`] - the three queries the pipeline needs, expressed as
//!   task invocations
//! - [`TaskOutput`] - typed, decoded result of one invocation

mod gradle;
mod output;

pub use gradle::{DEFAULT_BUILD_TOOL, DEFAULT_TASK_TIMEOUT, GradleRunner};
pub use output::TaskOutput;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Task that prints `true` or `false` depending on whether `branch_name` exists.
pub const TASK_CHECK_BRANCH_EXISTS: &str = "checkBranchExists";

/// Task that prints the package version code.
pub const TASK_VERSION_CODE: &str = "getVersionCode";

/// Task that prints commits on `branch_name` made after commit `from`.
pub const TASK_COMMITS_SINCE_HASH: &str = "getLastCommitsFromCommitByHash";

/// Task that prints only the latest commits on `branch_name`.
pub const TASK_LATEST_COMMITS: &str = "getLastCommits";

/// Property carrying the branch name.
pub const PROP_BRANCH_NAME: &str = "branch_name";

/// Property carrying the starting commit hash.
pub const PROP_FROM: &str = "from";

/// Build tool errors
#[derive(Error, Debug)]
pub enum BuildToolError {
    /// Executable could not be located
    #[error("build tool not found: {path} ({reason})")]
    NotFound {
        /// Path or name that was looked up
        path: PathBuf,
        /// Why lookup failed
        reason: String,
    },

    /// Process could not be started
    #[error("failed to start {program} for task {task}: {source}")]
    Spawn {
        /// Executable
        program: PathBuf,
        /// Task being run
        task: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Process exited unsuccessfully
    #[error("task {task} failed (exit code: {code:?}): {stderr}")]
    Failed {
        /// Task being run
        task: String,
        /// Exit code, if any
        code: Option<i32>,
        /// Trimmed stderr
        stderr: String,
    },

    /// Process did not finish within the deadline
    #[error("task {task} timed out after {} seconds", .timeout.as_secs())]
    TimedOut {
        /// Task being run
        task: String,
        /// Deadline that was exceeded
        timeout: Duration,
    },

    /// Stdout was not valid UTF-8
    #[error("task {task} printed non-UTF-8 output")]
    NonUtf8Output {
        /// Task being run
        task: String,
    },

    /// Task succeeded but printed something we cannot interpret
    #[error("task {task} printed unexpected output: {output:?}")]
    UnexpectedOutput {
        /// Task being run
        task: String,
        /// Trimmed stdout
        output: String,
    },
}

/// One build tool invocation: a task name plus `-P` properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInvocation {
    /// Task name
    pub task: String,
    /// Project properties, passed as `-Pkey=value`
    pub properties: Vec<(String, String)>,
}

impl TaskInvocation {
    /// Creates an invocation with no properties.
    pub fn new(task: &str) -> Self {
        Self {
            task: task.to_string(),
            properties: Vec::new(),
        }
    }

    /// Adds a `-Pkey=value` property.
    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    /// Value of a property, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Command line arguments for this invocation.
    ///
    /// `-q` and `--console=plain` keep Gradle's own progress chatter out of
    /// stdout, leaving only what the task prints.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-q".to_string(), "--console=plain".to_string()];
        args.extend(
            self.properties
                .iter()
                .map(|(key, value)| format!("-P{}={}", key, value)),
        );
        args.push(self.task.clone());
        args
    }
}

/// Something that can run build tool tasks.
pub trait BuildTool {
    /// Runs one task to completion and returns its decoded output.
    ///
    /// A task that runs and exits non-zero is still `Ok`; callers decide via
    /// [`TaskOutput::into_text`]. `Err` means the task could not be run at all.
    fn run(
        &self,
        invocation: &TaskInvocation,
    ) -> impl Future<Output = Result<TaskOutput, BuildToolError>> + Send;
}

/// The queries the upload pipeline asks of the build tool.
pub struct BuildTasks<B> {
    tool: B,
}

impl<B: BuildTool> BuildTasks<B> {
    /// Wraps a build tool.
    pub fn new(tool: B) -> Self {
        Self { tool }
    }

    /// The wrapped build tool.
    pub fn tool(&self) -> &B {
        &self.tool
    }

    /// Whether `branch` exists in the project repository.
    pub async fn branch_exists(&self, branch: &str) -> Result<bool, BuildToolError> {
        let invocation =
            TaskInvocation::new(TASK_CHECK_BRANCH_EXISTS).property(PROP_BRANCH_NAME, branch);
        let text = self.tool.run(&invocation).await?.into_text()?;

        match text.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(BuildToolError::UnexpectedOutput {
                task: invocation.task,
                output: text,
            }),
        }
    }

    /// Version identifier of the package being uploaded.
    pub async fn version_code(&self) -> Result<String, BuildToolError> {
        let invocation = TaskInvocation::new(TASK_VERSION_CODE);
        let version = self.tool.run(&invocation).await?.into_text()?;

        if version.is_empty() {
            return Err(BuildToolError::UnexpectedOutput {
                task: invocation.task,
                output: version,
            });
        }
        Ok(version)
    }

    /// Commit log for `branch` since `from`.
    ///
    /// With an empty `from` (the server has no prior build) only the latest
    /// commits are requested. An empty result means nothing changed.
    pub async fn commit_log(&self, branch: &str, from: &str) -> Result<String, BuildToolError> {
        self.tool
            .run(&commit_log_invocation(branch, from))
            .await?
            .into_text()
    }
}

/// Invocation used to resolve the commit log.
pub fn commit_log_invocation(branch: &str, from: &str) -> TaskInvocation {
    if from.is_empty() {
        TaskInvocation::new(TASK_LATEST_COMMITS).property(PROP_BRANCH_NAME, branch)
    } else {
        TaskInvocation::new(TASK_COMMITS_SINCE_HASH)
            .property(PROP_BRANCH_NAME, branch)
            .property(PROP_FROM, from)
    }
}
