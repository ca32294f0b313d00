//! Subprocess-backed build tool.

use super::{BuildTool, BuildToolError, TaskInvocation, TaskOutput};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default wrapper script, relative to the project directory.
#[cfg(not(windows))]
pub const DEFAULT_BUILD_TOOL: &str = "./gradlew";

/// Default wrapper script, relative to the project directory.
#[cfg(windows)]
pub const DEFAULT_BUILD_TOOL: &str = "gradlew.bat";

/// Default deadline for a single task. Gradle may need to compile build
/// scripts on a cold daemon, so this is generous.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs tasks through a Gradle wrapper (or any executable with the same
/// command line shape) inside the project directory.
#[derive(Debug, Clone)]
pub struct GradleRunner {
    program: PathBuf,
    project_dir: PathBuf,
    timeout: Duration,
}

impl GradleRunner {
    /// Locates the build tool and creates a runner.
    ///
    /// # Arguments
    ///
    /// * `program` - Executable. Paths with more than one component (such as
    ///   `./gradlew`) are resolved against `project_dir`; bare names are looked
    ///   up on `PATH`.
    /// * `project_dir` - Working directory for every task. Made absolute here,
    ///   since the child resolves a relative program path after changing into it.
    /// * `timeout` - Deadline for a single task
    pub fn locate(
        program: &Path,
        project_dir: &Path,
        timeout: Duration,
    ) -> Result<Self, BuildToolError> {
        let project_dir = std::path::absolute(project_dir).map_err(|e| BuildToolError::NotFound {
            path: project_dir.to_path_buf(),
            reason: format!("cannot resolve project directory: {}", e),
        })?;
        let program = resolve_program(program, &project_dir)?;
        log::debug!("Using build tool at: {}", program.display());

        Ok(Self {
            program,
            project_dir,
            timeout,
        })
    }

    /// Resolved executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl BuildTool for GradleRunner {
    async fn run(&self, invocation: &TaskInvocation) -> Result<TaskOutput, BuildToolError> {
        let args = invocation.to_args();
        log::debug!("Running {} {}", self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BuildToolError::Spawn {
                program: self.program.clone(),
                task: invocation.task.clone(),
                source,
            })?;

        // Dropping the pending future on timeout kills the child (kill_on_drop)
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(BuildToolError::Spawn {
                    program: self.program.clone(),
                    task: invocation.task.clone(),
                    source,
                });
            }
            Err(_elapsed) => {
                return Err(BuildToolError::TimedOut {
                    task: invocation.task.clone(),
                    timeout: self.timeout,
                });
            }
        };

        let output =
            TaskOutput::from_process(&invocation.task, output.status, output.stdout, output.stderr)?;

        if output.success {
            log::debug!("Task {} finished", invocation.task);
        } else {
            log::warn!(
                "Task {} exited with code {:?}",
                invocation.task,
                output.code
            );
        }

        Ok(output)
    }
}

fn resolve_program(program: &Path, project_dir: &Path) -> Result<PathBuf, BuildToolError> {
    if program.components().count() == 1 && !program.is_absolute() {
        return which::which(program).map_err(|e| BuildToolError::NotFound {
            path: program.to_path_buf(),
            reason: e.to_string(),
        });
    }

    let resolved = if program.is_absolute() {
        program.to_path_buf()
    } else {
        project_dir.join(program)
    };

    if !resolved.is_file() {
        return Err(BuildToolError::NotFound {
            path: resolved,
            reason: "no such file".to_string(),
        });
    }

    Ok(resolved)
}
