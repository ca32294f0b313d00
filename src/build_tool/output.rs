//! Typed result of a finished build tool task.

use super::BuildToolError;

/// Outcome of one build tool invocation, with its output already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    /// Task that was run
    pub task: String,
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
    /// Whether the process exited successfully
    pub success: bool,
    /// Decoded stdout
    pub stdout: String,
    /// Decoded stderr (lossy)
    pub stderr: String,
}

impl TaskOutput {
    /// Decodes raw process output.
    ///
    /// Stdout carries the value we act on, so it must be valid UTF-8.
    /// Stderr is diagnostics only and is decoded lossily.
    pub fn from_process(
        task: &str,
        status: std::process::ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    ) -> Result<Self, BuildToolError> {
        let stdout = String::from_utf8(stdout).map_err(|_| BuildToolError::NonUtf8Output {
            task: task.to_string(),
        })?;

        Ok(Self {
            task: task.to_string(),
            code: status.code(),
            success: status.success(),
            stdout,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Successful output with the given stdout.
    pub fn succeeded(task: &str, stdout: impl Into<String>) -> Self {
        Self {
            task: task.to_string(),
            code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(task: &str, code: i32, stderr: impl Into<String>) -> Self {
        Self {
            task: task.to_string(),
            code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Trimmed stdout of a successful task.
    pub fn into_text(self) -> Result<String, BuildToolError> {
        if !self.success {
            return Err(BuildToolError::Failed {
                task: self.task,
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            });
        }
        Ok(self.stdout.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_text_trims_successful_output() {
        let output = TaskOutput::succeeded("getVersionCode", "\n  1234 \n");
        assert_eq!(output.into_text().unwrap(), "1234");
    }

    #[test]
    fn into_text_reports_failure_with_stderr() {
        let output = TaskOutput::failed("getLastCommits", 1, "FAILURE: Build failed\n");
        match output.into_text() {
            Err(BuildToolError::Failed { task, code, stderr }) => {
                assert_eq!(task, "getLastCommits");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "FAILURE: Build failed");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn from_process_rejects_non_utf8_stdout() {
        use std::os::unix::process::ExitStatusExt;

        let status = std::process::ExitStatus::from_raw(0);
        let err = TaskOutput::from_process("getVersionCode", status, vec![0xff, 0xfe], Vec::new())
            .unwrap_err();
        assert!(matches!(err, BuildToolError::NonUtf8Output { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn from_process_keeps_exit_code() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait status: exit code lives in the high byte
        let status = std::process::ExitStatus::from_raw(3 << 8);
        let output =
            TaskOutput::from_process("checkBranchExists", status, b"false\n".to_vec(), Vec::new())
                .unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success);
    }
}
