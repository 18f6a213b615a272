//! Execution result types.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Exit code reported when the process could not be started or waited on.
pub const EXIT_START_FAILED: i32 = -1;

/// Exit code reported when the process group was killed after the deadline.
pub const EXIT_TIMED_OUT: i32 = -2;

/// Why a bounded run did not complete cleanly.
#[derive(Error, Debug)]
pub enum ExecFailure {
    /// The command line was empty; nothing was spawned.
    #[error("invalid parameters, command is empty")]
    InvalidParameters,

    /// The shell could not be launched.
    #[error("{0}")]
    Spawn(#[source] io::Error),

    /// Waiting for the child (or draining its pipes) failed.
    #[error("wait failed: {0}")]
    Wait(#[source] io::Error),

    /// The waiter task went away without reporting.
    #[error("waiter task terminated unexpectedly")]
    WaiterLost,

    /// The process exited with a nonzero status.
    #[error("exit status {0}")]
    ExitStatus(i32),

    /// The kill signal could not be delivered to the process group.
    #[error("failed to kill process group {group_id}: {source}")]
    Signal {
        group_id: u32,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The process never ran.
    Start,
    /// The deadline elapsed and the group was killed.
    Timeout,
    /// The process ran but exited nonzero or wrote to stderr.
    Runtime,
}

/// Result of one bounded command execution.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Exit status, or one of [`EXIT_START_FAILED`] / [`EXIT_TIMED_OUT`].
    pub exit_code: i32,
    /// Captured standard output. Always empty on timeout.
    pub stdout: Vec<u8>,
    /// Captured standard error. Always empty on timeout.
    pub stderr: Vec<u8>,
    /// Failure detail, if any.
    pub failure: Option<ExecFailure>,
    /// Wall-clock time spent in the run.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a result for a process that exited on its own.
    pub fn completed(exit_code: i32, stdout: Vec<u8>, stderr: Vec<u8>, duration: Duration) -> Self {
        let failure = (exit_code != 0).then_some(ExecFailure::ExitStatus(exit_code));
        Self {
            exit_code,
            stdout,
            stderr,
            failure,
            duration,
        }
    }

    /// Create a result for a process that could not be started.
    pub fn start_failed(failure: ExecFailure, duration: Duration) -> Self {
        Self {
            exit_code: EXIT_START_FAILED,
            stdout: Vec::new(),
            stderr: Vec::new(),
            failure: Some(failure),
            duration,
        }
    }

    /// Create a result for a process that started but could not be waited on.
    pub fn wait_failed(failure: ExecFailure, duration: Duration) -> Self {
        Self::start_failed(failure, duration)
    }

    /// Create a result indicating the deadline elapsed.
    ///
    /// `signal_error` carries the kill-delivery failure, if there was one.
    pub fn timeout(signal_error: Option<ExecFailure>, duration: Duration) -> Self {
        Self {
            exit_code: EXIT_TIMED_OUT,
            stdout: Vec::new(),
            stderr: Vec::new(),
            failure: signal_error,
            duration,
        }
    }

    /// Check if the run was cut short by the deadline.
    pub fn is_timeout(&self) -> bool {
        self.exit_code == EXIT_TIMED_OUT
    }

    /// Check if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if the run should be reported as an error.
    pub fn has_error(&self) -> bool {
        if self.exit_code == 0 {
            return false;
        }
        self.failure.is_some() || !self.stderr.is_empty()
    }

    /// Classify the failure, or `None` for a clean run.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.exit_code {
            0 if self.stderr.is_empty() => None,
            EXIT_TIMED_OUT => Some(FailureKind::Timeout),
            EXIT_START_FAILED => match self.failure {
                Some(ExecFailure::InvalidParameters | ExecFailure::Spawn(_)) => {
                    Some(FailureKind::Start)
                }
                _ => Some(FailureKind::Runtime),
            },
            _ => Some(FailureKind::Runtime),
        }
    }

    /// Render a human readable error message.
    pub fn error_message(&self) -> String {
        if self.is_timeout() {
            let msg = "command execution timed out";
            return match &self.failure {
                Some(err) => format!("{msg}, {err}"),
                None => msg.to_string(),
            };
        }

        if self.exit_code == EXIT_START_FAILED {
            if let Some(err) = &self.failure {
                return err.to_string();
            }
        }

        let stderr = String::from_utf8_lossy(&self.stderr);
        match &self.failure {
            Some(err) if !stderr.is_empty() => format!("{stderr}, {err}"),
            Some(err) => err.to_string(),
            None => stderr.into_owned(),
        }
    }

    /// Standard output decoded as UTF-8 (lossy).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_success() {
        let result = ExecutionResult::completed(0, b"ok\n".to_vec(), vec![], Duration::ZERO);
        assert!(result.success());
        assert!(!result.has_error());
        assert!(result.failure.is_none());
        assert_eq!(result.failure_kind(), None);
        assert_eq!(result.stdout_text(), "ok\n");
    }

    #[test]
    fn test_completed_nonzero_records_status() {
        let result = ExecutionResult::completed(3, vec![], vec![], Duration::ZERO);
        assert!(result.has_error());
        assert!(matches!(result.failure, Some(ExecFailure::ExitStatus(3))));
        assert_eq!(result.failure_kind(), Some(FailureKind::Runtime));
        assert_eq!(result.error_message(), "exit status 3");
    }

    #[test]
    fn test_stderr_with_failure_message() {
        let result =
            ExecutionResult::completed(2, vec![], b"no such file".to_vec(), Duration::ZERO);
        assert_eq!(result.error_message(), "no such file, exit status 2");
    }

    #[test]
    fn test_stderr_on_success_is_not_error() {
        let result = ExecutionResult::completed(0, vec![], b"warning".to_vec(), Duration::ZERO);
        assert!(!result.has_error());
        assert_eq!(result.failure_kind(), Some(FailureKind::Runtime));
        assert_eq!(result.error_message(), "warning");
    }

    #[test]
    fn test_timeout_without_signal_error() {
        let result = ExecutionResult::timeout(None, Duration::from_secs(1));
        assert!(result.is_timeout());
        assert!(result.stdout.is_empty());
        assert!(result.stderr.is_empty());
        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
        assert_eq!(result.error_message(), "command execution timed out");
    }

    #[test]
    fn test_timeout_with_signal_error() {
        let failure = ExecFailure::Signal {
            group_id: 42,
            source: io::Error::from_raw_os_error(1),
        };
        let result = ExecutionResult::timeout(Some(failure), Duration::from_secs(1));
        assert!(result.has_error());
        let msg = result.error_message();
        assert!(msg.starts_with("command execution timed out, "));
        assert!(msg.contains("process group 42"));
    }

    #[test]
    fn test_start_failure() {
        let result = ExecutionResult::start_failed(ExecFailure::InvalidParameters, Duration::ZERO);
        assert_eq!(result.exit_code, EXIT_START_FAILED);
        assert!(result.has_error());
        assert_eq!(result.failure_kind(), Some(FailureKind::Start));
        assert_eq!(result.error_message(), "invalid parameters, command is empty");
    }

    #[test]
    fn test_wait_failure_is_runtime() {
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe");
        let result = ExecutionResult::wait_failed(ExecFailure::Wait(err), Duration::ZERO);
        assert_eq!(result.exit_code, EXIT_START_FAILED);
        assert_eq!(result.failure_kind(), Some(FailureKind::Runtime));
        assert_eq!(result.error_message(), "wait failed: broken pipe");
    }

    #[test]
    fn test_spawn_failure_message_is_raw() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file or directory");
        let result = ExecutionResult::start_failed(ExecFailure::Spawn(err), Duration::ZERO);
        assert_eq!(result.error_message(), "No such file or directory");
    }
}
