//! Transport-agnostic command runner.

use std::future::Future;
use std::time::Duration;

use super::executor::CommandExecutor;
use super::result::ExecutionResult;

/// Anything that can run a command line under a deadline and hand back an
/// [`ExecutionResult`].
///
/// [`CommandExecutor`] runs locally. A remote session (SSH and the like)
/// implements the same contract so callers consume both uniformly.
pub trait CommandRunner: Send + Sync {
    /// Run `command_line` and wait at most `timeout` for it.
    fn run(
        &self,
        timeout: Duration,
        command_line: &[String],
    ) -> impl Future<Output = ExecutionResult> + Send;
}

impl CommandRunner for CommandExecutor {
    fn run(
        &self,
        timeout: Duration,
        command_line: &[String],
    ) -> impl Future<Output = ExecutionResult> + Send {
        CommandExecutor::run(self, timeout, command_line)
    }
}
