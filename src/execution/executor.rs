//! Command execution engine.

use std::fmt;
use std::io;
use std::process::{ExitStatus, Output, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::command::{Command, Shell};
use super::group::{GroupTerminator, SignalTerminator};
use super::result::{ExecFailure, ExecutionResult, EXIT_START_FAILED};

/// Default execution timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a killed child gets to be reaped before `run` returns anyway.
const REAP_GRACE: Duration = Duration::from_secs(2);

/// Runs shell commands under a hard deadline.
///
/// Each run spawns the shell in a fresh process group. A waiter task owns the
/// child and reports its exit through a oneshot channel; the caller races
/// that channel against the deadline. If the deadline wins, the whole group
/// is killed and the result carries no output.
#[derive(Clone)]
pub struct CommandExecutor {
    shell: Shell,
    default_timeout: Duration,
    terminator: Arc<dyn GroupTerminator>,
}

impl CommandExecutor {
    /// Create an executor using the platform shell.
    pub fn new() -> Self {
        Self {
            shell: Shell::default(),
            default_timeout: DEFAULT_TIMEOUT,
            terminator: Arc::new(SignalTerminator),
        }
    }

    /// Use a different shell.
    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    /// Timeout applied to commands that do not carry their own.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Replace the process-group termination primitive.
    pub fn with_terminator(mut self, terminator: impl GroupTerminator + 'static) -> Self {
        self.terminator = Arc::new(terminator);
        self
    }

    /// The shell commands are handed to.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// The fallback timeout.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `command_line` with the given deadline.
    pub async fn run<S: AsRef<str>>(&self, timeout: Duration, command_line: &[S]) -> ExecutionResult {
        let command = Command::new(command_line.iter().map(|s| s.as_ref().to_owned())).timeout(timeout);
        self.execute(&command).await
    }

    /// Execute a prepared command.
    pub async fn execute(&self, command: &Command) -> ExecutionResult {
        let start = Instant::now();

        if command.is_empty() {
            return ExecutionResult::start_failed(ExecFailure::InvalidParameters, start.elapsed());
        }

        let timeout = command.timeout.unwrap_or(self.default_timeout);
        let script = command.command_line();

        let mut process = tokio::process::Command::new(&self.shell.program);
        process
            .arg(&self.shell.script_flag)
            .arg(&script)
            .envs(&command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.working_dir {
            process.current_dir(dir);
        }
        #[cfg(unix)]
        process.process_group(0);

        let child = match process.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %script, error = %e, "failed to start command");
                return ExecutionResult::start_failed(ExecFailure::Spawn(e), start.elapsed());
            }
        };

        // The child leads its own group, so its pid doubles as the group id.
        let group_id = child.id();
        debug!(
            pid = ?group_id,
            command = %script,
            timeout_ms = timeout.as_millis() as u64,
            "spawned command"
        );

        let (done_tx, mut done_rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = done_tx.send(child.wait_with_output().await);
        });

        let outcome = tokio::select! {
            outcome = &mut done_rx => Some(outcome),
            _ = tokio::time::sleep(timeout) => None,
        };

        match outcome {
            Some(Ok(waited)) => Self::completed(waited, start),
            Some(Err(_)) => ExecutionResult::wait_failed(ExecFailure::WaiterLost, start.elapsed()),
            None => {
                let signal_error = group_id.and_then(|id| self.kill_group(id));
                // Output gathered while the child is reaped is discarded.
                let _ = tokio::time::timeout(REAP_GRACE, done_rx).await;
                ExecutionResult::timeout(signal_error, start.elapsed())
            }
        }
    }

    fn kill_group(&self, group_id: u32) -> Option<ExecFailure> {
        warn!(pgid = group_id, "deadline elapsed, killing process group");
        match self.terminator.terminate_group(group_id) {
            Ok(()) => None,
            Err(source) => {
                warn!(pgid = group_id, error = %source, "failed to kill process group");
                Some(ExecFailure::Signal { group_id, source })
            }
        }
    }

    fn completed(waited: io::Result<Output>, start: Instant) -> ExecutionResult {
        match waited {
            Ok(output) => {
                let code = exit_code(output.status);
                debug!(exit_code = code, elapsed_ms = start.elapsed().as_millis() as u64, "command exited");
                ExecutionResult::completed(code, output.stdout, output.stderr, start.elapsed())
            }
            Err(e) => {
                warn!(error = %e, "failed to wait for command");
                ExecutionResult::wait_failed(ExecFailure::Wait(e), start.elapsed())
            }
        }
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("shell", &self.shell)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

/// Map an exit status to a single integer.
///
/// Children killed by a signal report `128 + signal`, as shells do.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    EXIT_START_FAILED
}

/// Execute a command line with the default executor and the given timeout.
pub async fn execute_with_timeout<S: AsRef<str>>(timeout: Duration, command_line: &[S]) -> ExecutionResult {
    CommandExecutor::new().run(timeout, command_line).await
}
