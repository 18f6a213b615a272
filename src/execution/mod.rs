//! Bounded command execution.
//!
//! This module runs shell commands under a hard wall-clock deadline:
//! - Each command gets its own process group
//! - The deadline races a waiter task, no polling
//! - On timeout the whole group is killed and no output is kept
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use diskprobe::execution::CommandExecutor;
//!
//! # async fn demo() {
//! let executor = CommandExecutor::new();
//! let result = executor.run(Duration::from_secs(5), &["lsblk", "--json"]).await;
//! if result.has_error() {
//!     eprintln!("{}", result.error_message());
//! }
//! # }
//! ```

mod command;
mod executor;
mod group;
mod result;
mod runner;

pub use command::{default_shell, join_command_line, Command, Shell};
pub use executor::{execute_with_timeout, CommandExecutor, DEFAULT_TIMEOUT};
pub use group::{GroupTerminator, SignalTerminator};
pub use result::{ExecFailure, ExecutionResult, FailureKind, EXIT_START_FAILED, EXIT_TIMED_OUT};
pub use runner::CommandRunner;
