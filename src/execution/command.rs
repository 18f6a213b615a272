//! Command building and representation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// A command to be executed through the shell.
///
/// The tokens are joined with single spaces and handed to the shell as one
/// script, so pipes, redirections and globs work as typed.
#[derive(Debug, Clone, Default)]
pub struct Command {
    /// Command-line tokens.
    pub args: Vec<String>,
    /// Working directory override (if any).
    pub working_dir: Option<PathBuf>,
    /// Environment variables to set.
    pub env: HashMap<String, String>,
    /// Maximum execution time.
    pub timeout: Option<Duration>,
}

impl Command {
    /// Create a new command from its tokens.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// Set the execution timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Check whether there is anything to run.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The script handed to the shell.
    pub fn command_line(&self) -> String {
        join_command_line(&self.args)
    }
}

/// Join tokens with single spaces.
pub fn join_command_line<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shell program and the flag that makes it read a script argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    /// Shell executable.
    pub program: PathBuf,
    /// Flag preceding the script (`-c`, `/C`).
    pub script_flag: String,
}

impl Shell {
    /// Create a shell description.
    pub fn new(program: impl Into<PathBuf>, script_flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            script_flag: script_flag.into(),
        }
    }

    /// Use `program` with the platform's usual script flag.
    pub fn from_program(program: impl Into<PathBuf>) -> Self {
        Self::new(program, default_shell().script_flag)
    }
}

impl Default for Shell {
    fn default() -> Self {
        default_shell()
    }
}

/// The platform's default shell.
pub fn default_shell() -> Shell {
    #[cfg(windows)]
    {
        Shell::new("cmd.exe", "/C")
    }

    #[cfg(not(windows))]
    {
        Shell::new("/bin/bash", "-c")
    }
}
