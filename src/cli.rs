//! Command-line interface for diskprobe.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::split_list;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Run a command line under the deadline.
    Run(Vec<String>),
    /// List block devices.
    Disks,
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Selected subcommand.
    pub mode: Option<Mode>,
    /// Deadline in seconds (overrides config).
    pub timeout: Option<u64>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Shell to run commands with.
    pub shell: Option<String>,
    /// Read the inventory document from this file (`-` for stdin).
    pub input: Option<PathBuf>,
    /// Ignored top-level device types.
    pub ignore: Option<Vec<String>>,
    /// Print JSON instead of a table.
    pub json: bool,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
///
/// Everything after `run` is taken verbatim as the command line, so the
/// command's own flags are never interpreted here.
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                result.timeout = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("timeout", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('i') | Long("input") => {
                result.input = Some(parser.value()?.parse()?);
            }
            Long("ignore") => {
                let value: String = parser.value()?.parse()?;
                result.ignore = Some(split_list(&value));
            }
            Long("json") => {
                result.json = true;
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) if result.mode.is_none() => {
                let name = val.string()?;
                result.mode = Some(match name.as_str() {
                    "run" => {
                        let mut tokens: Vec<String> = parser
                            .raw_args()?
                            .map(|a| a.to_string_lossy().into_owned())
                            .collect();
                        if tokens.first().map(String::as_str) == Some("--") {
                            tokens.remove(0);
                        }
                        Mode::Run(tokens)
                    }
                    "disks" => Mode::Disks,
                    other => return Err(ArgsError::UnknownCommand(other.to_string())),
                });
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"diskprobe {version}
Bounded command execution and block device inventory

USAGE:
    diskprobe [OPTIONS] run <COMMAND>...
    diskprobe [OPTIONS] disks

COMMANDS:
    run                     Run a shell command under a hard deadline
    disks                   List block devices (via lsblk or --input)

OPTIONS:
    -t, --timeout <SECS>    Deadline in seconds [default: 30 for run, 10 for disks]
    -c, --config <FILE>     Path to configuration file (JSON)
    -s, --shell <PATH>      Shell used to run commands [default: /bin/bash]
    -i, --input <FILE>      Read lsblk JSON from FILE instead of running lsblk ('-' = stdin)
        --ignore <TYPES>    Comma separated device types to hide [default: loop,rom,usb]
        --json              Print the device tree as JSON
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    DISKPROBE_TIMEOUT       Run deadline in seconds (overrides config)
    DISKPROBE_SHELL         Shell path (overrides config)
    DISKPROBE_IGNORED_TYPES Ignored device types (overrides config)
    DISKPROBE_LOG_LEVEL     Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXIT STATUS:
    run exits with the command's status, 124 on timeout, 127 if it could not start.

EXAMPLES:
    # Kill anything still running after five seconds
    diskprobe -t 5 run 'sleep 60 | cat'

    # Inventory of the local machine
    diskprobe disks

    # Inventory captured on another host
    ssh admin@host lsblk --paths --json --bytes --fs | diskprobe disks -i -
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("diskprobe {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unknown subcommand.
    UnknownCommand(String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnknownCommand(name) => write!(f, "unknown command: '{}'", name),
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
