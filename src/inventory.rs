//! Inventory retrieval: run lsblk through a [`CommandRunner`] and parse the
//! result.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::DiskProbeError;
use crate::execution::CommandRunner;
use crate::topology::{DeviceNode, InventoryParser};
use crate::Result;

/// The lsblk invocation whose output schema [`DeviceNode`] matches.
pub const LSBLK_COMMAND: &str = "lsblk --paths --json --bytes --fs --output NAME,TYPE,SIZE,ROTA,SERIAL,WWN,VENDOR,MODEL,REV,MOUNTPOINT,PARTUUID,UUID,PTUUID,FSAVAIL,FSSIZE,FSUSED,FSTYPE";

/// Default deadline for the inventory command.
pub const DEFAULT_INVENTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Split a command string into tokens on whitespace.
///
/// Quoting is not understood; use [`script_command`] for configured commands.
pub fn command_tokens(command: &str) -> Vec<String> {
    command.split_whitespace().map(String::from).collect()
}

/// Pass a command string to a runner as a single script token.
///
/// Runners hand the joined tokens to a shell, so quoting and spacing inside
/// `command` reach the shell exactly as written.
pub fn script_command(command: &str) -> Vec<String> {
    vec![command.to_owned()]
}

/// Run `command_line` through `runner` and parse its stdout.
///
/// A timed-out run maps to [`DiskProbeError::Timeout`], a nonzero exit to
/// [`DiskProbeError::ExecutionFailed`]. Stderr noise on a successful run is
/// ignored.
pub async fn fetch_inventory<R: CommandRunner>(
    runner: &R,
    command_line: &[String],
    timeout: Duration,
    parser: &InventoryParser,
) -> Result<Vec<DeviceNode>> {
    let result = runner.run(timeout, command_line).await;

    if result.is_timeout() {
        warn!(timeout_ms = timeout.as_millis() as u64, "inventory command timed out");
        return Err(DiskProbeError::Timeout(timeout));
    }
    if !result.success() {
        let message = result.error_message();
        warn!(exit_code = result.exit_code, error = %message, "inventory command failed");
        return Err(DiskProbeError::ExecutionFailed(message));
    }

    debug!(bytes = result.stdout.len(), "inventory command finished");
    Ok(parser.parse(&result.stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ExecFailure, ExecutionResult};
    use crate::topology::IgnoredTypes;

    enum Scripted {
        Output(&'static [u8]),
        Exit(i32, &'static [u8]),
        Timeout,
    }

    impl CommandRunner for Scripted {
        async fn run(&self, _timeout: Duration, command_line: &[String]) -> ExecutionResult {
            assert_eq!(command_line.first().map(String::as_str), Some("lsblk"));
            match self {
                Self::Output(out) => ExecutionResult::completed(0, out.to_vec(), Vec::new(), Duration::ZERO),
                Self::Exit(code, err) => {
                    ExecutionResult::completed(*code, Vec::new(), err.to_vec(), Duration::ZERO)
                }
                Self::Timeout => ExecutionResult::timeout(None, Duration::ZERO),
            }
        }
    }

    fn fetch(runner: &Scripted) -> Result<Vec<DeviceNode>> {
        tokio_test::block_on(fetch_inventory(
            runner,
            &command_tokens(LSBLK_COMMAND),
            DEFAULT_INVENTORY_TIMEOUT,
            &InventoryParser::default(),
        ))
    }

    #[test]
    fn test_command_tokens() {
        let tokens = command_tokens(LSBLK_COMMAND);
        assert_eq!(tokens[0], "lsblk");
        assert!(tokens.contains(&"--json".to_string()));
        assert!(tokens.last().unwrap().ends_with("FSTYPE"));
    }

    #[test]
    fn test_script_command_is_one_token() {
        let command = "printf '%s' 'a    b'";
        assert_eq!(script_command(command), vec![command.to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_command_keeps_quoted_spacing() {
        let executor = crate::execution::CommandExecutor::new();
        let command = "printf '%s' 'a    b'";

        let result = executor
            .run(Duration::from_secs(5), &script_command(command))
            .await;
        assert_eq!(result.stdout_text(), "a    b");

        let split = executor
            .run(Duration::from_secs(5), &command_tokens(command))
            .await;
        assert_eq!(split.stdout_text(), "a b");
    }

    #[test]
    fn test_fetch_parses_output() {
        let runner = Scripted::Output(
            br#"{"blockdevices": [{"name": "/dev/sda", "type": "disk"}, {"name": "/dev/sr0", "type": "rom"}]}"#,
        );
        let devices = fetch(&runner).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "/dev/sda");
    }

    #[test]
    fn test_fetch_honours_parser_ignored_set() {
        let runner = Scripted::Output(br#"{"blockdevices": [{"name": "/dev/sr0", "type": "rom"}]}"#);
        let devices = tokio_test::block_on(fetch_inventory(
            &runner,
            &command_tokens(LSBLK_COMMAND),
            DEFAULT_INVENTORY_TIMEOUT,
            &InventoryParser::new(IgnoredTypes::none()),
        ))
        .unwrap();
        assert_eq!(devices.len(), 1);
    }

    #[test]
    fn test_fetch_timeout() {
        let err = fetch(&Scripted::Timeout).unwrap_err();
        assert!(matches!(err, DiskProbeError::Timeout(t) if t == DEFAULT_INVENTORY_TIMEOUT));
    }

    #[test]
    fn test_fetch_command_failure_surfaces_stderr() {
        let err = fetch(&Scripted::Exit(127, b"lsblk: command not found")).unwrap_err();
        match err {
            DiskProbeError::ExecutionFailed(msg) => {
                assert!(msg.contains("lsblk: command not found"));
                assert!(msg.contains("exit status 127"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fetch_malformed_output() {
        let err = fetch(&Scripted::Output(b"not json")).unwrap_err();
        assert!(matches!(err, DiskProbeError::Format(_)));
    }

    #[test]
    fn test_start_failure_is_execution_failure() {
        struct Broken;
        impl CommandRunner for Broken {
            async fn run(&self, _timeout: Duration, _command_line: &[String]) -> ExecutionResult {
                ExecutionResult::start_failed(ExecFailure::InvalidParameters, Duration::ZERO)
            }
        }
        let err = tokio_test::block_on(fetch_inventory(
            &Broken,
            &[],
            DEFAULT_INVENTORY_TIMEOUT,
            &InventoryParser::default(),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("invalid parameters"));
    }
}
