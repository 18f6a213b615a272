//! diskprobe binary entry point.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;
use tracing::{debug, error, info};

use diskprobe::cli::{self, Args, Mode};
use diskprobe::config::Config;
use diskprobe::execution::{CommandExecutor, ExecutionResult, EXIT_START_FAILED, EXIT_TIMED_OUT};
use diskprobe::inventory::{fetch_inventory, script_command};
use diskprobe::topology::{DeviceNode, InventoryParser};
use diskprobe::{logging, report};

/// Shell conventions for "timed out" and "could not run".
const STATUS_TIMEOUT: u8 = 124;
const STATUS_NOT_STARTED: u8 = 127;
const STATUS_USAGE: u8 = 2;

#[derive(Serialize)]
struct InventoryView<'a> {
    blockdevices: &'a [DeviceNode],
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Try 'diskprobe --help' for more information.");
            return ExitCode::from(STATUS_USAGE);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }
    let Some(mode) = args.mode.clone() else {
        cli::print_help();
        return ExitCode::from(STATUS_USAGE);
    };

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(STATUS_USAGE);
        }
    };

    let _ = logging::init_with_level(config.log_filter());
    debug!("diskprobe v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match mode {
        Mode::Run(tokens) => run_command(&config, &tokens).await,
        Mode::Disks => list_disks(&config, &args).await,
    };

    outcome.unwrap_or_else(|e| {
        error!(error = %e, "diskprobe failed");
        eprintln!("error: {e}");
        ExitCode::FAILURE
    })
}

async fn run_command(config: &Config, tokens: &[String]) -> diskprobe::Result<ExitCode> {
    let executor = CommandExecutor::new().with_shell(config.shell());
    let result = executor.run(config.run_timeout(), tokens).await;

    io::stdout().write_all(&result.stdout)?;
    if result.is_timeout() || result.has_error() {
        let message = report::sanitize(result.error_message().as_bytes());
        eprintln!("{}", message.trim_end());
    } else if !result.stderr.is_empty() {
        io::stderr().write_all(&result.stderr)?;
    }

    Ok(ExitCode::from(exit_status(&result)))
}

fn exit_status(result: &ExecutionResult) -> u8 {
    match result.exit_code {
        EXIT_TIMED_OUT => STATUS_TIMEOUT,
        EXIT_START_FAILED => STATUS_NOT_STARTED,
        code => u8::try_from(code).unwrap_or(1),
    }
}

async fn list_disks(config: &Config, args: &Args) -> diskprobe::Result<ExitCode> {
    let parser = InventoryParser::new(config.ignored_types());

    let devices = match &args.input {
        Some(path) => parser.parse(&read_input(path)?)?,
        None => {
            let executor = CommandExecutor::new().with_shell(config.shell());
            fetch_inventory(
                &executor,
                &script_command(&config.inventory.command),
                config.inventory_timeout(),
                &parser,
            )
            .await?
        }
    };
    info!(devices = devices.len(), "inventory loaded");

    let mut out = io::stdout().lock();
    if args.json {
        let view = InventoryView {
            blockdevices: &devices,
        };
        serde_json::to_writer_pretty(&mut out, &view)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", report::render_table(&devices))?;
        writeln!(out)?;
        write!(out, "{}", report::render_summaries(&devices))?;
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path)
    }
}
