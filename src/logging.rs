//! Logging initialization and configuration.
//!
//! Logs go to stderr; stdout carries command output and inventory reports.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "diskprobe=info";

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `diskprobe=info`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    subscriber(filter).init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    subscriber(filter).try_init()
}

/// Initialize logging from a configured level.
///
/// `level` may be a bare level (`debug`) which applies to this crate only,
/// or a full filter directive (`diskprobe=trace,tokio=warn`).
pub fn init_with_level(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    subscriber(filter_for(level)).try_init()
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(directive_for(level)).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn directive_for(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        DEFAULT_DIRECTIVE.to_string()
    } else if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("diskprobe={level}")
    }
}

fn subscriber(filter: EnvFilter) -> impl SubscriberInitExt {
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr),
    )
}
