//! Error types for diskprobe.

use std::time::Duration;

use thiserror::Error;

use crate::cli::ArgsError;
use crate::config::ConfigError;
use crate::topology::FormatError;

/// Main error type for diskprobe operations.
#[derive(Error, Debug)]
pub enum DiskProbeError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inventory document could not be decoded.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Command-line arguments were rejected.
    #[error("invalid arguments: {0}")]
    Args(#[from] ArgsError),

    /// Inventory command did not finish in time.
    #[error("inventory command timed out after {0:?}")]
    Timeout(Duration),

    /// Inventory command failed.
    #[error("inventory command failed: {0}")]
    ExecutionFailed(String),

    /// JSON encoding error.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type for diskprobe operations.
pub type Result<T> = std::result::Result<T, DiskProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DiskProbeError = io_err.into();
        assert!(matches!(err, DiskProbeError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_format_error_is_transparent() {
        let err: DiskProbeError = FormatError::MissingKey("blockdevices").into();
        assert_eq!(
            err.to_string(),
            "unexpected inventory format, missing \"blockdevices\" key"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = DiskProbeError::Timeout(Duration::from_secs(10));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_execution_failed_display() {
        let err = DiskProbeError::ExecutionFailed("lsblk: not found".into());
        assert!(err.to_string().contains("lsblk: not found"));
    }
}
