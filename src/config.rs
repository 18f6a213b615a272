//! Configuration management for diskprobe.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::{default_shell, Shell, DEFAULT_TIMEOUT};
use crate::inventory::{DEFAULT_INVENTORY_TIMEOUT, LSBLK_COMMAND};
use crate::topology::{IgnoredTypes, DEFAULT_IGNORED_TYPES};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command execution settings.
    pub execution: ExecutionSection,
    /// Device inventory settings.
    pub inventory: InventorySection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Command execution section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Deadline for `run`, in seconds.
    pub timeout_secs: u64,
    /// Shell the command line is handed to.
    pub shell: String,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            shell: default_shell().program.to_string_lossy().into_owned(),
        }
    }
}

/// Device inventory section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySection {
    /// Command producing the inventory document.
    pub command: String,
    /// Deadline for the inventory command, in seconds.
    pub timeout_secs: u64,
    /// Top-level device types left out of results.
    pub ignored_types: Vec<String>,
}

impl Default for InventorySection {
    fn default() -> Self {
        Self {
            command: LSBLK_COMMAND.to_string(),
            timeout_secs: DEFAULT_INVENTORY_TIMEOUT.as_secs(),
            ignored_types: DEFAULT_IGNORED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secs) = lookup("DISKPROBE_TIMEOUT") {
            self.execution.timeout_secs = parse_secs("DISKPROBE_TIMEOUT", &secs)?;
        }

        if let Some(shell) = lookup("DISKPROBE_SHELL") {
            if !shell.is_empty() {
                self.execution.shell = shell;
            }
        }

        if let Some(types) = lookup("DISKPROBE_IGNORED_TYPES") {
            self.inventory.ignored_types = split_list(&types);
        }

        if let Some(level) = lookup("DISKPROBE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(timeout) = args.timeout {
            self.execution.timeout_secs = timeout;
            self.inventory.timeout_secs = timeout;
        }

        if let Some(ref shell) = args.shell {
            self.execution.shell = shell.clone();
        }

        if let Some(ref types) = args.ignore {
            self.inventory.ignored_types = types.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env()?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.shell.trim().is_empty() {
            return Err(ConfigError::Invalid("execution.shell", self.execution.shell.clone()));
        }
        if self.inventory.command.trim().is_empty() {
            return Err(ConfigError::Invalid("inventory.command", self.inventory.command.clone()));
        }
        Ok(())
    }

    /// Deadline for `run`.
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.execution.timeout_secs)
    }

    /// Deadline for the inventory command.
    pub fn inventory_timeout(&self) -> Duration {
        Duration::from_secs(self.inventory.timeout_secs)
    }

    /// Shell to use.
    pub fn shell(&self) -> Shell {
        Shell::from_program(&self.execution.shell)
    }

    /// Ignored device types as a parser set.
    pub fn ignored_types(&self) -> IgnoredTypes {
        IgnoredTypes::new(self.inventory.ignored_types.iter().cloned())
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Split a comma separated list, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_secs(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(name, value.to_string()))
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A setting holds an unusable value.
    Invalid(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::Invalid(name, value) => write!(f, "invalid value for {}: '{}'", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.execution.timeout_secs, 30);
        assert_eq!(config.inventory.timeout_secs, 10);
        assert_eq!(config.inventory.command, LSBLK_COMMAND);
        assert_eq!(config.inventory.ignored_types, vec!["loop", "rom", "usb"]);
        assert_eq!(config.log_filter(), "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "execution": { "timeout_secs": 5, "shell": "/bin/sh" },
            "inventory": { "ignored_types": ["loop"] }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.run_timeout(), Duration::from_secs(5));
        assert_eq!(config.execution.shell, "/bin/sh");
        assert!(config.ignored_types().contains("loop"));
        assert!(!config.ignored_types().contains("rom"));
        // Untouched keys keep their defaults.
        assert_eq!(config.inventory.command, LSBLK_COMMAND);
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_file(Path::new("/nonexistent/diskprobe.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[
                ("DISKPROBE_TIMEOUT", "7"),
                ("DISKPROBE_SHELL", "/bin/zsh"),
                ("DISKPROBE_IGNORED_TYPES", "loop, rom ,,md"),
                ("RUST_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.execution.timeout_secs, 7);
        assert_eq!(config.execution.shell, "/bin/zsh");
        assert_eq!(config.inventory.ignored_types, vec!["loop", "rom", "md"]);
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_log_level_env_beats_rust_log() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[("DISKPROBE_LOG_LEVEL", "warn"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_invalid_env_timeout() {
        let mut config = Config::default();
        let err = config
            .apply_env_from(env(&[("DISKPROBE_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("DISKPROBE_TIMEOUT"));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            timeout: Some(3),
            shell: Some("/bin/sh".to_string()),
            ignore: Some(vec!["usb".to_string()]),
            log_level: Some("trace".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.run_timeout(), Duration::from_secs(3));
        assert_eq!(config.inventory_timeout(), Duration::from_secs(3));
        assert_eq!(config.shell().program, Path::new("/bin/sh"));
        assert_eq!(config.inventory.ignored_types, vec!["usb"]);
        assert_eq!(config.log_filter(), "trace");
    }

    #[test]
    fn test_validate_rejects_blank_shell() {
        let mut config = Config::default();
        config.execution.shell = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid("execution.shell", _))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"timeout_secs\""));
        assert!(json.contains("\"ignored_types\""));
    }
}
