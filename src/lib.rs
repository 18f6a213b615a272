//! # diskprobe
//!
//! Bounded command execution and block device inventory.
//!
//! This crate provides the core used by disk administration tools: run a
//! shell command with a hard deadline that no descendant process can
//! outlive, and turn `lsblk --json` output into a device tree that can be
//! queried for root disks, mounts, used space and partitions.
//!
//! ## Features
//!
//! - **Process-group timeouts**: every command runs in its own group, which is
//!   killed as a whole when the deadline passes
//! - **Uniform results**: local and remote runners share [`ExecutionResult`]
//! - **Typed inventory**: lsblk JSON decoded into [`DeviceNode`] trees
//! - **Recursive queries**: root-disk detection, mount maps, capacity totals
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use diskprobe::{CommandExecutor, InventoryParser};
//! use diskprobe::inventory::{command_tokens, fetch_inventory, LSBLK_COMMAND};
//!
//! #[tokio::main]
//! async fn main() -> diskprobe::Result<()> {
//!     diskprobe::logging::try_init().ok();
//!
//!     let executor = CommandExecutor::new();
//!     let devices = fetch_inventory(
//!         &executor,
//!         &command_tokens(LSBLK_COMMAND),
//!         Duration::from_secs(10),
//!         &InventoryParser::default(),
//!     )
//!     .await?;
//!
//!     for dev in &devices {
//!         println!("{} root={} used={}", dev.name, dev.is_root_disk(), dev.used_capacity());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod inventory;
pub mod logging;
pub mod report;
pub mod topology;

// Re-export commonly used types
pub use error::{DiskProbeError, Result};
pub use execution::{CommandExecutor, CommandRunner, ExecutionResult, GroupTerminator};
pub use topology::{parse_inventory, DeviceNode, FormatError, IgnoredTypes, InventoryParser};
