//! Block device topology.
//!
//! Parses `lsblk --json` output into [`DeviceNode`] trees and answers
//! structural questions about them: which disk holds `/`, what is mounted
//! where, how much space is used, which partitions exist.
//!
//! # Example
//!
//! ```
//! use diskprobe::topology::parse_inventory;
//!
//! let doc = br#"{"blockdevices": [
//!     {"name": "/dev/sda", "type": "disk", "children": [
//!         {"name": "/dev/sda1", "type": "part", "mountpoint": "/", "fsused": "2048"}
//!     ]},
//!     {"name": "/dev/loop0", "type": "loop"}
//! ]}"#;
//!
//! let devices = parse_inventory(doc).unwrap();
//! assert_eq!(devices.len(), 1);
//! assert!(devices[0].is_root_disk());
//! assert_eq!(devices[0].used_capacity(), 2048);
//! ```

mod device;
mod parser;
mod query;

pub use device::{DeviceNode, MediaKind};
pub use parser::{
    parse_inventory, FormatError, IgnoredTypes, InventoryParser, DEFAULT_IGNORED_TYPES,
    INVENTORY_KEY,
};
pub use query::{MountInfo, PART_TYPE};
