//! Structural queries over a device tree.
//!
//! Every query walks the node's descendants depth-first, in document order,
//! and never looks at the node itself.

use std::collections::HashMap;

use super::device::DeviceNode;

/// Type name lsblk uses for partitions.
pub const PART_TYPE: &str = "part";

/// Mount relationships found under a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountInfo {
    /// Device name to mount point.
    pub by_device: HashMap<String, String>,
    /// Mount point to device name.
    pub by_mount_point: HashMap<String, String>,
}

impl DeviceNode {
    /// Visit every descendant in pre-order.
    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DeviceNode)) {
        for child in &self.children {
            visit(child);
            child.walk(visit);
        }
    }

    /// Check whether any descendant is mounted at `/`.
    pub fn is_root_disk(&self) -> bool {
        let mut has_root = false;
        self.walk(&mut |dev| has_root |= dev.mount_point == "/");
        has_root
    }

    /// Check whether anything below this device is mounted.
    ///
    /// Also returns every non-empty mount point found, depth-first.
    pub fn is_mounted(&self) -> (bool, Vec<&str>) {
        let mut mount_points = Vec::new();
        self.walk(&mut |dev| {
            if !dev.mount_point.is_empty() {
                mount_points.push(dev.mount_point.as_str());
            }
        });
        (!mount_points.is_empty(), mount_points)
    }

    /// Map mounted descendants to their mount points and back.
    ///
    /// Duplicate names or mount points are not reconciled; the last one
    /// visited wins.
    pub fn mount_info(&self) -> MountInfo {
        let mut info = MountInfo::default();
        self.walk(&mut |dev| {
            if !dev.mount_point.is_empty() {
                info.by_device
                    .insert(dev.name.clone(), dev.mount_point.clone());
                info.by_mount_point
                    .insert(dev.mount_point.clone(), dev.name.clone());
            }
        });
        info
    }

    /// Sum of `fsused` over all descendants.
    ///
    /// Values that are not plain decimal digits count as zero.
    pub fn used_capacity(&self) -> i64 {
        let mut used: i64 = 0;
        self.walk(&mut |dev| used = used.saturating_add(parse_used(&dev.fs_used)));
        used
    }

    /// All descendant partitions, depth-first.
    pub fn parts(&self) -> Vec<&DeviceNode> {
        let mut parts = Vec::new();
        self.walk(&mut |dev| {
            if dev.device_type == PART_TYPE {
                parts.push(dev);
            }
        });
        parts
    }
}

fn parse_used(value: &str) -> i64 {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    value.parse().unwrap_or(0)
}
