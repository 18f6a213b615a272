//! Tabular and summary views of a device inventory.

use std::fmt::Write as _;

use serde::Serialize;

use crate::topology::{DeviceNode, MediaKind};

/// Column headings of the disk table.
pub const TABLE_HEADERS: [&str; 7] = ["No", "Name", "Type", "Size", "Serial", "Vendor", "Model"];

/// One row of the disk table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskRow {
    /// 1-based position in the inventory.
    pub no: usize,
    pub name: String,
    pub media: MediaKind,
    /// Whole GiB.
    pub size_gib: i64,
    pub serial: String,
    pub vendor: String,
    pub model: String,
}

impl DiskRow {
    /// Build the row for the `index`-th (0-based) device.
    pub fn new(index: usize, dev: &DeviceNode) -> Self {
        Self {
            no: index + 1,
            name: dev.name.clone(),
            media: dev.media_kind(),
            size_gib: dev.size_gib(),
            serial: dev.serial.trim().to_string(),
            vendor: dev.vendor.trim().to_string(),
            model: dev.model.trim().to_string(),
        }
    }

    fn cells(&self) -> [String; 7] {
        [
            self.no.to_string(),
            self.name.clone(),
            self.media.to_string(),
            self.size_gib.to_string(),
            self.serial.clone(),
            self.vendor.clone(),
            self.model.clone(),
        ]
    }
}

/// Rows for every top-level device, in inventory order.
pub fn disk_rows(devices: &[DeviceNode]) -> Vec<DiskRow> {
    devices
        .iter()
        .enumerate()
        .map(|(i, dev)| DiskRow::new(i, dev))
        .collect()
}

/// Render the disk table as aligned plain text.
pub fn render_table(devices: &[DeviceNode]) -> String {
    let rows: Vec<[String; 7]> = disk_rows(devices).iter().map(DiskRow::cells).collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_line(&mut out, &widths, TABLE_HEADERS.iter().copied());
    for row in &rows {
        write_line(&mut out, &widths, row.iter().map(String::as_str));
    }
    out
}

fn write_line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// Structural facts about one disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskSummary {
    pub name: String,
    pub root: bool,
    pub mounted: bool,
    pub mount_points: Vec<String>,
    pub used_bytes: i64,
    pub partitions: Vec<String>,
}

impl DiskSummary {
    /// Run every query against `dev`.
    pub fn new(dev: &DeviceNode) -> Self {
        let (mounted, mount_points) = dev.is_mounted();
        Self {
            name: dev.name.clone(),
            root: dev.is_root_disk(),
            mounted,
            mount_points: mount_points.into_iter().map(String::from).collect(),
            used_bytes: dev.used_capacity(),
            partitions: dev.parts().into_iter().map(|p| p.name.clone()).collect(),
        }
    }
}

/// Render one summary line per disk.
pub fn render_summaries(devices: &[DeviceNode]) -> String {
    let mut out = String::new();
    for summary in devices.iter().map(DiskSummary::new) {
        let role = if summary.root { "root disk" } else { "data disk" };
        let mounts = if summary.mounted {
            summary.mount_points.join(", ")
        } else {
            "-".to_string()
        };
        let _ = writeln!(
            out,
            "{}: {}, partitions: {}, mounted: {}, used: {} bytes",
            summary.name,
            role,
            summary.partitions.len(),
            mounts,
            summary.used_bytes
        );
    }
    out
}
