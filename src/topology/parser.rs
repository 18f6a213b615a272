//! Inventory document parsing.

use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::device::DeviceNode;

/// Top-level key holding the device array.
pub const INVENTORY_KEY: &str = "blockdevices";

/// Device classes dropped from inventory results by default.
pub const DEFAULT_IGNORED_TYPES: [&str; 3] = ["loop", "rom", "usb"];

/// Errors raised while decoding an inventory document.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The bytes are not a well-formed inventory document.
    #[error("unable to decode inventory document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document lacks the device array.
    #[error("unexpected inventory format, missing \"{0}\" key")]
    MissingKey(&'static str),
}

#[derive(Debug, Deserialize)]
struct InventoryDocument {
    blockdevices: Option<Vec<DeviceNode>>,
}

/// A set of device types to exclude at the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredTypes(BTreeSet<String>);

impl IgnoredTypes {
    /// Build a set from any list of type names.
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    /// An empty set: nothing is filtered.
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Check whether `device_type` is excluded.
    pub fn contains(&self, device_type: &str) -> bool {
        self.0.contains(device_type)
    }

    /// Iterate over the excluded types, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for IgnoredTypes {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED_TYPES)
    }
}

/// Turns raw inventory bytes into device trees.
#[derive(Debug, Clone, Default)]
pub struct InventoryParser {
    ignored: IgnoredTypes,
}

impl InventoryParser {
    /// Create a parser that drops the given top-level types.
    pub fn new(ignored: IgnoredTypes) -> Self {
        Self { ignored }
    }

    /// The set of types this parser drops.
    pub fn ignored(&self) -> &IgnoredTypes {
        &self.ignored
    }

    /// Decode `document` and drop ignored top-level devices.
    ///
    /// Only the top level is filtered; children of a kept device are returned
    /// untouched. Document order is preserved.
    pub fn parse(&self, document: &[u8]) -> Result<Vec<DeviceNode>, FormatError> {
        let doc: InventoryDocument = serde_json::from_slice(document)?;
        let devices = doc
            .blockdevices
            .ok_or(FormatError::MissingKey(INVENTORY_KEY))?;

        let total = devices.len();
        let kept: Vec<DeviceNode> = devices
            .into_iter()
            .filter(|dev| !self.ignored.contains(&dev.device_type))
            .collect();
        debug!(total, kept = kept.len(), "parsed inventory");

        Ok(kept)
    }
}

/// Parse with the default ignored set.
pub fn parse_inventory(document: &[u8]) -> Result<Vec<DeviceNode>, FormatError> {
    InventoryParser::default().parse(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(devices: &[DeviceNode]) -> Vec<&str> {
        devices.iter().map(|d| d.device_type.as_str()).collect()
    }

    #[test]
    fn test_filters_ignored_top_level_types() {
        let doc = br#"{"blockdevices": [
            {"name": "/dev/sda", "type": "disk"},
            {"name": "/dev/loop0", "type": "loop"},
            {"name": "/dev/sdb", "type": "disk"},
            {"name": "/dev/sdc", "type": "usb"}
        ]}"#;
        let devices = parse_inventory(doc).unwrap();
        let names: Vec<_> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["/dev/sda", "/dev/sdb"]);
    }

    #[test]
    fn test_children_are_not_filtered() {
        let doc = br#"{"blockdevices": [
            {"name": "/dev/sda", "type": "disk", "children": [
                {"name": "/dev/loop7", "type": "loop"},
                {"name": "/dev/sda1", "type": "part"}
            ]}
        ]}"#;
        let devices = parse_inventory(doc).unwrap();
        assert_eq!(types(&devices[0].children), vec!["loop", "part"]);
    }

    #[test]
    fn test_custom_ignored_set() {
        let doc = br#"{"blockdevices": [
            {"name": "/dev/sr0", "type": "rom"},
            {"name": "/dev/md0", "type": "raid1"}
        ]}"#;
        let parser = InventoryParser::new(IgnoredTypes::new(["raid1"]));
        assert_eq!(types(&parser.parse(doc).unwrap()), vec!["rom"]);

        let parser = InventoryParser::new(IgnoredTypes::none());
        assert_eq!(parser.parse(doc).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_key() {
        let err = parse_inventory(br#"{"devices": []}"#).unwrap_err();
        assert!(matches!(err, FormatError::MissingKey("blockdevices")));
        assert!(err.to_string().contains("\"blockdevices\""));
    }

    #[test]
    fn test_null_key_counts_as_missing() {
        let err = parse_inventory(br#"{"blockdevices": null}"#).unwrap_err();
        assert!(matches!(err, FormatError::MissingKey(_)));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            parse_inventory(b"lsblk: command not found"),
            Err(FormatError::Malformed(_))
        ));
        assert!(matches!(parse_inventory(b"[]"), Err(FormatError::Malformed(_))));
        assert!(matches!(
            parse_inventory(br#"{"blockdevices": {}}"#),
            Err(FormatError::Malformed(_))
        ));
    }

    #[test]
    fn test_empty_inventory() {
        assert!(parse_inventory(br#"{"blockdevices": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_default_ignored_types() {
        let ignored = IgnoredTypes::default();
        assert_eq!(ignored.iter().collect::<Vec<_>>(), vec!["loop", "rom", "usb"]);
        assert!(!ignored.contains("disk"));
    }
}
