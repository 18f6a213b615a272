//! Block device tree as reported by `lsblk --json`.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

const GIB: i64 = 1024 * 1024 * 1024;

/// One node in a device tree: a disk, a partition, or a nested partition.
///
/// Field names follow lsblk's JSON output exactly. Missing fields and `null`
/// values decode to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNode {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub device_type: String,
    #[serde(rename = "size", default, deserialize_with = "lenient_i64")]
    pub size_bytes: i64,
    #[serde(rename = "rota", default, deserialize_with = "lenient_bool")]
    pub rotational: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub serial: String,
    #[serde(default, deserialize_with = "nullable")]
    pub wwn: String,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor: String,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(rename = "rev", default, deserialize_with = "nullable")]
    pub revision: String,
    #[serde(rename = "mountpoint", default, deserialize_with = "nullable")]
    pub mount_point: String,
    #[serde(rename = "partuuid", default, deserialize_with = "nullable")]
    pub part_uuid: String,
    #[serde(rename = "uuid", default, deserialize_with = "nullable")]
    pub fs_uuid: String,
    #[serde(rename = "ptuuid", default, deserialize_with = "nullable")]
    pub pt_uuid: String,
    /// Free-text, usually numeric. Not guaranteed to parse.
    ///
    /// lsblk 2.37+ emits these as numbers under `--bytes`; they are kept as
    /// their decimal text either way.
    #[serde(rename = "fsavail", default, deserialize_with = "lenient_string")]
    pub fs_avail: String,
    #[serde(rename = "fssize", default, deserialize_with = "lenient_string")]
    pub fs_size: String,
    #[serde(rename = "fsused", default, deserialize_with = "lenient_string")]
    pub fs_used: String,
    #[serde(rename = "fstype", default, deserialize_with = "nullable")]
    pub fs_type: String,
    /// Nested devices, in document order.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DeviceNode>,
}

/// Spinning or solid-state media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaKind {
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "SSD")]
    Ssd,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hdd => f.write_str("HDD"),
            Self::Ssd => f.write_str("SSD"),
        }
    }
}

impl DeviceNode {
    /// Create a node with just a name and type.
    pub fn new(name: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_type: device_type.into(),
            ..Default::default()
        }
    }

    /// Set the mount point.
    pub fn with_mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    /// Set the used-bytes string.
    pub fn with_fs_used(mut self, fs_used: impl Into<String>) -> Self {
        self.fs_used = fs_used.into();
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: DeviceNode) -> Self {
        self.children.push(child);
        self
    }

    /// A node without children: a partition or an unpartitioned disk.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `HDD` for rotational media, `SSD` otherwise.
    pub fn media_kind(&self) -> MediaKind {
        if self.rotational {
            MediaKind::Hdd
        } else {
            MediaKind::Ssd
        }
    }

    /// Size in whole GiB, rounded down.
    pub fn size_gib(&self) -> i64 {
        self.size_bytes / GIB
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a string, a number (kept as its decimal text), or null.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct StringVisitor;

    impl<'de> Visitor<'de> for StringVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, a number, or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(StringVisitor)
}

/// Accepts a number, a numeric string, or null.
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("size {v} out of range")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            if v.is_empty() {
                return Ok(0);
            }
            v.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> Result<i64, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

/// Accepts a bool, `0`/`1`, `"0"`/`"1"`, or null.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct BoolVisitor;

    impl<'de> Visitor<'de> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean, 0/1, or \"0\"/\"1\"")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v {
                "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}
