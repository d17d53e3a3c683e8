use crate::error::{CoreError, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Filesystem type that requests a dataset instead of a zvol
pub const FSTYPE_ZFS: &str = "zfs";

/// Kind of ZFS object backing a volume
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeType {
    /// Filesystem dataset, mounted directly
    #[serde(rename = "DATASET")]
    Dataset,
    /// Block device exposed under the zvol device directory
    #[default]
    #[serde(rename = "ZVOL")]
    Zvol,
}

impl VolumeType {
    /// Derive the volume type from a requested filesystem type.
    ///
    /// `zfs` yields a dataset; any other filesystem (ext4, xfs, or none at
    /// all) is formatted on top of a zvol.
    pub fn from_fs_type(fs_type: &str) -> Self {
        match fs_type {
            FSTYPE_ZFS => VolumeType::Dataset,
            _ => VolumeType::Zvol,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeType::Dataset => "DATASET",
            VolumeType::Zvol => "ZVOL",
        }
    }
}

impl std::fmt::Display for VolumeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thin provisioning request; unset leaves the ZFS default in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinProvision {
    Yes,
    No,
}

impl FromStr for ThinProvision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "yes" => Ok(ThinProvision::Yes),
            "no" => Ok(ThinProvision::No),
            other => Err(format!(
                "unknown thinProvision value '{}', expected \"yes\", \"no\" or empty",
                other
            )),
        }
    }
}

/// Read `thinProvision`, treating an empty string the same as unset
fn deserialize_thin_provision<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<ThinProvision>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.is_empty() => value.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Declarative description of one volume
///
/// Owned by the caller; this crate only reads it. Optional properties that
/// are unset or set to an empty string are left out of every command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSpec {
    /// Pool the volume lives in (e.g., "tank")
    pub pool_name: String,
    /// Volume name, unique within the pool
    pub name: String,
    #[serde(default)]
    pub volume_type: VolumeType,
    /// Quota for datasets, volsize for zvols (e.g., "10G")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_thin_provision",
        skip_serializing_if = "Option::is_none"
    )]
    pub thin_provision: Option<ThinProvision>,
    /// zvol only
    #[serde(
        rename = "volblocksize",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vol_block_size: Option<String>,
    /// dataset only
    #[serde(rename = "recordsize", default, skip_serializing_if = "Option::is_none")]
    pub record_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
    #[serde(rename = "keylocation", default, skip_serializing_if = "Option::is_none")]
    pub key_location: Option<String>,
    #[serde(rename = "keyformat", default, skip_serializing_if = "Option::is_none")]
    pub key_format: Option<String>,
}

/// Treat an empty string the same as an unset property
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl VolumeSpec {
    /// Create a spec with only the identifying fields set
    pub fn new(pool_name: &str, name: &str, volume_type: VolumeType) -> Self {
        Self {
            pool_name: pool_name.to_string(),
            name: name.to_string(),
            volume_type,
            ..Default::default()
        }
    }

    /// The `pool/name` key addressing this volume in ZFS
    pub fn target(&self) -> String {
        format!("{}/{}", self.pool_name, self.name)
    }

    pub fn is_dataset(&self) -> bool {
        self.volume_type == VolumeType::Dataset
    }

    /// Whether any property that `zfs set` can change is present
    pub fn has_mutable_properties(&self) -> bool {
        non_empty(&self.compression).is_some()
            || non_empty(&self.dedup).is_some()
            || (self.is_dataset() && non_empty(&self.record_size).is_some())
    }

    /// Check that the spec addresses exactly one volume
    pub fn validate(&self) -> Result<()> {
        let target = self.target();
        if self.pool_name.is_empty() {
            return Err(CoreError::invalid_spec(
                target,
                "pool name is empty",
                "Set poolName to an imported zpool, e.g. \"tank\"",
            ));
        }
        if self.name.is_empty() {
            return Err(CoreError::invalid_spec(
                target,
                "volume name is empty",
                "Set name to the volume's identifier",
            ));
        }
        if self.name.contains('/') || self.name.contains('@') {
            return Err(CoreError::invalid_spec(
                target,
                "volume name must not contain '/' or '@'",
                "Nested datasets and snapshots are not managed here; use a flat name",
            ));
        }
        Ok(())
    }

    /// Report whether `new` changes a property that must be re-applied.
    ///
    /// Record size only counts when both versions describe a dataset.
    pub fn property_changed(old: &VolumeSpec, new: &VolumeSpec) -> bool {
        if old.is_dataset()
            && new.is_dataset()
            && non_empty(&old.record_size) != non_empty(&new.record_size)
        {
            return true;
        }

        non_empty(&old.compression) != non_empty(&new.compression)
            || non_empty(&old.dedup) != non_empty(&new.dedup)
    }

    /// Reject an update that changes the volume identity or type
    pub fn validate_update(old: &VolumeSpec, new: &VolumeSpec) -> Result<()> {
        new.validate()?;
        if old.target() != new.target() {
            return Err(CoreError::immutable_property(
                old.target(),
                "target",
                old.target(),
                new.target(),
            ));
        }
        if old.volume_type != new.volume_type {
            return Err(CoreError::immutable_property(
                old.target(),
                "volumeType",
                old.volume_type.as_str(),
                new.volume_type.as_str(),
            ));
        }
        Ok(())
    }
}
