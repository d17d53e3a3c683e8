use localzfs_core::args::ZFS_CMD;
use serde::{Deserialize, Serialize};

/// Default directory under which zvol device links appear
pub const ZVOL_DEV_DIR: &str = "/dev/zvol/";

/// How a failed existence query is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Any `zfs list` failure means the volume is absent
    #[default]
    Lenient,
    /// Only a "dataset does not exist" answer means absent; other failures
    /// are returned to the caller
    Strict,
}

impl std::str::FromStr for ProbeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "lenient" => Ok(ProbeMode::Lenient),
            "strict" => Ok(ProbeMode::Strict),
            other => Err(format!(
                "unknown probe mode '{}', expected 'lenient' or 'strict'",
                other
            )),
        }
    }
}

/// Host-side configuration for the volume manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZfsConfig {
    /// Name or path of the zfs binary
    pub zfs_bin: String,
    /// Directory holding `pool/name` links to zvol device nodes
    pub zvol_dir: String,
    pub probe_mode: ProbeMode,
}

impl Default for ZfsConfig {
    fn default() -> Self {
        Self {
            zfs_bin: ZFS_CMD.to_string(),
            zvol_dir: ZVOL_DEV_DIR.to_string(),
            probe_mode: ProbeMode::default(),
        }
    }
}

/// Result of probing for a volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// The query failed without saying the volume is missing
    Unknown { output: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ZfsConfig::default();
        assert_eq!(config.zfs_bin, "zfs");
        assert_eq!(config.zvol_dir, "/dev/zvol/");
        assert_eq!(config.probe_mode, ProbeMode::Lenient);
    }

    #[test]
    fn test_probe_mode_parse() {
        assert_eq!("strict".parse::<ProbeMode>().unwrap(), ProbeMode::Strict);
        assert_eq!("lenient".parse::<ProbeMode>().unwrap(), ProbeMode::Lenient);
        assert!("sometimes".parse::<ProbeMode>().is_err());
    }
}
