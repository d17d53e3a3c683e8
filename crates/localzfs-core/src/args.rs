//! Argument vectors for the `zfs` administrative tool.
//!
//! Every function here is pure: identical input always yields the same
//! argument sequence, in the same order, and nothing is executed.

use crate::types::{non_empty, ThinProvision, VolumeSpec, VolumeType};

/// Administrative tool invoked for every operation
pub const ZFS_CMD: &str = "zfs";

pub const ZFS_CREATE: &str = "create";
pub const ZFS_DESTROY: &str = "destroy";
pub const ZFS_SET: &str = "set";
pub const ZFS_LIST: &str = "list";

/// Mountpoint value that unmounts a dataset and keeps it unmounted
pub const MOUNTPOINT_NONE: &str = "none";

/// Append `-o key=value` when the value is present
fn push_option(args: &mut Vec<String>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        args.push("-o".to_string());
        args.push(format!("{}={}", key, value));
    }
}

/// Append a bare `key=value` when the value is present
fn push_property(args: &mut Vec<String>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        args.push(format!("{}={}", key, value));
    }
}

/// Properties accepted at creation time by both zvols and datasets
fn shared_properties(spec: &VolumeSpec) -> [(&'static str, Option<&str>); 5] {
    [
        ("dedup", non_empty(&spec.dedup)),
        ("compression", non_empty(&spec.compression)),
        ("encryption", non_empty(&spec.encryption)),
        ("keylocation", non_empty(&spec.key_location)),
        ("keyformat", non_empty(&spec.key_format)),
    ]
}

/// `zfs create` arguments for the spec's volume type
pub fn create_args(spec: &VolumeSpec) -> Vec<String> {
    match spec.volume_type {
        VolumeType::Zvol => zvol_create_args(spec),
        VolumeType::Dataset => dataset_create_args(spec),
    }
}

/// `create [-s] [-V size] [-b blocksize] [-o k=v]... pool/name`
pub fn zvol_create_args(spec: &VolumeSpec) -> Vec<String> {
    let mut args = vec![ZFS_CREATE.to_string()];

    if spec.thin_provision == Some(ThinProvision::Yes) {
        args.push("-s".to_string());
    }
    if let Some(size) = non_empty(&spec.capacity) {
        args.push("-V".to_string());
        args.push(size.to_string());
    }
    if let Some(block_size) = non_empty(&spec.vol_block_size) {
        args.push("-b".to_string());
        args.push(block_size.to_string());
    }
    for (key, value) in shared_properties(spec) {
        push_option(&mut args, key, value);
    }

    args.push(spec.target());
    args
}

/// `create [-o k=v]... -o mountpoint=none pool/name`
///
/// Datasets are created unmounted; mounting is a separate step.
pub fn dataset_create_args(spec: &VolumeSpec) -> Vec<String> {
    let mut args = vec![ZFS_CREATE.to_string()];
    let capacity = non_empty(&spec.capacity);

    push_option(&mut args, "quota", capacity);
    push_option(&mut args, "recordsize", non_empty(&spec.record_size));
    if spec.thin_provision == Some(ThinProvision::No) {
        push_option(&mut args, "reservation", capacity);
    }
    for (key, value) in shared_properties(spec) {
        push_option(&mut args, key, value);
    }
    push_option(&mut args, "mountpoint", Some(MOUNTPOINT_NONE));

    args.push(spec.target());
    args
}

/// `set [recordsize=] [dedup=] [compression=] pool/name`
///
/// Only properties that may change after creation are included. Callers
/// should check `VolumeSpec::has_mutable_properties` first; with nothing to
/// apply the result is just `set pool/name`.
pub fn set_args(spec: &VolumeSpec) -> Vec<String> {
    let mut args = vec![ZFS_SET.to_string()];

    if spec.is_dataset() {
        push_property(&mut args, "recordsize", non_empty(&spec.record_size));
    }
    push_property(&mut args, "dedup", non_empty(&spec.dedup));
    push_property(&mut args, "compression", non_empty(&spec.compression));

    args.push(spec.target());
    args
}

/// `destroy -R pool/name`, removing dependent snapshots and clones too
pub fn destroy_args(spec: &VolumeSpec) -> Vec<String> {
    vec![ZFS_DESTROY.to_string(), "-R".to_string(), spec.target()]
}

/// `set mountpoint=<path> target`; a path of `none` unmounts
pub fn mount_prop_args(target: &str, mountpath: &str) -> Vec<String> {
    vec![
        ZFS_SET.to_string(),
        format!("mountpoint={}", mountpath),
        target.to_string(),
    ]
}

/// `list target`, used to probe for existence
pub fn list_args(target: &str) -> Vec<String> {
    vec![ZFS_LIST.to_string(), target.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zvol() -> VolumeSpec {
        VolumeSpec::new("tank", "vol1", VolumeType::Zvol)
    }

    fn dataset() -> VolumeSpec {
        VolumeSpec::new("tank", "ds1", VolumeType::Dataset)
    }

    fn has_property(args: &[String], prefix: &str) -> bool {
        args.iter().any(|a| a.starts_with(prefix))
    }

    #[test]
    fn test_zvol_create_thin_with_compression() {
        let mut spec = zvol();
        spec.capacity = Some("5G".to_string());
        spec.thin_provision = Some(ThinProvision::Yes);
        spec.compression = Some("on".to_string());

        assert_eq!(
            create_args(&spec),
            vec!["create", "-s", "-V", "5G", "-o", "compression=on", "tank/vol1"]
        );
    }

    #[test]
    fn test_zvol_create_full_property_order() {
        let mut spec = zvol();
        spec.capacity = Some("1G".to_string());
        spec.vol_block_size = Some("16K".to_string());
        spec.dedup = Some("on".to_string());
        spec.compression = Some("lz4".to_string());
        spec.encryption = Some("aes-256-gcm".to_string());
        spec.key_location = Some("file:///keys/vol1".to_string());
        spec.key_format = Some("raw".to_string());
        spec.thin_provision = Some(ThinProvision::No);

        assert_eq!(
            create_args(&spec),
            vec![
                "create",
                "-V",
                "1G",
                "-b",
                "16K",
                "-o",
                "dedup=on",
                "-o",
                "compression=lz4",
                "-o",
                "encryption=aes-256-gcm",
                "-o",
                "keylocation=file:///keys/vol1",
                "-o",
                "keyformat=raw",
                "tank/vol1",
            ]
        );
    }

    #[test]
    fn test_zvol_create_never_emits_recordsize() {
        let mut spec = zvol();
        spec.capacity = Some("5G".to_string());
        spec.record_size = Some("128K".to_string());

        let args = create_args(&spec);
        assert!(!has_property(&args, "recordsize="));
        assert!(!has_property(&args, "mountpoint="));
        assert_eq!(args, vec!["create", "-V", "5G", "tank/vol1"]);
    }

    #[test]
    fn test_dataset_create_with_recordsize() {
        let mut spec = dataset();
        spec.capacity = Some("2G".to_string());
        spec.record_size = Some("128K".to_string());

        assert_eq!(
            create_args(&spec),
            vec![
                "create",
                "-o",
                "quota=2G",
                "-o",
                "recordsize=128K",
                "-o",
                "mountpoint=none",
                "tank/ds1",
            ]
        );
    }

    #[test]
    fn test_dataset_thick_provision_adds_reservation() {
        let mut spec = dataset();
        spec.capacity = Some("10G".to_string());
        spec.thin_provision = Some(ThinProvision::No);

        let args = create_args(&spec);
        assert_eq!(
            args,
            vec![
                "create",
                "-o",
                "quota=10G",
                "-o",
                "reservation=10G",
                "-o",
                "mountpoint=none",
                "tank/ds1",
            ]
        );

        spec.thin_provision = Some(ThinProvision::Yes);
        assert!(!has_property(&create_args(&spec), "reservation="));

        spec.thin_provision = None;
        assert!(!has_property(&create_args(&spec), "reservation="));
    }

    #[test]
    fn test_dataset_create_ignores_zvol_only_fields() {
        let mut spec = dataset();
        spec.vol_block_size = Some("16K".to_string());
        spec.thin_provision = Some(ThinProvision::Yes);

        assert_eq!(
            create_args(&spec),
            vec!["create", "-o", "mountpoint=none", "tank/ds1"]
        );
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let mut spec = dataset();
        spec.capacity = Some(String::new());
        spec.dedup = Some(String::new());
        spec.thin_provision = Some(ThinProvision::No);

        assert_eq!(
            create_args(&spec),
            vec!["create", "-o", "mountpoint=none", "tank/ds1"]
        );
        assert_eq!(set_args(&spec), vec!["set", "tank/ds1"]);
    }

    #[test]
    fn test_set_args_dataset_order() {
        let mut spec = dataset();
        spec.compression = Some("gzip".to_string());
        spec.dedup = Some("off".to_string());
        spec.record_size = Some("64K".to_string());
        spec.encryption = Some("on".to_string());

        assert_eq!(
            set_args(&spec),
            vec![
                "set",
                "recordsize=64K",
                "dedup=off",
                "compression=gzip",
                "tank/ds1"
            ]
        );
    }

    #[test]
    fn test_set_args_zvol_skips_recordsize() {
        let mut spec = zvol();
        spec.record_size = Some("64K".to_string());
        spec.compression = Some("lz4".to_string());

        assert_eq!(set_args(&spec), vec!["set", "compression=lz4", "tank/vol1"]);
    }

    #[test]
    fn test_destroy_args() {
        assert_eq!(destroy_args(&zvol()), vec!["destroy", "-R", "tank/vol1"]);
    }

    #[test]
    fn test_mount_prop_args() {
        assert_eq!(
            mount_prop_args("tank/ds1", "/var/lib/kubelet/pods/x/mount"),
            vec!["set", "mountpoint=/var/lib/kubelet/pods/x/mount", "tank/ds1"]
        );
        assert_eq!(
            mount_prop_args("tank/ds1", MOUNTPOINT_NONE),
            vec!["set", "mountpoint=none", "tank/ds1"]
        );
    }

    #[test]
    fn test_list_args() {
        assert_eq!(list_args("tank/vol1"), vec!["list", "tank/vol1"]);
    }

    #[test]
    fn test_builders_are_deterministic() {
        let mut spec = dataset();
        spec.capacity = Some("10G".to_string());
        spec.thin_provision = Some(ThinProvision::No);
        spec.record_size = Some("128K".to_string());
        spec.dedup = Some("on".to_string());
        spec.compression = Some("zstd".to_string());

        assert_eq!(create_args(&spec), create_args(&spec));
        assert_eq!(set_args(&spec), set_args(&spec));
        assert_eq!(destroy_args(&spec), destroy_args(&spec));

        spec.volume_type = VolumeType::Zvol;
        assert_eq!(create_args(&spec), create_args(&spec));
    }
}
