use crate::command::CommandRunner;
use crate::error::{Result, RuntimeError};
use crate::probe::probe_volume;
use crate::types::{Presence, ProbeMode, ZfsConfig};
use localzfs_core::args::{
    create_args, destroy_args, mount_prop_args, set_args, MOUNTPOINT_NONE,
};
use localzfs_core::{VolumeSpec, VolumeType};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives the `zfs` tool to create, destroy, mount and reconfigure volumes
///
/// Holds no per-volume state: every call re-derives what to do from the
/// spec and a live `zfs list` probe, so any operation can be retried from
/// scratch. Calls for the same volume must be serialized by the caller.
pub struct ZfsVolumeManager {
    config: ZfsConfig,
    runner: Arc<dyn CommandRunner>,
}

impl ZfsVolumeManager {
    pub fn new(config: ZfsConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ZfsConfig {
        &self.config
    }

    /// Whether `target` currently exists, interpreted per the probe mode
    pub async fn volume_exists(&self, target: &str) -> Result<bool> {
        match probe_volume(self.runner.as_ref(), &self.config.zfs_bin, target).await {
            Presence::Present => Ok(true),
            Presence::Absent => Ok(false),
            Presence::Unknown { output } => match self.config.probe_mode {
                ProbeMode::Lenient => {
                    warn!(
                        "zfs list failed for {}, treating it as absent: {}",
                        target,
                        output.trim()
                    );
                    Ok(false)
                }
                ProbeMode::Strict => Err(RuntimeError::probe_failed(target, output.trim())),
            },
        }
    }

    /// Run one zfs command against `target`, failing on non-zero exit
    async fn run_zfs(&self, target: &str, args: &[String], action: &str) -> Result<()> {
        let output = self.runner.run(&self.config.zfs_bin, args).await;
        if output.success() {
            return Ok(());
        }

        let captured = output.combined();
        error!(
            "zfs: could not {} {} cmd {:?} error: {}",
            action,
            target,
            args,
            captured.trim()
        );
        Err(RuntimeError::command_failed(
            target,
            format!("{} {}", self.config.zfs_bin, args.join(" ")),
            output.exit_code,
            captured,
        ))
    }

    /// Create the zvol or dataset unless it already exists
    pub async fn create_volume(&self, spec: &VolumeSpec) -> Result<()> {
        spec.validate()?;
        let target = spec.target();

        if self.volume_exists(&target).await? {
            info!("using existing volume {}", target);
            return Ok(());
        }

        let args = create_args(spec);
        self.run_zfs(&target, &args, "create volume").await?;
        info!("created volume {}", target);
        Ok(())
    }

    /// Destroy the volume and everything below it; absent volumes succeed
    pub async fn destroy_volume(&self, spec: &VolumeSpec) -> Result<()> {
        spec.validate()?;
        let target = spec.target();

        if !self.volume_exists(&target).await? {
            info!("volume {} already destroyed", target);
            return Ok(());
        }

        let args = destroy_args(spec);
        self.run_zfs(&target, &args, "destroy volume").await?;
        info!("destroyed volume {}", target);
        Ok(())
    }

    /// Re-apply every mutable property present in the spec.
    ///
    /// No previous version of the spec is kept, so the whole set is sent
    /// each time; `zfs set` with an unchanged value is a no-op.
    pub async fn set_volume_properties(&self, spec: &VolumeSpec) -> Result<()> {
        spec.validate()?;
        if !spec.has_mutable_properties() {
            return Ok(());
        }

        let target = spec.target();
        let args = set_args(spec);
        self.run_zfs(&target, &args, "set property on volume").await?;
        info!("property set on volume {}", target);
        Ok(())
    }

    /// Set the `mountpoint` property of `target`; `none` unmounts
    pub async fn set_mountpoint(&self, target: &str, mountpath: &str) -> Result<()> {
        let args = mount_prop_args(target, mountpath);
        self.run_zfs(target, &args, "set mountpoint on dataset").await?;
        info!("mountpoint of {} set to {}", target, mountpath);
        Ok(())
    }

    /// Mount a dataset at `mountpath`
    pub async fn mount_dataset(&self, spec: &VolumeSpec, mountpath: &str) -> Result<()> {
        spec.validate()?;
        self.set_mountpoint(&spec.target(), mountpath).await
    }

    /// Unmount a dataset, leaving it unmounted across reboots
    pub async fn unmount_dataset(&self, spec: &VolumeSpec) -> Result<()> {
        spec.validate()?;
        self.set_mountpoint(&spec.target(), MOUNTPOINT_NONE).await
    }

    /// Path a consumer should use for the volume.
    ///
    /// Datasets are addressed by their `pool/name` key. Zvols resolve the
    /// link under the zvol directory to the real device node.
    pub async fn device_path(&self, spec: &VolumeSpec) -> Result<String> {
        spec.validate()?;
        let target = spec.target();
        if spec.volume_type == VolumeType::Dataset {
            return Ok(target);
        }

        let link = Path::new(&self.config.zvol_dir).join(&target);
        let device = tokio::fs::canonicalize(&link).await.map_err(|e| {
            RuntimeError::path_resolution_failed(link.display().to_string(), e.to_string())
        })?;
        Ok(device.to_string_lossy().into_owned())
    }
}
