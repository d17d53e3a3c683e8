use clap::{Parser, Subcommand};
use localzfs_core::args::{create_args, destroy_args, set_args, ZFS_CMD};
use localzfs_core::VolumeSpec;
use localzfs_runtime::{
    CommandRunner, MockZfs, ProbeMode, SystemRunner, ZfsConfig, ZfsVolumeManager, ZVOL_DEV_DIR,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "localzfs", about = "Manage a local ZFS volume from a declarative spec")]
struct Cli {
    /// Path to the volume spec (YAML, or JSON with a .json extension)
    #[arg(long, global = true, default_value = "volume.yaml")]
    spec: String,
    /// zfs binary to invoke
    #[arg(long, global = true, env = "LOCALZFS_BIN", default_value = ZFS_CMD)]
    zfs_bin: String,
    /// Directory holding zvol device links
    #[arg(long, global = true, env = "LOCALZFS_ZVOL_DIR", default_value = ZVOL_DEV_DIR)]
    zvol_dir: String,
    /// How to treat a failed existence probe: lenient or strict
    #[arg(long, global = true, env = "LOCALZFS_PROBE_MODE", default_value = "lenient")]
    probe_mode: ProbeMode,
    /// Run against an in-memory zfs instead of the host
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the volume unless it already exists
    Create,
    /// Destroy the volume and its descendants
    Destroy,
    /// Re-apply the mutable properties (recordsize, dedup, compression)
    Set,
    /// Mount a dataset
    Mount {
        /// Mountpoint to set on the dataset
        #[arg(long)]
        path: String,
    },
    /// Unmount a dataset
    Unmount,
    /// Print the path consumers should use for the volume
    DevicePath,
    /// Print the zfs arguments the spec produces, without running anything
    Args,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let spec = load_spec(&cli.spec).await?;

    let config = ZfsConfig {
        zfs_bin: cli.zfs_bin,
        zvol_dir: cli.zvol_dir,
        probe_mode: cli.probe_mode,
    };
    let runner: Arc<dyn CommandRunner> = if cli.dry_run {
        Arc::new(MockZfs::new())
    } else {
        Arc::new(SystemRunner)
    };
    let manager = ZfsVolumeManager::new(config, runner);
    if cli.dry_run {
        info!(
            "Dry run: {} commands go to an in-memory zfs",
            manager.config().zfs_bin
        );
    }

    match cli.command {
        Commands::Create => manager.create_volume(&spec).await?,
        Commands::Destroy => manager.destroy_volume(&spec).await?,
        Commands::Set => manager.set_volume_properties(&spec).await?,
        Commands::Mount { path } => manager.mount_dataset(&spec, &path).await?,
        Commands::Unmount => manager.unmount_dataset(&spec).await?,
        Commands::DevicePath => println!("{}", manager.device_path(&spec).await?),
        Commands::Args => print_args(&spec)?,
    }

    Ok(())
}

/// Read a spec file, choosing the format from its extension
async fn load_spec(path: &str) -> miette::Result<VolumeSpec> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| miette::miette!("Failed to read spec '{}': {}", path, e))?;

    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let spec: VolumeSpec = if is_json {
        localzfs_core::from_json(&data)?
    } else {
        localzfs_core::from_yaml(&data)?
    };

    spec.validate()?;
    Ok(spec)
}

/// Argument vectors the spec produces; `set` is null when nothing is mutable
fn args_json(spec: &VolumeSpec) -> serde_json::Value {
    let set = spec.has_mutable_properties().then(|| set_args(spec));
    serde_json::json!({
        "target": spec.target(),
        "create": create_args(spec),
        "set": set,
        "destroy": destroy_args(spec),
    })
}

fn print_args(spec: &VolumeSpec) -> miette::Result<()> {
    println!("{}", localzfs_core::to_json_pretty(&args_json(spec))?);
    Ok(())
}
