use crate::command::CommandRunner;
use crate::types::Presence;
use localzfs_core::args::list_args;
use tracing::debug;

/// Marker zfs prints when the queried dataset or zvol is missing
const NOT_FOUND_MARKER: &str = "dataset does not exist";

/// Ask the backing system whether `target` exists, without changing anything
pub async fn probe_volume(runner: &dyn CommandRunner, zfs_bin: &str, target: &str) -> Presence {
    let output = runner.run(zfs_bin, &list_args(target)).await;

    if output.success() {
        debug!("Probe: volume {} is present", target);
        return Presence::Present;
    }

    let combined = output.combined();
    if combined.contains(NOT_FOUND_MARKER) {
        debug!("Probe: volume {} is absent", target);
        Presence::Absent
    } else {
        Presence::Unknown { output: combined }
    }
}
