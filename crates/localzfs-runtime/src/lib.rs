// Allow unused assignments for diagnostic fields - they're used by the thiserror/miette macros
#![allow(unused_assignments)]

pub mod command;
pub mod error;
pub mod manager;
pub mod mock;
pub mod probe;
pub mod types;

// Re-export primary types
pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use error::{Result, RuntimeError};
pub use manager::ZfsVolumeManager;
pub use mock::MockZfs;
pub use probe::probe_volume;
pub use types::{Presence, ProbeMode, ZfsConfig, ZVOL_DEV_DIR};
