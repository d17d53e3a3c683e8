use miette::Diagnostic;
use thiserror::Error;

/// Runtime error type for volume lifecycle operations
#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeError {
    /// A `zfs` invocation exited non-zero
    #[error("Command '{command}' on volume '{target}' failed with exit code {exit_code}")]
    #[diagnostic(code(localzfs::runtime::command_failed), help("output: {output}"))]
    CommandFailed {
        #[allow(unused)]
        target: String,
        #[allow(unused)]
        command: String,
        #[allow(unused)]
        exit_code: i32,
        #[allow(unused)]
        output: String,
    },

    /// The existence query failed for a reason other than "not found"
    #[error("Could not determine whether volume '{target}' exists")]
    #[diagnostic(
        code(localzfs::runtime::probe_failed),
        help("`zfs list` failed with: {output}. Check that the pool is imported and zfs is usable, then retry")
    )]
    ProbeFailed {
        #[allow(unused)]
        target: String,
        #[allow(unused)]
        output: String,
    },

    /// The zvol device link is missing or does not resolve
    #[error("Could not resolve device path '{path}': {message}")]
    #[diagnostic(
        code(localzfs::runtime::path_resolution_failed),
        help("The zvol may not be materialized yet. Verify it exists with `zfs list` and that udev/devfs created the link")
    )]
    PathResolutionFailed {
        #[allow(unused)]
        path: String,
        #[allow(unused)]
        message: String,
    },

    /// Core library error
    #[error(transparent)]
    #[diagnostic(transparent)]
    CoreError(#[from] localzfs_core::CoreError),
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

impl RuntimeError {
    pub fn command_failed(
        target: impl Into<String>,
        command: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            target: target.into(),
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    pub fn probe_failed(target: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ProbeFailed {
            target: target.into(),
            output: output.into(),
        }
    }

    pub fn path_resolution_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PathResolutionFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}
