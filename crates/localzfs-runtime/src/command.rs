use async_trait::async_trait;
use tracing::debug;

/// Output from a command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr, both unmodified
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Capability to run an external program and capture its output
///
/// The volume manager performs all of its I/O through this trait, so tests
/// can substitute `MockZfs` and assert on the exact argument vectors.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, returning output regardless of exit code.
    ///
    /// A program that cannot be spawned is reported as exit code -1 with
    /// the OS error as stderr.
    async fn run(&self, program: &str, args: &[String]) -> CommandOutput;
}

/// Runs commands on the host via `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        debug!("Executing: {} {}", program, args.join(" "));

        let output = match tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!("Failed to spawn {}: {}", program, e);
                return CommandOutput {
                    stdout: String::new(),
                    stderr: e.to_string(),
                    exit_code: -1,
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            "Command exited with code {}: {} {}",
            exit_code,
            program,
            args.join(" ")
        );

        CommandOutput {
            stdout,
            stderr,
            exit_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            stdout: "line one\n".to_string(),
            stderr: "cannot open 'tank/x': dataset does not exist\n".to_string(),
            exit_code: 1,
        };
        assert!(!output.success());
        assert_eq!(
            output.combined(),
            "line one\ncannot open 'tank/x': dataset does not exist\n"
        );

        let only_err = CommandOutput {
            stderr: "boom".to_string(),
            exit_code: 2,
            ..Default::default()
        };
        assert_eq!(only_err.combined(), "boom");

        let no_newline = CommandOutput {
            stdout: "partial".to_string(),
            stderr: "error".to_string(),
            exit_code: 1,
        };
        assert_eq!(no_newline.combined(), "partialerror");
    }

    #[tokio::test]
    async fn test_missing_binary_reports_spawn_failure() {
        let output = SystemRunner
            .run("/nonexistent/localzfs-test-binary", &["list".to_string()])
            .await;
        assert_eq!(output.exit_code, -1);
        assert!(!output.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_exit_code() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = SystemRunner.run("sh", &args).await;
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.combined(), "out\nerr\n");
    }
}
