use crate::command::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use localzfs_core::args::{ZFS_CREATE, ZFS_DESTROY, ZFS_LIST, ZFS_SET};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

type Properties = BTreeMap<String, String>;

/// In-memory stand-in for the `zfs` tool
///
/// Tracks volumes and their properties so tests can assert which commands
/// were issued, and in what order, without touching a real pool. Understands
/// the `create`, `destroy`, `set` and `list` forms the volume manager emits.
#[derive(Clone, Default)]
pub struct MockZfs {
    volumes: Arc<RwLock<HashMap<String, Properties>>>,
    calls: Arc<RwLock<Vec<Vec<String>>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
}

fn failure(exit_code: i32, stderr: String) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr,
        exit_code,
    }
}

fn ok(stdout: String) -> CommandOutput {
    CommandOutput {
        stdout,
        stderr: String::new(),
        exit_code: 0,
    }
}

fn not_found(target: &str) -> CommandOutput {
    failure(1, format!("cannot open '{}': dataset does not exist\n", target))
}

impl MockZfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing volume
    pub async fn with_volume(self, target: &str) -> Self {
        self.volumes
            .write()
            .await
            .insert(target.to_string(), Properties::new());
        self
    }

    /// Make the next invocation of `subcommand` exit 1 with `message`
    pub async fn fail_next(&self, subcommand: &str, message: &str) {
        self.failures
            .write()
            .await
            .insert(subcommand.to_string(), message.to_string());
    }

    /// Every argument vector received so far, oldest first
    pub async fn calls(&self) -> Vec<Vec<String>> {
        self.calls.read().await.clone()
    }

    /// Argument vectors whose sub-command is `subcommand`
    pub async fn calls_for(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|args| args.first().map(String::as_str) == Some(subcommand))
            .cloned()
            .collect()
    }

    pub async fn contains(&self, target: &str) -> bool {
        self.volumes.read().await.contains_key(target)
    }

    pub async fn properties(&self, target: &str) -> Option<Properties> {
        self.volumes.read().await.get(target).cloned()
    }

    async fn list(&self, args: &[String]) -> CommandOutput {
        let Some(target) = args.last() else {
            return failure(2, "missing dataset argument\n".to_string());
        };
        let volumes = self.volumes.read().await;
        match volumes.get(target) {
            Some(props) => {
                let mountpoint = props.get("mountpoint").map(String::as_str).unwrap_or("-");
                ok(format!(
                    "NAME  USED  AVAIL  REFER  MOUNTPOINT\n{}  96K  9.5G  96K  {}\n",
                    target, mountpoint
                ))
            }
            None => not_found(target),
        }
    }

    async fn create(&self, args: &[String]) -> CommandOutput {
        let Some((target, flags)) = args.split_last() else {
            return failure(2, "missing dataset argument\n".to_string());
        };

        let mut props = Properties::new();
        let mut iter = flags.iter();
        while let Some(flag) = iter.next() {
            let (key, value) = match flag.as_str() {
                "-s" => ("refreservation".to_string(), "none".to_string()),
                "-V" | "-b" => {
                    let key = if flag == "-V" { "volsize" } else { "volblocksize" };
                    match iter.next() {
                        Some(value) => (key.to_string(), value.clone()),
                        None => return failure(2, format!("missing argument for '{}'\n", flag)),
                    }
                }
                "-o" => match iter.next().and_then(|kv| kv.split_once('=')) {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => return failure(2, "missing property=value for '-o'\n".to_string()),
                },
                other => return failure(2, format!("invalid option '{}'\n", other)),
            };
            props.insert(key, value);
        }

        let mut volumes = self.volumes.write().await;
        if volumes.contains_key(target) {
            return failure(
                1,
                format!("cannot create '{}': dataset already exists\n", target),
            );
        }
        volumes.insert(target.clone(), props);
        ok(String::new())
    }

    async fn destroy(&self, args: &[String]) -> CommandOutput {
        let Some(target) = args.last().filter(|t| !t.starts_with('-')) else {
            return failure(2, "missing dataset argument\n".to_string());
        };
        let mut volumes = self.volumes.write().await;
        if volumes.remove(target).is_none() {
            return not_found(target);
        }
        let children = format!("{}/", target);
        volumes.retain(|name, _| !name.starts_with(&children));
        ok(String::new())
    }

    async fn set(&self, args: &[String]) -> CommandOutput {
        let Some((target, assignments)) = args.split_last() else {
            return failure(2, "missing dataset argument\n".to_string());
        };
        if assignments.is_empty() {
            return failure(2, "missing property=value argument(s)\n".to_string());
        }

        let mut parsed = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            match assignment.split_once('=') {
                Some((k, v)) => parsed.push((k.to_string(), v.to_string())),
                None => return failure(2, format!("invalid property '{}'\n", assignment)),
            }
        }

        let mut volumes = self.volumes.write().await;
        match volumes.get_mut(target) {
            Some(props) => {
                props.extend(parsed);
                ok(String::new())
            }
            None => not_found(target),
        }
    }
}

#[async_trait]
impl CommandRunner for MockZfs {
    async fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        debug!("Mock: {} {}", program, args.join(" "));
        self.calls.write().await.push(args.to_vec());

        let Some((subcommand, rest)) = args.split_first() else {
            return failure(2, "missing command\n".to_string());
        };

        if let Some(message) = self.failures.write().await.remove(subcommand) {
            return failure(1, message);
        }

        match subcommand.as_str() {
            ZFS_LIST => self.list(rest).await,
            ZFS_CREATE => self.create(rest).await,
            ZFS_DESTROY => self.destroy(rest).await,
            ZFS_SET => self.set(rest).await,
            other => failure(2, format!("unrecognized command '{}'\n", other)),
        }
    }
}
