//! Init script control for `init_action`.
//!
//! The script runs detached: null stdio, `/` as working directory, its own
//! process group. The caller only learns whether the spawn succeeded.
//! Finished children are reaped without blocking on later calls.

use crate::collect::initscripts::is_user_executable;
use rpcd_common::{Error, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Actions an init script may be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitAction {
    Start,
    Stop,
    Reload,
    Restart,
    Enable,
    Disable,
}

impl InitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitAction::Start => "start",
            InitAction::Stop => "stop",
            InitAction::Reload => "reload",
            InitAction::Restart => "restart",
            InitAction::Enable => "enable",
            InitAction::Disable => "disable",
        }
    }
}

impl FromStr for InitAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(InitAction::Start),
            "stop" => Ok(InitAction::Stop),
            "reload" => Ok(InitAction::Reload),
            "restart" => Ok(InitAction::Restart),
            "enable" => Ok(InitAction::Enable),
            "disable" => Ok(InitAction::Disable),
            other => Err(Error::InvalidArgument(format!(
                "unsupported init action `{other}`"
            ))),
        }
    }
}

impl std::fmt::Display for InitAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject anything that is not a single, plain path component.
pub fn validate_script_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\0');
    if bad {
        return Err(Error::InvalidArgument(format!(
            "invalid init script name {name:?}"
        )));
    }
    Ok(())
}

/// Detached init script children awaiting collection.
#[derive(Debug, Default)]
pub struct ChildReaper {
    children: Mutex<Vec<Child>>,
}

impl ChildReaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children not yet collected.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Collect every child that has exited, without blocking.
    ///
    /// Returns the number collected. Exit statuses are only logged.
    pub fn reap(&self) -> usize {
        let mut children = self.lock();
        let before = children.len();
        children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "init script finished");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(pid = child.id(), error = %e, "failed to poll init script");
                false
            }
        });
        before - children.len()
    }

    /// Spawn `script action` detached and keep its handle for reaping.
    pub fn spawn(&self, script: &Path, action: InitAction) -> Result<u32> {
        let child = Command::new(script)
            .arg(action.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .current_dir("/")
            .process_group(0)
            .spawn()
            .map_err(|e| Error::io(format!("spawn {}", script.display()), e))?;

        let pid = child.id();
        self.lock().push(child);
        Ok(pid)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Child>> {
        self.children.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Run `action` on init script `name` in `init_dir`.
///
/// The action and name are validated before the filesystem is touched.
pub fn run_init_action(
    init_dir: &Path,
    name: &str,
    action: &str,
    reaper: &ChildReaper,
) -> Result<()> {
    let action: InitAction = action.parse()?;
    validate_script_name(name)?;

    let script = init_dir.join(name);
    let meta = fs::metadata(&script)
        .map_err(|e| Error::io(format!("stat {}", script.display()), e))?;
    if !is_user_executable(meta.permissions().mode()) {
        return Err(Error::PermissionDenied(format!(
            "{} is not executable",
            script.display()
        )));
    }

    let pid = reaper.spawn(&script, action)?;
    info!(script = name, %action, pid, "init script spawned");
    Ok(())
}
