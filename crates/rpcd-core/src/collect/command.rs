//! Spawning the external commands collectors read from.

use rpcd_common::{Error, Result};
use std::io::Read;
use std::process::{ChildStdout, Command, Stdio};
use tracing::{debug, warn};

/// Spawn `argv` and hand its stdout to `read`.
///
/// stdin and stderr go to the null device. The child is always waited for
/// once `read` returns, after its stdout has been closed so a child still
/// writing gets `SIGPIPE` instead of blocking. A non-zero exit status is
/// logged, not reported: whatever was read is still the answer.
pub fn with_stdout<T>(
    argv: &[String],
    read: impl FnOnce(&mut ChildStdout) -> std::io::Result<T>,
) -> Result<T> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::InvalidArgument("empty command line".to_string()))?;

    debug!(program = %program, args = ?args, "spawning collector command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::io(format!("spawn {program}"), e))?;

    let result = match child.stdout.take() {
        Some(mut stdout) => read(&mut stdout),
        None => Err(std::io::Error::other("child stdout was not captured")),
    };

    match child.wait() {
        Ok(status) if !status.success() => {
            debug!(program = %program, %status, "collector command exited unsuccessfully");
        }
        Ok(_) => {}
        Err(e) => warn!(program = %program, error = %e, "failed to wait for collector command"),
    }

    result.map_err(|e| Error::io(format!("read output of {program}"), e))
}

/// Spawn `argv` and collect its whole stdout as (lossy) UTF-8.
pub fn capture_stdout(argv: &[String]) -> Result<String> {
    let bytes = with_stdout(argv, |stdout| {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf)?;
        Ok(buf)
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
