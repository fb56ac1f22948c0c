//! Signal delivery for `process_signal`.

use rpcd_common::{Error, Result};
use tracing::{debug, info};

/// Send `signal` to the single process `pid`.
///
/// Only positive pids are accepted: zero and negative values would address
/// process groups or every process the daemon may signal. Signal 0 is a
/// valid existence probe.
pub fn send_signal(pid: i64, signal: i64) -> Result<()> {
    let target = i32::try_from(pid)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| Error::InvalidArgument(format!("pid {pid} does not name a single process")))?;
    let signal = i32::try_from(signal)
        .map_err(|_| Error::InvalidArgument(format!("signal {signal} out of range")))?;

    debug!(pid = target, signal, "sending signal");

    // SAFETY: kill(2) has no memory-safety preconditions.
    let result = unsafe { libc::kill(target, signal) };
    if result == 0 {
        info!(pid = target, signal, "signal delivered");
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    Err(Error::io(format!("kill({target}, {signal})"), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcd_common::Status;

    #[test]
    fn test_probe_self() {
        send_signal(i64::from(std::process::id()), 0).unwrap();
    }

    #[test]
    fn test_rejects_group_and_broadcast_pids() {
        for pid in [0, -1, -42, i64::from(u32::MAX)] {
            let err = send_signal(pid, 0).unwrap_err();
            assert_eq!(err.status(), Status::InvalidArgument, "pid {pid}");
        }
    }

    #[test]
    fn test_invalid_signal() {
        let err = send_signal(i64::from(std::process::id()), 9999).unwrap_err();
        assert_eq!(err.status(), Status::InvalidArgument);
    }

    #[test]
    fn test_missing_process() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        let err = send_signal(i64::from(pid), 0).unwrap_err();
        assert_eq!(err.status(), Status::NotFound);
    }
}
