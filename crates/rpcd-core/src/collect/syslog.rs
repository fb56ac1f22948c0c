//! System and kernel log retrieval.

use super::command;
use super::fields::leading_int;
use rpcd_common::{Error, Result};
use rpcd_config::{Commands, ConfigStore, Paths};
use std::fs::File;
use std::io::{self, Read};
use tracing::debug;

/// Upper bound on returned log text.
pub const MAX_LOG_SIZE: u64 = 128 * 1024;

/// Used when the source size is zero or unknown.
pub const DEFAULT_LOG_SIZE: u64 = 16 * 1024;

/// Read the tail of a log stream whose total length is `size`.
///
/// A `size` of 0 means [`DEFAULT_LOG_SIZE`]. Above [`MAX_LOG_SIZE`] the
/// leading `size - MAX_LOG_SIZE` bytes are consumed and discarded, at most
/// `MAX_LOG_SIZE` at a time, so only the last `MAX_LOG_SIZE` bytes are kept.
/// Never returns more than `min(size, MAX_LOG_SIZE)` bytes.
pub fn read_log<R: Read>(reader: &mut R, size: u64) -> io::Result<Vec<u8>> {
    let mut remaining = if size == 0 { DEFAULT_LOG_SIZE } else { size };

    while remaining > MAX_LOG_SIZE {
        let chunk = match remaining % MAX_LOG_SIZE {
            0 => MAX_LOG_SIZE,
            partial => partial,
        };
        let skipped = io::copy(&mut reader.by_ref().take(chunk), &mut io::sink())?;
        remaining -= chunk;
        if skipped < chunk {
            // Source shorter than announced; nothing left to keep.
            break;
        }
    }

    let mut buf = Vec::with_capacity(remaining.min(MAX_LOG_SIZE) as usize);
    reader.take(remaining).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Log settings from the first `system` section of the `system` package.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogSource {
    /// File based logging: path to read.
    File(std::path::PathBuf),
    /// Log daemon ring buffer of the given size in bytes (0 = unknown).
    Daemon(u64),
}

fn log_source(store: &dyn ConfigStore, paths: &Paths) -> Result<LogSource> {
    let package = store
        .load("system")
        .ok_or_else(|| Error::NotFound("config package `system`".to_string()))?;
    let section = package.first_of_type("system");
    let option = |name: &str| section.and_then(|s| s.get(name));

    if option("log_type") == Some("file") {
        let path = option("log_file")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| paths.default_log_file.clone());
        return Ok(LogSource::File(path));
    }

    let size_kb = option("log_size").map(leading_int).unwrap_or(0);
    Ok(LogSource::Daemon((size_kb.max(0) as u64).saturating_mul(1024)))
}

/// The system log, as configured in UCI.
pub fn system_log(store: &dyn ConfigStore, paths: &Paths, commands: &Commands) -> Result<String> {
    let bytes = match log_source(store, paths)? {
        LogSource::File(path) => {
            let meta = std::fs::metadata(&path)
                .map_err(|e| Error::io(format!("stat {}", path.display()), e))?;
            let mut file =
                File::open(&path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
            debug!(path = %path.display(), size = meta.len(), "reading file log");
            read_log(&mut file, meta.len())
                .map_err(|e| Error::io(format!("read {}", path.display()), e))?
        }
        LogSource::Daemon(size) => {
            debug!(size, "reading log daemon buffer");
            command::with_stdout(&commands.logread, |out| read_log(out, size))?
        }
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The kernel ring buffer.
pub fn kernel_log(commands: &Commands) -> Result<String> {
    let bytes = command::with_stdout(&commands.dmesg, |out| read_log(out, MAX_LOG_SIZE))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
