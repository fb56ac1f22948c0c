//! Trusted SSH key replacement for `sshkeys_set`.

use rpcd_common::{Error, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Truncate `path` and write every string in `keys`, one per line.
///
/// Non-string elements are skipped. The file is rewritten in place.
pub fn write_keys(path: &Path, keys: &[Value]) -> Result<usize> {
    let file = File::create(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
    let mut out = BufWriter::new(file);

    let mut written = 0;
    for key in keys {
        let Some(key) = key.as_str() else {
            debug!("skipping non-string key entry");
            continue;
        };
        out.write_all(key.as_bytes())
            .and_then(|_| out.write_all(b"\n"))
            .map_err(|e| Error::io(format!("write {}", path.display()), e))?;
        written += 1;
    }
    out.flush()
        .map_err(|e| Error::io(format!("write {}", path.display()), e))?;

    info!(path = %path.display(), keys = written, "authorized keys replaced");
    Ok(written)
}
