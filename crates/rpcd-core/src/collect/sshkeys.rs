//! Trusted SSH key listing.

use rpcd_common::{Error, Result};
use std::io::BufRead;
use std::path::Path;

/// Trimmed, non-empty lines of an authorized keys file, in file order.
///
/// Lines are decoded lossily; a non-UTF-8 comment does not hide the key.
pub fn parse_keys<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut keys = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let key = line.trim();
        if !key.is_empty() {
            keys.push(key.to_string());
        }
    }
    Ok(keys)
}

pub fn read_keys(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::io(format!("open {}", path.display()), e))?;
    parse_keys(std::io::BufReader::new(file))
        .map_err(|e| Error::io(format!("read {}", path.display()), e))
}
