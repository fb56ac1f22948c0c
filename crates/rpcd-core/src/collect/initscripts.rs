//! Init script discovery.
//!
//! An init script is managed by `rc.common` when its first line mentions
//! `/etc/rc.common`. Its start and stop priorities are plain shell
//! assignments (`START=95`, `STOP=10`), and it is enabled when the matching
//! `S<nn><name>` priority link exists in the rc directory.

use super::fields::{leading_int, Fields};
use rpcd_common::{Error, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, trace};

const RC_COMMON_MARKER: &str = "/etc/rc.common";
const ASSIGNMENT_DELIMS: &[char] = &['=', ' ', '\t', '\n', '\r'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitScript {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<i64>,
    pub enabled: bool,
}

/// Start and stop priorities declared in a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Priorities {
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

/// Whether a file mode grants the owner execute permission.
pub fn is_user_executable(mode: u32) -> bool {
    mode & u32::from(libc::S_IXUSR) != 0
}

/// Scan script text for rc.common priorities.
///
/// `None` when the first line lacks the rc.common marker. A later `START`
/// overwrites an earlier one; the first `STOP` ends the scan.
pub fn parse_priorities<R: BufRead>(reader: R) -> Option<Priorities> {
    let mut lines = reader
        .split(b'\n')
        .map_while(std::result::Result::ok)
        .map(|line| String::from_utf8_lossy(&line).into_owned());
    let first = lines.next()?;
    if !first.contains(RC_COMMON_MARKER) {
        return None;
    }

    let mut priorities = Priorities::default();
    for line in lines {
        let fields = Fields::split(&line, ASSIGNMENT_DELIMS);
        match fields.require::<2>() {
            Some(["START", value]) => priorities.start = Some(leading_int(value)),
            Some(["STOP", value]) => {
                priorities.stop = Some(leading_int(value));
                break;
            }
            _ => {}
        }
    }

    Some(priorities)
}

fn rc_link_enabled(rc_dir: &Path, start: i64, name: &str) -> bool {
    let link = rc_dir.join(format!("S{start:02}{name}"));
    fs::metadata(link)
        .map(|meta| is_user_executable(meta.permissions().mode()))
        .unwrap_or(false)
}

fn inspect(init_dir: &Path, rc_dir: &Path, name: &str) -> Option<InitScript> {
    let path = init_dir.join(name);
    let meta = fs::metadata(&path).ok()?;
    if !meta.is_file() || !is_user_executable(meta.permissions().mode()) {
        trace!(script = name, "not an executable regular file");
        return None;
    }

    let file = File::open(&path).ok()?;
    let priorities = parse_priorities(BufReader::new(file))?;
    let enabled = priorities
        .start
        .is_some_and(|start| rc_link_enabled(rc_dir, start, name));

    Some(InitScript {
        name: name.to_string(),
        start: priorities.start,
        stop: priorities.stop,
        enabled,
    })
}

/// List rc.common init scripts in `init_dir`, sorted by name.
pub fn list_init_scripts(init_dir: &Path, rc_dir: &Path) -> Result<Vec<InitScript>> {
    let entries = fs::read_dir(init_dir)
        .map_err(|e| Error::io(format!("open {}", init_dir.display()), e))?;

    let mut scripts: Vec<InitScript> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            inspect(init_dir, rc_dir, name)
        })
        .collect();
    scripts.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(dir = %init_dir.display(), count = scripts.len(), "init scripts listed");
    Ok(scripts)
}
