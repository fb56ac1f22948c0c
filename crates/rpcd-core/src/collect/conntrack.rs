//! Connection tracking counters and table.

use super::fields::{leading_uint, Fields};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Current and maximum number of tracked connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConntrackCount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// One line of `/proc/net/nf_conntrack`.
///
/// The first `src`/`dst`/`sport`/`dport` belong to the original direction;
/// the first counter pair is rx and any later one tx.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConntrackEntry {
    pub ipv6: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dport: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_packets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_packets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_bytes: Option<u64>,
}

fn read_counter(path: &Path) -> Option<u64> {
    match std::fs::read_to_string(path) {
        Ok(text) => text.lines().next().map(leading_uint),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "conntrack counter unavailable");
            None
        }
    }
}

pub fn read_count(count_path: &Path, max_path: &Path) -> ConntrackCount {
    ConntrackCount {
        count: read_counter(count_path),
        limit: read_counter(max_path),
    }
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn set_once_num(slot: &mut Option<u64>, value: &str) {
    if slot.is_none() {
        *slot = Some(leading_uint(value));
    }
}

/// Fill the rx slot on first sight, the tx slot afterwards.
fn set_counter(rx: &mut Option<u64>, tx: &mut Option<u64>, value: &str) {
    let slot = if rx.is_none() { rx } else { tx };
    *slot = Some(leading_uint(value));
}

/// Parse one conntrack line. `None` for blank lines.
pub fn parse_conntrack_line(line: &str) -> Option<ConntrackEntry> {
    let fields = Fields::whitespace(line);
    if fields.is_empty() {
        return None;
    }

    let mut entry = ConntrackEntry::default();
    for (i, token) in fields.iter().enumerate() {
        match i {
            0 => entry.ipv6 = token == "ipv6",
            3 => entry.protocol = Some(leading_uint(token)),
            4 => entry.expires = Some(leading_uint(token)),
            1 | 2 => {}
            _ if token.starts_with('[') => {}
            _ => {
                let Some((key, value)) = token.split_once('=') else {
                    continue;
                };
                match key {
                    "src" => set_once(&mut entry.src, value),
                    "dst" => set_once(&mut entry.dest, value),
                    "sport" => set_once_num(&mut entry.sport, value),
                    "dport" => set_once_num(&mut entry.dport, value),
                    "packets" => set_counter(&mut entry.rx_packets, &mut entry.tx_packets, value),
                    "bytes" => set_counter(&mut entry.rx_bytes, &mut entry.tx_bytes, value),
                    _ => {}
                }
            }
        }
    }

    Some(entry)
}

pub fn parse_conntrack_table(content: &str) -> Vec<ConntrackEntry> {
    content.lines().filter_map(parse_conntrack_line).collect()
}

/// The tracked connection table; empty when the proc file is absent.
pub fn read_table(path: &Path) -> Vec<ConntrackEntry> {
    match std::fs::read(path) {
        Ok(bytes) => parse_conntrack_table(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "conntrack table unavailable");
            Vec::new()
        }
    }
}
