//! DHCP and DHCPv6 lease tables.
//!
//! IPv4 leases come from the dnsmasq lease file named in UCI
//! (`dhcp.@dnsmasq[0].leasefile`):
//!
//! ```text
//! 1700003600 00:11:22:33:44:55 192.168.1.10 laptop 01:00:11:22:33:44:55
//! ```
//!
//! IPv6 leases prefer the relay daemon's host file, whose lease lines are
//! comments:
//!
//! ```text
//! # br-lan 000100011d9a6b1c001122334455 7 laptop 1700003600 c 128 fd00::10
//! ```
//!
//! and fall back to the IPv6 rows of the dnsmasq lease file when the relay
//! file cannot be opened. Missing sources yield empty tables.

use super::fields::{leading_int, Fields};
use rpcd_config::ConfigStore;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lease {
    /// Seconds until expiry; negative once expired.
    pub expires: i64,
    pub macaddr: String,
    pub ipaddr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// A DHCPv6 lease. Which optional fields are set depends on the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lease6 {
    pub expires: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macaddr: Option<String>,
    pub ip6addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

fn unless(value: &str, placeholder: &str) -> Option<String> {
    (value != placeholder).then(|| value.to_string())
}

/// Lease file path from the first `dnsmasq` section of the `dhcp` package.
pub fn dnsmasq_lease_file(store: &dyn ConfigStore) -> Option<PathBuf> {
    let package = store.load("dhcp")?;
    let leasefile = package.first_of_type("dnsmasq")?.get("leasefile")?;
    Some(PathBuf::from(leasefile))
}

/// IPv4 rows of a dnsmasq lease file.
pub fn parse_dnsmasq_leases(content: &str, now: i64) -> Vec<Lease> {
    content
        .lines()
        .filter_map(|line| {
            let [ts, mac, addr, name] = Fields::whitespace(line).require::<4>()?;
            if addr.contains(':') {
                return None;
            }
            Some(Lease {
                expires: leading_int(ts).saturating_sub(now),
                macaddr: mac.to_string(),
                ipaddr: addr.to_string(),
                hostname: unless(name, "*"),
            })
        })
        .collect()
}

/// IPv6 rows of a dnsmasq lease file.
pub fn parse_dnsmasq_leases6(content: &str, now: i64) -> Vec<Lease6> {
    content
        .lines()
        .filter_map(|line| {
            let [ts, mac, addr, name, duid] = Fields::whitespace(line).require::<5>()?;
            if !addr.contains(':') {
                return None;
            }
            Some(Lease6 {
                expires: leading_int(ts).saturating_sub(now),
                duid: unless(duid, "*"),
                macaddr: Some(mac.to_string()),
                ip6addr: addr.to_string(),
                hostname: unless(name, "*"),
            })
        })
        .collect()
}

/// Lease lines of the relay daemon host file.
pub fn parse_relay_leases6(content: &str, now: i64) -> Vec<Lease6> {
    content
        .lines()
        .filter_map(|line| {
            let body = line.strip_prefix("# ")?;
            let [_iface, duid, _iaid, name, ts, _id, _length, addr] =
                Fields::whitespace(body).require::<8>()?;
            Some(Lease6 {
                expires: leading_int(ts).saturating_sub(now),
                duid: Some(duid.to_string()),
                macaddr: None,
                ip6addr: addr.to_string(),
                hostname: unless(name, "-"),
            })
        })
        .collect()
}

fn read_lossy(mut file: File) -> String {
    let mut content = Vec::new();
    if let Err(e) = file.read_to_end(&mut content) {
        debug!(error = %e, "lease file read stopped early");
    }
    String::from_utf8_lossy(&content).into_owned()
}

fn open_soft(path: &Path) -> Option<File> {
    match File::open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "lease source unavailable");
            None
        }
    }
}

/// Current IPv4 leases; empty when no lease file is configured or readable.
pub fn collect_leases(store: &dyn ConfigStore, now: i64) -> Vec<Lease> {
    dnsmasq_lease_file(store)
        .and_then(|path| open_soft(&path))
        .map(|file| parse_dnsmasq_leases(&read_lossy(file), now))
        .unwrap_or_default()
}

/// Current IPv6 leases, relay file first.
pub fn collect_leases6(relay_hosts: &Path, store: &dyn ConfigStore, now: i64) -> Vec<Lease6> {
    if let Some(file) = open_soft(relay_hosts) {
        return parse_relay_leases6(&read_lossy(file), now);
    }

    dnsmasq_lease_file(store)
        .and_then(|path| open_soft(&path))
        .map(|file| parse_dnsmasq_leases6(&read_lossy(file), now))
        .unwrap_or_default()
}
