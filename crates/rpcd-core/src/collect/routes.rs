//! Kernel routing tables.
//!
//! `/proc/net/route` prints IPv4 addresses and masks as the raw `s_addr`
//! word in host byte order (`0100007F` is 127.0.0.1 on little-endian).
//! `/proc/net/ipv6_route` prints 32 hex digits in network order and hex
//! prefix lengths.

use super::fields::{leading_u32, Fields};
use rpcd_common::{Error, Result};
use serde::Serialize;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use tracing::{debug, trace};

/// Route usable flag.
pub const RTF_UP: u32 = 0x1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Destination in CIDR notation.
    pub target: String,
    pub nexthop: String,
    pub metric: u32,
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route6Entry {
    pub target: String,
    pub source: String,
    pub nexthop: String,
    pub metric: u32,
    pub device: String,
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn hex_u32(s: &str) -> Option<u32> {
    if !is_hex(s) {
        return None;
    }
    u32::from_str_radix(s, 16).ok()
}

/// Address from a host-order hex `s_addr` word.
pub fn hex_to_ipv4(s: &str) -> Option<Ipv4Addr> {
    hex_u32(s).map(|word| Ipv4Addr::from(word.to_ne_bytes()))
}

/// Prefix length of a host-order hex netmask: contiguous leading one bits.
pub fn hex_mask_to_prefix(s: &str) -> Option<u32> {
    hex_u32(s).map(|word| u32::from_be(word).leading_ones())
}

/// Address from 32 hex digits in network order.
pub fn hex_to_ipv6(s: &str) -> Option<Ipv6Addr> {
    if s.len() != 32 || !is_hex(s) {
        return None;
    }
    u128::from_str_radix(s, 16).ok().map(Ipv6Addr::from)
}

fn cidr6(addr: &str, plen: &str) -> Option<String> {
    Some(format!("{}/{}", hex_to_ipv6(addr)?, hex_u32(plen)?))
}

/// Parse `/proc/net/route` content. The first line is the header.
pub fn parse_route_table(content: &str) -> Vec<RouteEntry> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let [iface, dst, gateway, _flags, _refcnt, _use, metric, mask] =
                Fields::split(line, &['\t', ' ']).require::<8>()?;
            let entry = RouteEntry {
                target: format!("{}/{}", hex_to_ipv4(dst)?, hex_mask_to_prefix(mask)?),
                nexthop: hex_to_ipv4(gateway)?.to_string(),
                metric: leading_u32(metric),
                device: iface.to_string(),
            };
            Some(entry)
        })
        .collect()
}

/// Parse `/proc/net/ipv6_route` content, keeping only routes that are up.
pub fn parse_route6_table(content: &str) -> Vec<Route6Entry> {
    content
        .lines()
        .filter_map(|line| {
            let [dst, dst_plen, src, src_plen, nexthop, metric, _refcnt, _use, flags, device] =
                Fields::whitespace(line).require::<10>()?;
            if hex_u32(flags)? & RTF_UP == 0 {
                trace!(device, "skipping route that is not up");
                return None;
            }
            Some(Route6Entry {
                target: cidr6(dst, dst_plen)?,
                source: cidr6(src, src_plen)?,
                nexthop: hex_to_ipv6(nexthop)?.to_string(),
                metric: hex_u32(metric)?,
                device: device.to_string(),
            })
        })
        .collect()
}

fn read_table(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn read_routes(path: &Path) -> Result<Vec<RouteEntry>> {
    let routes = parse_route_table(&read_table(path)?);
    debug!(count = routes.len(), "ipv4 routes parsed");
    Ok(routes)
}

pub fn read_routes6(path: &Path) -> Result<Vec<Route6Entry>> {
    let routes = parse_route6_table(&read_table(path)?);
    debug!(count = routes.len(), "ipv6 routes parsed");
    Ok(routes)
}
