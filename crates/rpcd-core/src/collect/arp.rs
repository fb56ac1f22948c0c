//! Neighbour table from `/proc/net/arp`.
//!
//! ```text
//! IP address       HW type     Flags       HW address            Mask     Device
//! 192.168.1.10     0x1         0x2         00:11:22:33:44:55     *        br-lan
//! ```

use super::fields::Fields;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArpEntry {
    pub ipaddr: String,
    pub macaddr: String,
    pub device: String,
}

/// Parse table content. The first line is always the header.
pub fn parse_arp_table(content: &str) -> Vec<ArpEntry> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let [ip, _hw_type, _flags, mac, _mask, device] =
                Fields::whitespace(line).require::<6>()?;
            Some(ArpEntry {
                ipaddr: ip.to_string(),
                macaddr: mac.to_string(),
                device: device.to_string(),
            })
        })
        .collect()
}

/// The ARP table; empty when the proc file is absent.
pub fn read_arp_table(path: &Path) -> Vec<ArpEntry> {
    match std::fs::read(path) {
        Ok(bytes) => parse_arp_table(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "arp table unavailable");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arp_table() {
        let content = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.10     0x1         0x2         00:11:22:33:44:55     *        br-lan
10.0.0.1         0x1         0x2         66:77:88:99:aa:bb     *        eth0.2
192.168.1.99     0x1         0x0         00:00:00:00:00:00     *
";
        let entries = parse_arp_table(content);
        assert_eq!(
            entries,
            vec![
                ArpEntry {
                    ipaddr: "192.168.1.10".into(),
                    macaddr: "00:11:22:33:44:55".into(),
                    device: "br-lan".into(),
                },
                ArpEntry {
                    ipaddr: "10.0.0.1".into(),
                    macaddr: "66:77:88:99:aa:bb".into(),
                    device: "eth0.2".into(),
                },
            ]
        );
    }

    #[test]
    fn test_header_only_and_missing() {
        assert!(parse_arp_table("IP address HW type Flags HW address Mask Device\n").is_empty());
        assert!(read_arp_table(Path::new("/nonexistent/arp")).is_empty());
    }
}
