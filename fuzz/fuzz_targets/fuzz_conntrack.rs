//! Fuzz target for /proc/net/nf_conntrack parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpcd_core::collect::conntrack::parse_conntrack_table;

fuzz_target!(|data: &str| {
    for entry in parse_conntrack_table(data) {
        // Only the first counter pair can land in rx.
        assert!(entry.tx_packets.is_none() || entry.rx_packets.is_some());
    }
});
