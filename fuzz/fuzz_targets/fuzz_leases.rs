//! Fuzz target for dnsmasq and relay lease file parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpcd_core::collect::leases::{
    parse_dnsmasq_leases, parse_dnsmasq_leases6, parse_relay_leases6,
};

fuzz_target!(|data: &str| {
    for lease in parse_dnsmasq_leases(data, 1_700_000_000) {
        assert!(!lease.ipaddr.contains(':'));
    }
    for lease in parse_dnsmasq_leases6(data, 1_700_000_000) {
        assert!(lease.ip6addr.contains(':'));
    }
    let _ = parse_relay_leases6(data, i64::MIN);
});
