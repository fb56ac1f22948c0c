//! Fuzz target for /proc/net/route and /proc/net/ipv6_route parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpcd_core::collect::routes::{parse_route6_table, parse_route_table};

fuzz_target!(|data: &str| {
    for route in parse_route_table(data) {
        assert!(route.target.contains('/'));
    }
    let _ = parse_route6_table(data);
});
