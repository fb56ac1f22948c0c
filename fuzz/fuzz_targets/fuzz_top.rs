//! Fuzz target for busybox `top -bn1` output parsing.
//!
//! The STAT column is sliced by byte offset, so multi-byte input is the
//! interesting case here.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpcd_core::collect::process::parse_top_output;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    for record in parse_top_output(&text) {
        assert!(!record.stat.is_empty());
        assert!(!record.command.is_empty());
    }
});
