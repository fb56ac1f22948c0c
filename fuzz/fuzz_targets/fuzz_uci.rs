//! Fuzz target for UCI package parsing.
//!
//! Malformed lines are skipped, never fatal.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpcd_config::Package;

fuzz_target!(|data: &str| {
    let package = Package::parse(data);
    for section in package.sections() {
        let _ = section.get("log_type");
    }
});
