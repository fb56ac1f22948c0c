//! Fuzz target for request validation against every method schema.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpcd_core::payload::validate;
use rpcd_core::service::{NetworkService, Service, SystemService};

fuzz_target!(|data: &[u8]| {
    let Ok(params) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let system = SystemService::new();
    let network = NetworkService::new();
    let services: [&dyn Service; 2] = [&system, &network];
    for service in services {
        for def in service.methods() {
            let _ = validate(def.schema, &params);
        }
    }
});
