#![no_main]

use libfuzzer_sys::fuzz_target;
use pgo_protocol::transport::relay;

fuzz_target!(|data: &[u8]| {
    // Relay bodies come from an untrusted hop
    let _ = relay::unwrap(data);
});
