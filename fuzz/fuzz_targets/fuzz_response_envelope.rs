#![no_main]

use libfuzzer_sys::fuzz_target;
use pgo_protocol::core::messages::ResponseEnvelope;
use pgo_protocol::protocol::{envelope, status};
use prost::Message;

fuzz_target!(|data: &[u8]| {
    // Decode, classify and walk every reply slot; none of it may panic
    if let Ok(response) = ResponseEnvelope::decode(data) {
        let _ = status::classify(response.status_code);
        for index in 0..=response.returns.len() {
            let _ = envelope::reply_slot(&response, index);
        }
        let _ = status::accept(response);
    }
});
