#![no_main]

use libfuzzer_sys::fuzz_target;
use secure_transport::{RequestEnvelope, WireFormat};

fuzz_target!(|data: &[u8]| {
    // Fuzz payload decoding in both wire formats - decode must fail cleanly
    let _ = WireFormat::Json.decode::<RequestEnvelope>(data);
    let _ = WireFormat::MessagePack.decode::<RequestEnvelope>(data);
});
