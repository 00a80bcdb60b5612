#![no_main]

use libfuzzer_sys::fuzz_target;
use secure_transport::core::frame::{Frame, DEFAULT_MAX_CIPHERTEXT_LEN};

fuzz_target!(|data: &[u8]| {
    // Fuzz frame parsing - test for panics, crashes, over-allocation
    let _ = Frame::from_slice(data, DEFAULT_MAX_CIPHERTEXT_LEN);
});
