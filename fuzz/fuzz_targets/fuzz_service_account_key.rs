#![no_main]

use libfuzzer_sys::fuzz_target;
use playstore_core::ServiceAccountKey;

fuzz_target!(|data: &[u8]| {
    // Key parsing must reject garbage with an error, never a panic.
    let _ = ServiceAccountKey::from_slice(data);
});
