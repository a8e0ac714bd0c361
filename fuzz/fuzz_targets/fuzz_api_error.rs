#![no_main]

use libfuzzer_sys::fuzz_target;
use playstore_core::ApiError;

fuzz_target!(|input: (u16, &str)| {
    let (code, body) = input;
    let err = ApiError::from_response(code, body);
    let _ = err.to_string();
    let _ = err.reason();
});
