#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    valdiff_fuzz::fuzz_documents(data);
});
