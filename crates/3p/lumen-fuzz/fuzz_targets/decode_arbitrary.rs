#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    lumen_fuzz::exercise_decoder(data);
});
