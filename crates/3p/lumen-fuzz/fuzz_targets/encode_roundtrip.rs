#![no_main]

use libfuzzer_sys::fuzz_target;
use lumen_fuzz::GeometryCase;

fuzz_target!(|case: GeometryCase| {
    lumen_fuzz::check_roundtrip(&case);
});
