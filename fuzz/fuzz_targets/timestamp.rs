#![no_main]

use libfuzzer_sys::fuzz_target;
use ocsforge_transform::timestamp::event_day;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let (value, format) = match input.split_once('\n') {
        Some(parts) => parts,
        None => (input, "epoch"),
    };

    let _ = event_day(value, format);
});
