#![no_main]

use libfuzzer_sys::fuzz_target;
use ocsforge_core::pipeline::{DecodedInput, Preprocessor};
use ocsforge_transform::SysmonPreprocessor;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let _ = SysmonPreprocessor.preprocess(DecodedInput::Raw(raw.to_owned()));
    }
});
