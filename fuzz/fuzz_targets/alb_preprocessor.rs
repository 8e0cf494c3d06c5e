#![no_main]

use libfuzzer_sys::fuzz_target;
use ocsforge_core::pipeline::{DecodedInput, Preprocessor};
use ocsforge_transform::AlbPreprocessor;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let _ = AlbPreprocessor.preprocess(DecodedInput::Raw(line.to_owned()));
    }
});
