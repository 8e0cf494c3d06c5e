#![no_main]

use libfuzzer_sys::fuzz_target;
use ocsforge_transform::MappingDocument;

fuzz_target!(|data: &[u8]| {
    // 문서 파서는 &str을 받으므로 UTF-8 변환 필요
    if let Ok(json_str) = std::str::from_utf8(data) {
        let _ = MappingDocument::parse(json_str, "fuzz-source");
    }
});
