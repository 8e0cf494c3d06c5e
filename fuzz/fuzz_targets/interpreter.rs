#![no_main]

use libfuzzer_sys::fuzz_target;
use ocsforge_core::types::UserDefinedValues;
use ocsforge_transform::{MappingNode, mapping::transform};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // 입력 앞부분은 매핑 명세, 나머지는 이벤트
    let Some((spec_part, event_part)) = input.split_once('\n') else {
        return;
    };

    let Ok(spec_raw) = serde_json::from_str::<serde_json::Value>(spec_part) else {
        return;
    };
    let Ok(mapping) = MappingNode::from_value(&spec_raw, "fuzz-source") else {
        return;
    };

    let event: serde_json::Value =
        serde_json::from_str(event_part).unwrap_or(serde_json::json!({}));

    let _ = transform(&mapping, &event, &UserDefinedValues::new());
});
