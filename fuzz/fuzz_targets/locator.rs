#![no_main]

use libfuzzer_sys::fuzz_target;
use ocsforge_core::types::UserDefinedValues;
use ocsforge_transform::DotLocator;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // 입력 앞부분은 로케이터, 나머지는 이벤트 JSON으로 사용
    let (locator_part, event_part) = match input.split_once('\n') {
        Some(parts) => parts,
        None => (input, "{}"),
    };

    let Ok(Some(locator)) = DotLocator::parse(locator_part) else {
        return;
    };

    let event: serde_json::Value = match serde_json::from_str(event_part) {
        Ok(value) => value,
        Err(_) => serde_json::json!({}),
    };

    let user_defined = UserDefinedValues::new().with("account_id", "123456789012");
    let _ = locator.locate(&event, &user_defined);
});
