//! Windows Sysmon 이벤트 전처리기
//!
//! Sysmon 텔레메트리의 `Description` 필드는 `키: 값` 줄들이 CRLF로
//! 이어진 문자열입니다. 이를 중첩 객체로 변환하여 로케이터가
//! `$.Description.Image` 형태로 접근할 수 있게 합니다.

use serde_json::{Map, Value};

use ocsforge_core::error::{OcsforgeError, ParseError};
use ocsforge_core::pipeline::{DecodedInput, Preprocessor};

/// 구조화 대상 필드명
const DESCRIPTION_KEY: &str = "Description";

/// `키: 값` 줄 구분자
const KV_DELIMITER: &str = ": ";

/// Windows Sysmon 이벤트 전처리기
pub struct SysmonPreprocessor;

impl SysmonPreprocessor {
    /// `Description` 문자열을 중첩 객체로 변환합니다.
    ///
    /// `Description`이 없거나 이미 구조화된 이벤트는 그대로 통과합니다.
    fn restructure(mut event: Value) -> Value {
        let Some(object) = event.as_object_mut() else {
            return event;
        };

        let Some(Value::String(description)) = object.get(DESCRIPTION_KEY) else {
            tracing::debug!("no Description field to preprocess, passing through");
            return event;
        };

        let mut data = Map::new();
        for line in description.split("\r\n") {
            match line.split_once(KV_DELIMITER) {
                Some((key, value)) => {
                    data.insert(key.to_owned(), Value::String(value.to_owned()));
                }
                None if !line.is_empty() => {
                    // 구분자가 없는 줄은 합성 키로 보존
                    data.insert(
                        format!("Line{}", data.len() + 1),
                        Value::String(line.to_owned()),
                    );
                }
                None => {}
            }
        }

        object.insert(DESCRIPTION_KEY.to_owned(), Value::Object(data));
        event
    }
}

impl Preprocessor for SysmonPreprocessor {
    fn name(&self) -> &str {
        "sysmon"
    }

    fn preprocess(&self, input: DecodedInput) -> Result<Value, OcsforgeError> {
        let value = match input {
            DecodedInput::Json(value) => value,
            DecodedInput::Raw(line) => {
                serde_json::from_str(&line).map_err(|e| {
                    OcsforgeError::Parse(ParseError::Failed {
                        reason: format!("sysmon event is not valid JSON: {e}"),
                    })
                })?
            }
        };
        Ok(Self::restructure(value))
    }
}
