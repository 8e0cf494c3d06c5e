//! 필드 로케이터 -- `$.` 점 표기 경로 해소
//!
//! 로케이터는 매핑 문서에서 `"$.a.b.c"` 형태의 문자열로 선언되며,
//! 이벤트 본문의 중첩 경로 또는 사이드 채널 값(`$.UserDefined.<key>`)을
//! 참조합니다. 로드 타임에 [`DotLocator`]로 한 번 파싱되고, 이벤트마다
//! 캐시 없이 처음부터 해소됩니다 (경로는 짧고 이벤트는 작습니다).

use std::fmt;

use serde_json::Value;

use ocsforge_core::types::UserDefinedValues;

use crate::error::TransformError;

/// 로케이터 접두어
const LOCATOR_PREFIX: &str = "$.";

/// 사이드 채널 참조를 나타내는 예약어
const USER_DEFINED_SEGMENT: &str = "UserDefined";

/// 파싱된 점 표기 로케이터
///
/// 이벤트 경로 또는 사이드 채널 키 중 하나를 가리킵니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotLocator {
    /// 이벤트 본문의 중첩 경로 (`$.a.b.c` -> `["a", "b", "c"]`)
    Event(Vec<String>),
    /// 사이드 채널 값 참조 (`$.UserDefined.account_id` -> `"account_id"`)
    UserDefined(String),
}

impl DotLocator {
    /// 문자열을 로케이터로 파싱합니다.
    ///
    /// - `$.` 접두어가 없으면 `Ok(None)` -- 호출자는 리터럴로 취급합니다.
    /// - 접두어는 있으나 형식이 잘못된 경우(`$.UserDefined`에 키 누락)는
    ///   로드 타임 에러입니다.
    pub fn parse(raw: &str) -> Result<Option<Self>, TransformError> {
        let Some(rest) = raw.strip_prefix(LOCATOR_PREFIX) else {
            return Ok(None);
        };

        let segments: Vec<&str> = rest.split('.').collect();

        if segments[0] == USER_DEFINED_SEGMENT {
            // 두 번째 세그먼트가 키. 이후 세그먼트는 무시됩니다.
            let Some(key) = segments.get(1).filter(|k| !k.is_empty()) else {
                return Err(TransformError::MalformedLocator {
                    locator: raw.to_owned(),
                    reason: "UserDefined locator requires a key segment".to_owned(),
                });
            };
            return Ok(Some(Self::UserDefined((*key).to_owned())));
        }

        Ok(Some(Self::Event(
            segments.into_iter().map(str::to_owned).collect(),
        )))
    }

    /// 로케이터를 이벤트와 사이드 채널 값에 대해 해소합니다.
    ///
    /// - 이벤트 경로: 세그먼트를 순서대로 내려가며, 중간 세그먼트가 없거나
    ///   현재 값이 객체가 아니면 `Ok(None)` (이벤트 변형에 필드가 없는
    ///   경우를 모델링하는 soft-fail).
    /// - 사이드 채널: 키가 없으면 하드 에러.
    /// - 성공 시 말단 값은 문자열로 변환됩니다. 숫자/불리언은 표기 그대로,
    ///   컨테이너는 정규 JSON 문자열 형태로 직렬화됩니다.
    pub fn locate(
        &self,
        event: &Value,
        user_defined: &UserDefinedValues,
    ) -> Result<Option<String>, TransformError> {
        match self {
            Self::UserDefined(key) => match user_defined.get(key) {
                Some(value) => Ok(Some(value.to_owned())),
                None => Err(TransformError::UserDefinedLookup { key: key.clone() }),
            },
            Self::Event(segments) => {
                let mut current = event;
                for segment in segments {
                    match current.get(segment) {
                        Some(Value::Null) | None => return Ok(None),
                        Some(next) => current = next,
                    }
                }
                Ok(Some(stringify(current)))
            }
        }
    }
}

impl fmt::Display for DotLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(segments) => write!(f, "$.{}", segments.join(".")),
            Self::UserDefined(key) => write!(f, "$.{USER_DEFINED_SEGMENT}.{key}"),
        }
    }
}

/// JSON 값을 로케이터 출력 문자열로 변환합니다.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // 컨테이너는 정규 JSON 문자열 형태. enum 판별자 비교에서는
        // 어떤 키와도 일치하지 않으므로 사실상 "absent"로 동작합니다.
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_user_defined() -> UserDefinedValues {
        UserDefinedValues::new()
    }

    #[test]
    fn parse_event_locator() {
        let locator = DotLocator::parse("$.a.b.c").unwrap().unwrap();
        assert_eq!(
            locator,
            DotLocator::Event(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])
        );
    }

    #[test]
    fn parse_user_defined_locator() {
        let locator = DotLocator::parse("$.UserDefined.account_id").unwrap().unwrap();
        assert_eq!(locator, DotLocator::UserDefined("account_id".to_owned()));
    }

    #[test]
    fn parse_user_defined_ignores_extra_segments() {
        let locator = DotLocator::parse("$.UserDefined.region.extra").unwrap().unwrap();
        assert_eq!(locator, DotLocator::UserDefined("region".to_owned()));
    }

    #[test]
    fn parse_non_locator_returns_none() {
        assert!(DotLocator::parse("plain literal").unwrap().is_none());
        assert!(DotLocator::parse("process_activity").unwrap().is_none());
        assert!(DotLocator::parse("").unwrap().is_none());
    }

    #[test]
    fn parse_user_defined_without_key_fails() {
        assert!(DotLocator::parse("$.UserDefined").is_err());
        assert!(DotLocator::parse("$.UserDefined.").is_err());
    }

    #[test]
    fn locate_nested_scalar() {
        let event = json!({"a": {"b": 5}});
        let locator = DotLocator::parse("$.a.b").unwrap().unwrap();
        let value = locator.locate(&event, &no_user_defined()).unwrap();
        assert_eq!(value, Some("5".to_owned()));
    }

    #[test]
    fn locate_string_is_verbatim() {
        let event = json!({"Description": {"Image": "C:\\Windows\\explorer.exe"}});
        let locator = DotLocator::parse("$.Description.Image").unwrap().unwrap();
        let value = locator.locate(&event, &no_user_defined()).unwrap();
        assert_eq!(value, Some("C:\\Windows\\explorer.exe".to_owned()));
    }

    #[test]
    fn locate_bool_stringified() {
        let event = json!({"flags": {"secure": true}});
        let locator = DotLocator::parse("$.flags.secure").unwrap().unwrap();
        assert_eq!(
            locator.locate(&event, &no_user_defined()).unwrap(),
            Some("true".to_owned())
        );
    }

    #[test]
    fn locate_missing_path_is_soft_null() {
        let event = json!({"a": {"b": 5}});
        let locator = DotLocator::parse("$.a.x.y").unwrap().unwrap();
        assert_eq!(locator.locate(&event, &no_user_defined()).unwrap(), None);
    }

    #[test]
    fn locate_through_scalar_is_soft_null() {
        // 중간 세그먼트가 객체가 아닌 경우
        let event = json!({"a": 5});
        let locator = DotLocator::parse("$.a.b").unwrap().unwrap();
        assert_eq!(locator.locate(&event, &no_user_defined()).unwrap(), None);
    }

    #[test]
    fn locate_null_value_is_soft_null() {
        let event = json!({"a": null});
        let locator = DotLocator::parse("$.a").unwrap().unwrap();
        assert_eq!(locator.locate(&event, &no_user_defined()).unwrap(), None);
    }

    #[test]
    fn locate_container_stringifies_canonically() {
        let event = json!({"a": {"b": {"c": 1}}});
        let locator = DotLocator::parse("$.a.b").unwrap().unwrap();
        let value = locator.locate(&event, &no_user_defined()).unwrap();
        assert_eq!(value, Some(r#"{"c":1}"#.to_owned()));
    }

    #[test]
    fn locate_user_defined_value() {
        let event = json!({});
        let user_defined = UserDefinedValues::new().with("region", "eu-west-1");
        let locator = DotLocator::parse("$.UserDefined.region").unwrap().unwrap();
        assert_eq!(
            locator.locate(&event, &user_defined).unwrap(),
            Some("eu-west-1".to_owned())
        );
    }

    #[test]
    fn locate_user_defined_missing_is_hard_error() {
        let event = json!({});
        let locator = DotLocator::parse("$.UserDefined.account_id").unwrap().unwrap();
        let result = locator.locate(&event, &no_user_defined());
        assert!(matches!(
            result,
            Err(TransformError::UserDefinedLookup { .. })
        ));
    }

    #[test]
    fn locate_is_deterministic() {
        let event = json!({"a": {"b": [1, 2, 3]}});
        let locator = DotLocator::parse("$.a.b").unwrap().unwrap();
        let first = locator.locate(&event, &no_user_defined()).unwrap();
        let second = locator.locate(&event, &no_user_defined()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn display_roundtrip() {
        for raw in ["$.a.b.c", "$.UserDefined.account_id"] {
            let locator = DotLocator::parse(raw).unwrap().unwrap();
            assert_eq!(locator.to_string(), raw);
        }
    }
}
