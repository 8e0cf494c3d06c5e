//! 전처리기 모듈 -- 소스별 와이어 형식을 이벤트 JSON으로 변환합니다.
//!
//! 전처리기는 시작 시 [`PreprocessorRegistry`]에 이름으로 등록되고,
//! 레지스트리 설정의 `preprocessor` 필드가 소스와 전처리기를 연결합니다.
//! 전처리기가 지정되지 않았거나 이름이 등록되어 있지 않은 소스는
//! 에러가 아니라 pass-through로 폴백합니다.
//!
//! # 내장 전처리기
//! - [`AlbPreprocessor`]: 로드밸런서 액세스 로그 한 줄 -> 구조화 JSON
//! - [`SysmonPreprocessor`]: Windows Sysmon `Description` 문자열 -> 중첩 객체
//! - [`PassthroughPreprocessor`]: JSON 파싱 시도, 실패 시 `rawData` 래핑

pub mod alb;
pub mod sysmon;

pub use alb::AlbPreprocessor;
pub use sysmon::SysmonPreprocessor;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};

use ocsforge_core::error::OcsforgeError;
use ocsforge_core::pipeline::{DecodedInput, Preprocessor};

/// pass-through 전처리기
///
/// 원시 텍스트는 JSON 파싱을 시도하고, 실패하면 `{"rawData": <line>}`로
/// 래핑합니다. 이미 디코딩된 JSON은 그대로 반환합니다.
pub struct PassthroughPreprocessor;

impl Preprocessor for PassthroughPreprocessor {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn preprocess(&self, input: DecodedInput) -> Result<Value, OcsforgeError> {
        match input {
            DecodedInput::Json(value) => Ok(value),
            DecodedInput::Raw(line) => match serde_json::from_str(&line) {
                Ok(value) => Ok(value),
                Err(_) => Ok(json!({ "rawData": line })),
            },
        }
    }
}

/// 전처리기 레지스트리
///
/// 시작 시 명시적 등록으로 채워지는 정적 레지스트리입니다.
/// 런타임 동적 로딩은 없습니다.
pub struct PreprocessorRegistry {
    preprocessors: HashMap<String, Arc<dyn Preprocessor>>,
    passthrough: Arc<dyn Preprocessor>,
}

impl PreprocessorRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            preprocessors: HashMap::new(),
            passthrough: Arc::new(PassthroughPreprocessor),
        }
    }

    /// 내장 전처리기 세트로 레지스트리를 생성합니다.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AlbPreprocessor));
        registry.register(Arc::new(SysmonPreprocessor));
        registry
    }

    /// 전처리기를 이름으로 등록합니다.
    pub fn register(&mut self, preprocessor: Arc<dyn Preprocessor>) {
        self.preprocessors
            .insert(preprocessor.name().to_owned(), preprocessor);
    }

    /// 이름으로 전처리기를 조회합니다. 없으면 pass-through를 반환합니다.
    pub fn resolve(&self, name: Option<&str>) -> Arc<dyn Preprocessor> {
        match name {
            Some(name) => match self.preprocessors.get(name) {
                Some(preprocessor) => Arc::clone(preprocessor),
                None => {
                    tracing::warn!(
                        preprocessor = name,
                        "preprocessor not registered, falling back to passthrough"
                    );
                    Arc::clone(&self.passthrough)
                }
            },
            None => Arc::clone(&self.passthrough),
        }
    }

    /// 등록된 전처리기 이름 목록을 반환합니다.
    pub fn registered_names(&self) -> Vec<&str> {
        self.preprocessors.keys().map(String::as_str).collect()
    }
}

impl Default for PreprocessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn passthrough_parses_json_line() {
        let result = PassthroughPreprocessor
            .preprocess(DecodedInput::Raw(r#"{"a": 1}"#.to_owned()))
            .unwrap();
        assert_eq!(result, json!({"a": 1}));
    }

    #[test]
    fn passthrough_wraps_non_json_line() {
        let result = PassthroughPreprocessor
            .preprocess(DecodedInput::Raw("plain text log".to_owned()))
            .unwrap();
        assert_eq!(result, json!({"rawData": "plain text log"}));
    }

    #[test]
    fn passthrough_keeps_decoded_json() {
        let value = json!({"nested": {"k": "v"}});
        let result = PassthroughPreprocessor
            .preprocess(DecodedInput::Json(value.clone()))
            .unwrap();
        assert_eq!(result, value);
    }

    #[test]
    fn registry_with_defaults_has_builtins() {
        let registry = PreprocessorRegistry::with_defaults();
        let names = registry.registered_names();
        assert!(names.contains(&"alb"));
        assert!(names.contains(&"sysmon"));
    }

    #[test]
    fn resolve_unknown_falls_back_to_passthrough() {
        let registry = PreprocessorRegistry::with_defaults();
        let preprocessor = registry.resolve(Some("nonexistent"));
        assert_eq!(preprocessor.name(), "passthrough");
    }

    #[test]
    fn resolve_none_is_passthrough() {
        let registry = PreprocessorRegistry::new();
        assert_eq!(registry.resolve(None).name(), "passthrough");
    }

    #[test]
    fn resolve_registered_by_name() {
        let registry = PreprocessorRegistry::with_defaults();
        assert_eq!(registry.resolve(Some("alb")).name(), "alb");
    }
}
