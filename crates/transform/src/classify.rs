//! 소스 판별과 이벤트 분류
//!
//! 두 단계의 분류가 있습니다:
//! 1. **소스 판별** ([`SourceDetector`]): 인바운드 레코드가 어느 소스
//!    설정에 속하는지 결정합니다. 스토리지 레코드는 버킷/키 패턴,
//!    스트림 레코드는 메타데이터 필드를 검사합니다. 소스는 설정 순서대로
//!    평가되며 첫 번째로 만족하는 소스가 선택됩니다.
//! 2. **이벤트 분류** ([`classify`]): 소스가 정해진 뒤, 매핑 문서의
//!    판별자 로케이터를 해소하여 어떤 매핑 항목이 적용되는지 결정합니다.
//!    판별자 비교는 정확히 일치만 지원합니다.

use regex::Regex;
use serde_json::Value;

use ocsforge_core::types::UserDefinedValues;

use crate::config::SourceSpec;
use crate::error::TransformError;
use crate::mapping::MappingDocument;

/// 스트림 페이로드에서 중첩 메타데이터를 담는 키
const METADATA_KEY: &str = "metadata";

/// 소스 판별기
///
/// 레지스트리 로드 시 한 번 구성됩니다. 키 패턴은 이때 정규식으로
/// 컴파일되어 레코드마다 재컴파일 오버헤드가 없습니다.
pub struct SourceDetector {
    /// 스토리지 키 규칙 (설정 순서)
    storage_rules: Vec<StorageRule>,
    /// 스트림 메타데이터 규칙 (설정 순서)
    stream_rules: Vec<StreamRule>,
}

struct StorageRule {
    source: String,
    bucket: String,
    pattern: Regex,
}

struct StreamRule {
    source: String,
    metadata_field: String,
}

impl SourceDetector {
    /// 소스 목록에서 판별기를 구성합니다.
    ///
    /// 설정 순서가 보존됩니다 -- 같은 키에 매칭되는 소스가 여럿이면
    /// 먼저 선언된 소스가 선택됩니다.
    pub fn from_sources(sources: &[SourceSpec]) -> Result<Self, TransformError> {
        let mut storage_rules = Vec::new();
        let mut stream_rules = Vec::new();

        for source in sources {
            if let Some(storage) = &source.inputs.storage {
                if storage.enabled {
                    for rule in &storage.buckets {
                        storage_rules.push(StorageRule {
                            source: source.name.clone(),
                            bucket: rule.bucket.clone(),
                            pattern: compile_prefix_pattern(&rule.prefix)?,
                        });
                    }
                }
            }

            if let Some(stream) = &source.inputs.stream {
                if stream.enabled {
                    stream_rules.push(StreamRule {
                        source: source.name.clone(),
                        metadata_field: stream.metadata_field.clone(),
                    });
                }
            }
        }

        Ok(Self {
            storage_rules,
            stream_rules,
        })
    }

    /// 스토리지 버킷/키로 소스를 판별합니다.
    ///
    /// 어느 규칙에도 매칭되지 않으면 None -- 레코드는 어떤 소스에도
    /// 귀속될 수 없으므로 호출자가 unroutable로 처리합니다.
    pub fn detect_storage(&self, bucket: &str, key: &str) -> Option<&str> {
        for rule in &self.storage_rules {
            if rule.bucket == bucket && rule.pattern.is_match(key) {
                tracing::debug!(source = %rule.source, key, "detected source from storage key");
                return Some(&rule.source);
            }
        }
        tracing::warn!(bucket, key, "no source detected for storage key");
        None
    }

    /// 스트림 페이로드의 메타데이터 필드로 소스를 판별합니다.
    ///
    /// 필드는 페이로드 최상위 또는 `metadata` 키 아래에서 검사됩니다.
    pub fn detect_stream(&self, payload: &Value) -> Option<&str> {
        for rule in &self.stream_rules {
            let top_level = payload.get(&rule.metadata_field).and_then(Value::as_str);
            let nested = payload
                .get(METADATA_KEY)
                .and_then(|m| m.get(&rule.metadata_field))
                .and_then(Value::as_str);

            if top_level == Some(rule.source.as_str()) || nested == Some(rule.source.as_str()) {
                tracing::debug!(source = %rule.source, "detected source from stream metadata");
                return Some(&rule.source);
            }
        }
        tracing::warn!("no source detected for stream payload");
        None
    }

    /// 컴파일된 스토리지 규칙 수를 반환합니다.
    pub fn storage_rule_count(&self) -> usize {
        self.storage_rules.len()
    }

    /// 스트림 규칙 수를 반환합니다.
    pub fn stream_rule_count(&self) -> usize {
        self.stream_rules.len()
    }
}

/// 키 접두어 패턴을 양끝이 고정된 정규식으로 컴파일합니다.
///
/// `*`는 임의 문자열에 매칭되고, 나머지 문자는 리터럴로 취급됩니다.
fn compile_prefix_pattern(prefix: &str) -> Result<Regex, TransformError> {
    let escaped: Vec<String> = prefix.split('*').map(|part| regex::escape(part)).collect();
    let pattern = format!("^{}$", escaped.join(".*"));
    Ok(Regex::new(&pattern)?)
}

/// 이벤트의 판별자 값을 해소합니다.
///
/// 판별자 로케이터가 해소되지 않거나 빈 문자열이면 None --
/// 호출자는 이벤트를 언매핑 처리합니다.
pub fn classify(
    event: &Value,
    document: &MappingDocument,
    user_defined: &UserDefinedValues,
) -> Option<String> {
    match document.matched_field.locate(event, user_defined) {
        Ok(Some(value)) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "failed to resolve discriminant field");
            None
        }
    }
}
