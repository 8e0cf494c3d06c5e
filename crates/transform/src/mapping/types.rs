//! 매핑 명세 데이터 타입
//!
//! 소스별 매핑 문서(JSON)에서 로드 타임에 한 번 구성되는 구조체들을
//! 정의합니다. 매핑 트리는 명시적 태그 variant([`MappingNode`])로
//! 표현되어, 인터프리터가 런타임 타입 검사 없이 닫힌 태그로 디스패치할
//! 수 있습니다. 구성 이후에는 프로세스 수명 동안 읽기 전용입니다.
//!
//! # 문서 스키마
//! ```json
//! {
//!   "custom_source_events": {
//!     "matched_field": "$.EventId",
//!     "timestamp": { "field": "$.Description.UtcTime", "format": "%Y-%m-%d %H:%M:%S%.f" },
//!     "ocsf_mapping": {
//!       "1": {
//!         "schema": "process_activity",
//!         "schema_mapping": {
//!           "activity_id": { "enum": { "evaluate": "$.EventId", "values": { "1": 1 }, "other": 99 } },
//!           "actor": { "process": { "name": "$.Description.Image" } },
//!           "metadata": { "product": { "name": "Microsoft Sysmon" } }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::TransformError;

use super::locator::DotLocator;

/// 매핑 트리 노드
///
/// 원시 JSON 문서를 검사하여 로드 타임에 한 번 구성됩니다:
/// `"enum"` 키를 가진 객체는 Enum, 그 외 객체는 Object,
/// `$.` 접두어 문자열은 Locator, 나머지는 Literal입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingNode {
    /// 대상 필드명 -> 자식 노드. 문서 순서와 무관하게 의미는 동일합니다.
    Object(Vec<(String, MappingNode)>),
    /// 출력에 그대로 복사되는 리터럴 값
    Literal(Value),
    /// 이벤트/사이드 채널 경로 참조
    Locator(DotLocator),
    /// 판별자 값 번역
    Enum(EnumSpec),
}

impl MappingNode {
    /// 원시 JSON 값에서 매핑 노드를 구성합니다.
    ///
    /// `source`는 에러 메시지용 소스 이름입니다.
    pub fn from_value(raw: &Value, source: &str) -> Result<Self, TransformError> {
        match raw {
            Value::Object(map) => {
                if let Some(enum_raw) = map.get("enum") {
                    return Ok(Self::Enum(EnumSpec::from_value(enum_raw, source)?));
                }
                let mut children = Vec::with_capacity(map.len());
                for (key, child) in map {
                    children.push((key.clone(), Self::from_value(child, source)?));
                }
                Ok(Self::Object(children))
            }
            Value::String(s) => match DotLocator::parse(s)? {
                Some(locator) => Ok(Self::Locator(locator)),
                None => Ok(Self::Literal(raw.clone())),
            },
            other => Ok(Self::Literal(other.clone())),
        }
    }
}

/// Enum 노드의 피연산자
///
/// 원문서에서 로케이터 문자열이면 [`DotLocator`]로, 그 외 값이면
/// 리터럴로 구성됩니다. 리터럴 피연산자의 평가 동작은 인터프리터의
/// 문서화된 에지 케이스를 따릅니다.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumOperand {
    /// 이벤트에서 해소할 로케이터
    Locator(DotLocator),
    /// 이미 알려진 리터럴 값
    Literal(Value),
}

/// Enum 노드 명세 -- 판별자 값 번역 테이블
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    /// 번역 입력을 결정하는 피연산자
    pub evaluate: EnumOperand,
    /// 판별자 값(문자열화) -> 출력 값
    pub values: HashMap<String, Value>,
    /// 테이블에 없는 값의 기본 출력
    pub other: Value,
}

impl EnumSpec {
    fn from_value(raw: &Value, source: &str) -> Result<Self, TransformError> {
        let Some(map) = raw.as_object() else {
            return Err(TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: "enum node must be an object".to_owned(),
            });
        };

        let evaluate_raw = map.get("evaluate").ok_or_else(|| {
            TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: "enum node missing 'evaluate'".to_owned(),
            }
        })?;
        let evaluate = match evaluate_raw {
            Value::String(s) => match DotLocator::parse(s)? {
                Some(locator) => EnumOperand::Locator(locator),
                None => EnumOperand::Literal(evaluate_raw.clone()),
            },
            other => EnumOperand::Literal(other.clone()),
        };

        let values_raw = map
            .get("values")
            .and_then(Value::as_object)
            .ok_or_else(|| TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: "enum node missing 'values' object".to_owned(),
            })?;
        let values = values_raw
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let other = map
            .get("other")
            .cloned()
            .ok_or_else(|| TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: "enum node missing 'other' default".to_owned(),
            })?;

        Ok(Self {
            evaluate,
            values,
            other,
        })
    }
}

/// 타임스탬프 추출 명세
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampSpec {
    /// 타임스탬프 필드 로케이터
    pub field: DotLocator,
    /// `"epoch"` 또는 strftime 패턴 문자열
    pub format: String,
}

/// 판별자 값 하나에 대한 매핑 항목
#[derive(Debug, Clone, PartialEq)]
pub struct EventMapping {
    /// 대상 OCSF 스키마 이름
    pub target_schema: String,
    /// 필드 매핑 트리 (루트는 항상 Object)
    pub schema_mapping: MappingNode,
}

/// 소스 하나의 매핑 문서
///
/// 로드 타임에 원시 JSON에서 구성되고, 이후 읽기 전용으로 공유됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDocument {
    /// 이벤트 타입 판별자 로케이터
    pub matched_field: DotLocator,
    /// 타임스탬프 추출 명세
    pub timestamp: TimestampSpec,
    /// 판별자 값 -> 매핑 항목 (정확히 일치 조회)
    pub mappings: HashMap<String, EventMapping>,
}

impl MappingDocument {
    /// JSON 문자열에서 매핑 문서를 파싱하고 구성합니다.
    ///
    /// 파싱/검증 실패는 프로세스 시작을 중단시키는 치명적 에러입니다.
    pub fn parse(json_str: &str, source: &str) -> Result<Self, TransformError> {
        let raw: RawMappingFile =
            serde_json::from_str(json_str).map_err(|e| TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: format!("JSON parse error: {e}"),
            })?;

        Self::from_raw(raw, source)
    }

    fn from_raw(raw: RawMappingFile, source: &str) -> Result<Self, TransformError> {
        let events = raw.custom_source_events;

        let matched_field = DotLocator::parse(&events.matched_field)?.ok_or_else(|| {
            TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: format!(
                    "matched_field '{}' is not a locator",
                    events.matched_field
                ),
            }
        })?;

        let timestamp_field = DotLocator::parse(&events.timestamp.field)?.ok_or_else(|| {
            TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: format!(
                    "timestamp field '{}' is not a locator",
                    events.timestamp.field
                ),
            }
        })?;

        if events.timestamp.format.is_empty() {
            return Err(TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: "timestamp format must not be empty".to_owned(),
            });
        }

        if events.ocsf_mapping.is_empty() {
            return Err(TransformError::MappingValidation {
                source_name: source.to_owned(),
                reason: "ocsf_mapping must not be empty".to_owned(),
            });
        }

        let mut mappings = HashMap::with_capacity(events.ocsf_mapping.len());
        for (discriminant, raw_mapping) in events.ocsf_mapping {
            if raw_mapping.schema.is_empty() {
                return Err(TransformError::MappingValidation {
                    source_name: source.to_owned(),
                    reason: format!("schema must not be empty for discriminant '{discriminant}'"),
                });
            }
            if !raw_mapping.schema_mapping.is_object() {
                return Err(TransformError::MappingValidation {
                    source_name: source.to_owned(),
                    reason: format!(
                        "schema_mapping must be an object for discriminant '{discriminant}'"
                    ),
                });
            }
            let schema_mapping = MappingNode::from_value(&raw_mapping.schema_mapping, source)?;
            mappings.insert(
                discriminant,
                EventMapping {
                    target_schema: raw_mapping.schema,
                    schema_mapping,
                },
            );
        }

        Ok(Self {
            matched_field,
            timestamp: TimestampSpec {
                field: timestamp_field,
                format: events.timestamp.format,
            },
            mappings,
        })
    }

    /// 매핑 테이블이 둘 이상의 서로 다른 대상 스키마를 가리키는지 확인합니다.
    ///
    /// 배치 싱크의 파티션 키 구성에 사용됩니다.
    pub fn is_multischema(&self) -> bool {
        let schemas: HashSet<&str> = self
            .mappings
            .values()
            .map(|m| m.target_schema.as_str())
            .collect();
        schemas.len() > 1
    }
}

// --- 원시 문서 역직렬화 구조 ---

#[derive(Debug, Deserialize)]
struct RawMappingFile {
    custom_source_events: RawCustomSourceEvents,
}

#[derive(Debug, Deserialize)]
struct RawCustomSourceEvents {
    matched_field: String,
    timestamp: RawTimestamp,
    ocsf_mapping: HashMap<String, RawEventMapping>,
}

#[derive(Debug, Deserialize)]
struct RawTimestamp {
    field: String,
    format: String,
}

#[derive(Debug, Deserialize)]
struct RawEventMapping {
    schema: String,
    schema_mapping: Value,
}
