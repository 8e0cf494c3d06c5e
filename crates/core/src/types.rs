//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 변환 엔진과 싱크가 주고받는 데이터 구조를 정의합니다.
//! 이벤트 본문은 `serde_json::Value`로 표현하며, 변환 결과와
//! 언매핑 사유는 여기서 정의한 타입으로 교환합니다.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 변환 성공 레코드
///
/// 하나의 소스 이벤트를 OCSF 스키마로 변환한 결과입니다.
/// 생성 이후 불변이며, 파티션 키(`event_day`)로 싱크에서 그룹핑됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedRecord {
    /// 로그 소스 이름 (설정 레지스트리의 `name`)
    pub source: String,
    /// 대상 OCSF 스키마 이름 (예: "process_activity")
    pub target_schema: String,
    /// 변환된 필드 트리
    pub target_mapping: Value,
    /// 일 단위 파티션 키 (`YYYYMMDD`, 8자리)
    pub event_day: String,
}

impl fmt::Display for TransformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (day={})",
            self.source, self.target_schema, self.event_day,
        )
    }
}

/// 이벤트가 매핑되지 못한 사유
///
/// 배치 결과의 unmapped 버킷에 담기며, 모니터링 카운트 레이블로도 사용됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedReason {
    /// 소스에 대한 매핑 문서가 로드되지 않음
    NoSourceConfig,
    /// 스트림 페이로드에서 소스를 판별하지 못함
    NoSourceDetected,
    /// 페이로드 디코딩 실패 (UTF-8/JSON)
    DecodeFailed { reason: String },
    /// 전처리기 실패
    PreprocessFailed { reason: String },
    /// 타임스탬프 필드를 찾지 못함
    TimestampMissing { locator: String },
    /// 타임스탬프 파싱 실패
    TimestampUnparseable { value: String, reason: String },
    /// 판별자 필드를 찾지 못함
    DiscriminantMissing { locator: String },
    /// 판별자 값에 해당하는 매핑 항목 없음
    NoMappingForType { matched_value: String },
}

impl UnmappedReason {
    /// 메트릭 레이블용 짧은 식별자를 반환합니다.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoSourceConfig => "no_source_config",
            Self::NoSourceDetected => "no_source_detected",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::PreprocessFailed { .. } => "preprocess_failed",
            Self::TimestampMissing { .. } => "timestamp_missing",
            Self::TimestampUnparseable { .. } => "timestamp_unparseable",
            Self::DiscriminantMissing { .. } => "discriminant_missing",
            Self::NoMappingForType { .. } => "no_mapping_for_type",
        }
    }
}

impl fmt::Display for UnmappedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSourceConfig => write!(f, "no configuration for source"),
            Self::NoSourceDetected => write!(f, "source could not be determined"),
            Self::DecodeFailed { reason } => write!(f, "decode failed: {reason}"),
            Self::PreprocessFailed { reason } => write!(f, "preprocess failed: {reason}"),
            Self::TimestampMissing { locator } => {
                write!(f, "timestamp missing: {locator}")
            }
            Self::TimestampUnparseable { value, reason } => {
                write!(f, "timestamp unparseable: '{value}': {reason}")
            }
            Self::DiscriminantMissing { locator } => {
                write!(f, "discriminant missing: {locator}")
            }
            Self::NoMappingForType { matched_value } => {
                write!(f, "no mapping for discriminant '{matched_value}'")
            }
        }
    }
}

/// 매핑되지 못한 이벤트
///
/// 정규화 출력 경로에서는 제외되지만, 감사/드롭 처리를 위해
/// 원본 페이로드와 사유를 보존합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedRecord {
    /// 소스 이름 (판별 전에 실패한 경우 None)
    pub source: Option<String>,
    /// 매핑 실패 사유
    pub reason: UnmappedReason,
    /// 디코딩된 원본 페이로드 (디코딩 실패 시 원시 문자열 래핑)
    pub payload: Value,
}

impl fmt::Display for UnmappedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unmapped [{}]: {}",
            self.source.as_deref().unwrap_or("unknown"),
            self.reason,
        )
    }
}

/// 배치 싱크 파티션 키
///
/// 멀티 스키마 소스는 `(source, schema, event_day)`, 단일 스키마 소스는
/// `(source, event_day)`로 그룹핑됩니다 (`schema`가 None).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    /// 로그 소스 이름
    pub source: String,
    /// 대상 스키마 (단일 스키마 소스는 None)
    pub schema: Option<String>,
    /// 일 단위 파티션 키
    pub event_day: String,
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}/{}/eventDay={}", self.source, schema, self.event_day),
            None => write!(f, "{}/eventDay={}", self.source, self.event_day),
        }
    }
}

/// 배포 환경에서 주입되는 사이드 채널 값
///
/// `$.UserDefined.<key>` 로케이터로 참조됩니다. 이벤트 본문과 별개이며,
/// 프로세스 시작 시 한 번 구성되어 읽기 전용으로 공유됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDefinedValues {
    values: HashMap<String, String>,
}

impl UserDefinedValues {
    /// 빈 값 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키-값 쌍 목록으로부터 생성합니다.
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 값을 추가합니다 (빌더 스타일).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 키에 해당하는 값을 조회합니다.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 등록된 키 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 값이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
