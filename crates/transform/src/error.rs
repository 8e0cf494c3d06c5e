//! 변환 엔진 에러 타입
//!
//! [`TransformError`]는 변환 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<TransformError> for OcsforgeError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use ocsforge_core::error::{OcsforgeError, PipelineError};

/// 변환 엔진 도메인 에러
///
/// 레지스트리/매핑 문서 로딩, 로케이터 해소, 타임스탬프 정규화 등
/// 엔진 내부의 모든 에러 상황을 포괄합니다. 로드 타임 에러는 프로세스
/// 시작을 중단시키고, 이벤트/필드 단위 에러는 호출자가 언매핑 버킷 또는
/// 필드 진단으로 흡수합니다.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// 소스 레지스트리 로딩/파싱 실패
    #[error("registry error: {path}: {reason}")]
    Registry {
        /// 레지스트리 문서 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 매핑 문서 로딩 실패
    #[error("mapping load error: {path}: {reason}")]
    MappingLoad {
        /// 매핑 문서 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 매핑 문서 유효성 검증 실패
    #[error("mapping validation error: source '{source_name}': {reason}")]
    MappingValidation {
        /// 문제가 된 소스 이름
        source_name: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 로케이터 구문 오류 (`$.` 접두어는 있으나 형식이 잘못됨)
    #[error("malformed locator '{locator}': {reason}")]
    MalformedLocator {
        /// 원본 로케이터 문자열
        locator: String,
        /// 실패 사유
        reason: String,
    },

    /// 사이드 채널 값 조회 실패 (UserDefined 키 없음)
    #[error("user-defined value not found: '{key}'")]
    UserDefinedLookup {
        /// 조회에 실패한 키
        key: String,
    },

    /// 타임스탬프 파싱 실패
    #[error("timestamp error: '{value}' with format '{format}': {reason}")]
    Timestamp {
        /// 원본 타임스탬프 문자열
        value: String,
        /// 설정된 형식 문자열
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<TransformError> for OcsforgeError {
    fn from(err: TransformError) -> Self {
        OcsforgeError::Pipeline(PipelineError::InitFailed(err.to_string()))
    }
}
