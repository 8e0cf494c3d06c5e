//! 에러 타입 — 도메인별 에러 정의

/// Ocsforge 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum OcsforgeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 엔진/파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 배치 워커 태스크 실패
    #[error("batch task failed: {0}")]
    Task(String),
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 지원하지 않는 형식
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// 파싱 실패
    #[error("parse failed: {reason}")]
    Failed { reason: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// 스토리지(싱크) 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 파티션 쓰기 실패
    #[error("write failed: {path}: {reason}")]
    Write { path: String, reason: String },
}
