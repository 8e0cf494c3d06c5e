//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 레이블 키를 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다. 익스포터 설치는
//! 임베딩하는 바이너리의 책임입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ocsforge_`
//! - 모듈명: `transform_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 소스 레이블 키
pub const LABEL_SOURCE: &str = "source";

/// 대상 스키마 레이블 키
pub const LABEL_SCHEMA: &str = "schema";

/// 언매핑 사유 레이블 키
pub const LABEL_REASON: &str = "reason";

// ─── Transform 메트릭 ──────────────────────────────────────────────

/// Transform: 매핑에 성공한 이벤트 수 (counter, label: source, schema)
pub const TRANSFORM_EVENTS_MAPPED_TOTAL: &str = "ocsforge_transform_events_mapped_total";

/// Transform: 매핑되지 못한 이벤트 수 (counter, label: source, reason)
pub const TRANSFORM_EVENTS_UNMAPPED_TOTAL: &str = "ocsforge_transform_events_unmapped_total";

/// Transform: 어떤 소스에도 귀속되지 못한 레코드 수 (counter)
pub const TRANSFORM_RECORDS_UNROUTABLE_TOTAL: &str =
    "ocsforge_transform_records_unroutable_total";

/// Transform: 로케이터가 해소되지 않아 null 처리된 필드 수 (counter, label: source)
pub const TRANSFORM_FIELD_MISSES_TOTAL: &str = "ocsforge_transform_field_misses_total";

/// Transform: 배치 처리 지연 시간 (histogram, 초)
pub const TRANSFORM_BATCH_DURATION_SECONDS: &str = "ocsforge_transform_batch_duration_seconds";

/// Transform: 마지막 배치의 레코드 수 (gauge)
pub const TRANSFORM_BATCH_RECORDS: &str = "ocsforge_transform_batch_records";
