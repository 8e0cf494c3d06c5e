//! 변환 오케스트레이터 -- 소스 판별/전처리/분류/매핑의 전체 흐름
//!
//! [`TransformEngine`]은 프로세스 시작 시 한 번 구성되는 읽기 전용
//! 컨텍스트(소스 레지스트리, 매핑 문서, 전처리기 바인딩, 사이드 채널
//! 값)를 담습니다. 이벤트 처리는 무상태이며 레코드 간 공유 가변 상태가
//! 없으므로, 배치는 `Arc`로 엔진을 공유하는 워커 태스크로 병렬
//! 처리됩니다.
//!
//! # 이벤트 단위 파이프라인
//! ```text
//! IngestRecord -> SourceDetector -> Preprocessor -> timestamp -> classify
//!                                                      |            |
//!                                                  event_day   matched_value
//!                                                       \          /
//!                                                       interpreter
//!                                                            |
//!                                         Outcome::Mapped / Outcome::Unmapped
//! ```
//! 각 단계의 실패는 해당 이벤트에만 국한되며 배치를 중단시키지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use serde_json::{Value, json};

use ocsforge_core::config::TransformSettings;
use ocsforge_core::event::{IngestRecord, RecordOrigin};
use ocsforge_core::metrics::{
    LABEL_REASON, LABEL_SCHEMA, LABEL_SOURCE, TRANSFORM_BATCH_DURATION_SECONDS,
    TRANSFORM_BATCH_RECORDS, TRANSFORM_EVENTS_MAPPED_TOTAL, TRANSFORM_EVENTS_UNMAPPED_TOTAL,
    TRANSFORM_FIELD_MISSES_TOTAL, TRANSFORM_RECORDS_UNROUTABLE_TOTAL,
};
use ocsforge_core::pipeline::{DecodedInput, Preprocessor};
use ocsforge_core::types::{
    TransformedRecord, UnmappedReason, UnmappedRecord, UserDefinedValues,
};

use crate::batch::{BatchOutcome, Outcome};
use crate::classify::{SourceDetector, classify};
use crate::config::SourcesRegistry;
use crate::error::TransformError;
use crate::mapping::interpreter::DiagnosticKind;
use crate::mapping::{MappingDocument, MappingLoader, transform};
use crate::preprocessor::PreprocessorRegistry;
use crate::timestamp;

/// 스트림 페이로드에서 실제 이벤트를 감싸는 키
const MESSAGE_KEY: &str = "message";

/// 변환 엔진
///
/// 시작 시 한 번 로드된 뒤 읽기 전용으로 공유됩니다. 내부 카운터는
/// 원자적이므로 동기화 없이 동시 읽기/처리가 안전합니다.
pub struct TransformEngine {
    /// 설정 순서의 소스 이름 목록
    source_names: Vec<String>,
    /// 소스 이름 -> 매핑 문서
    documents: HashMap<String, MappingDocument>,
    /// 소스 이름 -> 멀티 스키마 여부 (로드 타임에 계산)
    multischema: HashMap<String, bool>,
    /// 소스 판별기
    detector: SourceDetector,
    /// 소스 이름 -> 전처리기 바인딩
    preprocessors: HashMap<String, Arc<dyn Preprocessor>>,
    /// 레지스트리에 없는 소스용 pass-through
    default_preprocessor: Arc<dyn Preprocessor>,
    /// 사이드 채널 값
    user_defined: UserDefinedValues,
    /// 배치 워커 태스크 수
    batch_concurrency: usize,
    /// 변환 성공 카운터
    mapped_count: AtomicU64,
    /// 매핑 실패 카운터
    unmapped_count: AtomicU64,
    /// 소스 미귀속 카운터
    unroutable_count: AtomicU64,
}

impl TransformEngine {
    /// 설정에 따라 레지스트리와 매핑 문서를 로드하여 엔진을 구성합니다.
    ///
    /// 레지스트리/문서의 파싱·검증 실패는 치명적이며 시작을 중단시킵니다.
    pub async fn load(
        settings: &TransformSettings,
        preprocessors: PreprocessorRegistry,
        user_defined: UserDefinedValues,
    ) -> Result<Self, TransformError> {
        let registry = SourcesRegistry::load(&settings.sources_file).await?;
        tracing::info!(
            sources = registry.sources.len(),
            file = %settings.sources_file,
            "loaded source registry"
        );

        let documents =
            MappingLoader::load_documents(&settings.mappings_dir, &registry.sources).await?;

        Self::from_parts(
            registry,
            documents,
            preprocessors,
            user_defined,
            settings.batch_concurrency,
        )
    }

    /// 이미 로드된 구성 요소로 엔진을 조립합니다.
    pub fn from_parts(
        registry: SourcesRegistry,
        documents: HashMap<String, MappingDocument>,
        preprocessors: PreprocessorRegistry,
        user_defined: UserDefinedValues,
        batch_concurrency: usize,
    ) -> Result<Self, TransformError> {
        if batch_concurrency == 0 {
            return Err(TransformError::Config {
                field: "batch_concurrency".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        let detector = SourceDetector::from_sources(&registry.sources)?;

        let bindings: HashMap<String, Arc<dyn Preprocessor>> = registry
            .sources
            .iter()
            .map(|spec| {
                (
                    spec.name.clone(),
                    preprocessors.resolve(spec.preprocessor.as_deref()),
                )
            })
            .collect();

        let multischema = documents
            .iter()
            .map(|(name, doc)| (name.clone(), doc.is_multischema()))
            .collect();

        let source_names = registry.sources.iter().map(|s| s.name.clone()).collect();

        Ok(Self {
            source_names,
            documents,
            multischema,
            detector,
            preprocessors: bindings,
            default_preprocessor: preprocessors.resolve(None),
            user_defined,
            batch_concurrency,
            mapped_count: AtomicU64::new(0),
            unmapped_count: AtomicU64::new(0),
            unroutable_count: AtomicU64::new(0),
        })
    }

    /// 설정 순서의 소스 이름 목록을 반환합니다.
    pub fn source_names(&self) -> &[String] {
        &self.source_names
    }

    /// 로드된 매핑 문서 수를 반환합니다.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// 소스의 매핑 문서를 조회합니다.
    pub fn document(&self, source: &str) -> Option<&MappingDocument> {
        self.documents.get(source)
    }

    /// 소스가 멀티 스키마인지 확인합니다 (파티션 키 구성에 사용).
    pub fn is_multischema(&self, source: &str) -> bool {
        self.multischema.get(source).copied().unwrap_or(false)
    }

    /// 소스 판별기에 대한 참조를 반환합니다.
    pub fn detector(&self) -> &SourceDetector {
        &self.detector
    }

    /// 지금까지 변환에 성공한 이벤트 수를 반환합니다.
    pub fn mapped_count(&self) -> u64 {
        self.mapped_count.load(Ordering::Relaxed)
    }

    /// 지금까지 매핑되지 못한 이벤트 수를 반환합니다.
    pub fn unmapped_count(&self) -> u64 {
        self.unmapped_count.load(Ordering::Relaxed)
    }

    /// 지금까지 소스에 귀속되지 못한 레코드 수를 반환합니다.
    pub fn unroutable_count(&self) -> u64 {
        self.unroutable_count.load(Ordering::Relaxed)
    }

    /// 디코딩된 이벤트 하나를 변환합니다.
    ///
    /// 엄격한 선형 파이프라인입니다: 설정 조회 -> 타임스탬프 ->
    /// 분류 -> 인터프리터. 각 단계의 실패는 이 이벤트만 언매핑
    /// 처리하고 종료합니다.
    pub fn process_event(&self, event: &Value, source: &str) -> Outcome {
        let Some(document) = self.documents.get(source) else {
            tracing::warn!(source, "no mapping configuration found for source");
            return self.unmapped(source, UnmappedReason::NoSourceConfig, event.clone());
        };

        // 1. 타임스탬프 추출
        let timestamp_value = match document.timestamp.field.locate(event, &self.user_defined) {
            Ok(Some(value)) if !value.is_empty() => value,
            Ok(_) => {
                tracing::warn!(
                    source,
                    locator = %document.timestamp.field,
                    "could not extract timestamp from event"
                );
                return self.unmapped(
                    source,
                    UnmappedReason::TimestampMissing {
                        locator: document.timestamp.field.to_string(),
                    },
                    event.clone(),
                );
            }
            Err(e) => {
                tracing::warn!(source, error = %e, "timestamp locator failed");
                return self.unmapped(
                    source,
                    UnmappedReason::TimestampMissing {
                        locator: document.timestamp.field.to_string(),
                    },
                    event.clone(),
                );
            }
        };

        // 2. 파티션 키 계산
        let event_day = match timestamp::event_day(&timestamp_value, &document.timestamp.format) {
            Ok(day) => day,
            Err(e) => {
                tracing::warn!(source, error = %e, "timestamp normalization failed");
                return self.unmapped(
                    source,
                    UnmappedReason::TimestampUnparseable {
                        value: timestamp_value,
                        reason: e.to_string(),
                    },
                    event.clone(),
                );
            }
        };

        // 3. 판별자 해소 및 매핑 선택 (정확히 일치)
        let Some(matched_value) = classify(event, document, &self.user_defined) else {
            tracing::warn!(
                source,
                locator = %document.matched_field,
                "could not extract discriminant from event"
            );
            return self.unmapped(
                source,
                UnmappedReason::DiscriminantMissing {
                    locator: document.matched_field.to_string(),
                },
                event.clone(),
            );
        };

        let Some(event_mapping) = document.mappings.get(&matched_value) else {
            tracing::debug!(source, matched_value, "no mapping entry for discriminant");
            return self.unmapped(
                source,
                UnmappedReason::NoMappingForType { matched_value },
                event.clone(),
            );
        };

        // 4. 인터프리터 실행
        let output = transform(&event_mapping.schema_mapping, event, &self.user_defined);
        for diagnostic in &output.diagnostics {
            tracing::warn!(source, %diagnostic, "field diagnostic during transform");
            if matches!(diagnostic.kind, DiagnosticKind::FieldNotFound { .. }) {
                counter!(TRANSFORM_FIELD_MISSES_TOTAL, LABEL_SOURCE => source.to_owned())
                    .increment(1);
            }
        }

        self.mapped_count.fetch_add(1, Ordering::Relaxed);
        counter!(
            TRANSFORM_EVENTS_MAPPED_TOTAL,
            LABEL_SOURCE => source.to_owned(),
            LABEL_SCHEMA => event_mapping.target_schema.clone()
        )
        .increment(1);

        Outcome::Mapped(TransformedRecord {
            source: source.to_owned(),
            target_schema: event_mapping.target_schema.clone(),
            target_mapping: Value::Object(output.record),
            event_day,
        })
    }

    /// 소스의 전처리기를 적용한 뒤 변환합니다.
    pub fn preprocess_and_transform(&self, source: &str, input: DecodedInput) -> Outcome {
        let preprocessor = self
            .preprocessors
            .get(source)
            .unwrap_or(&self.default_preprocessor);

        let original = match &input {
            DecodedInput::Raw(line) => json!({ "rawData": line }),
            DecodedInput::Json(value) => value.clone(),
        };

        match preprocessor.preprocess(input) {
            Ok(event) => self.process_event(&event, source),
            Err(e) => {
                tracing::warn!(source, error = %e, "preprocessor failed");
                self.unmapped(
                    source,
                    UnmappedReason::PreprocessFailed {
                        reason: e.to_string(),
                    },
                    original,
                )
            }
        }
    }

    /// 수집 레코드 하나를 소스 판별부터 변환까지 처리합니다.
    pub fn process_ingest(&self, record: &IngestRecord) -> Outcome {
        match &record.origin {
            RecordOrigin::Storage { bucket, key } => {
                let Some(source) = self.detector.detect_storage(bucket, key) else {
                    tracing::error!(bucket, key, "cannot determine source for storage record");
                    self.unroutable_count.fetch_add(1, Ordering::Relaxed);
                    counter!(TRANSFORM_RECORDS_UNROUTABLE_TOTAL).increment(1);
                    return Outcome::Unroutable;
                };
                let source = source.to_owned();

                let line = match std::str::from_utf8(&record.data) {
                    Ok(line) => line.to_owned(),
                    Err(e) => {
                        return self.unmapped(
                            &source,
                            UnmappedReason::DecodeFailed {
                                reason: format!("invalid UTF-8: {e}"),
                            },
                            json!({ "rawData": String::from_utf8_lossy(&record.data) }),
                        );
                    }
                };

                self.preprocess_and_transform(&source, DecodedInput::Raw(line))
            }
            RecordOrigin::Stream { stream } => {
                let payload: Value = match serde_json::from_slice(&record.data) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(stream, error = %e, "stream payload is not valid JSON");
                        return self.unmapped_unattributed(
                            UnmappedReason::DecodeFailed {
                                reason: e.to_string(),
                            },
                            json!({ "rawData": String::from_utf8_lossy(&record.data) }),
                        );
                    }
                };

                let Some(source) = self.detector.detect_stream(&payload) else {
                    tracing::error!(stream, "cannot determine source for stream record");
                    return self.unmapped_unattributed(UnmappedReason::NoSourceDetected, payload);
                };
                let source = source.to_owned();

                // 실제 이벤트가 message 필드에 감싸져 있으면 풀어냅니다
                let input = match payload.get(MESSAGE_KEY).cloned() {
                    Some(Value::String(line)) => DecodedInput::Raw(line),
                    Some(inner) => DecodedInput::Json(inner),
                    None => DecodedInput::Json(payload),
                };

                self.preprocess_and_transform(&source, input)
            }
        }
    }

    /// 배치를 워커 태스크로 병렬 처리합니다.
    ///
    /// 레코드 간 상태 공유가 없으므로 순서와 무관하게 안전합니다.
    /// 결과는 mapped/unmapped 두 버킷과 unroutable 카운트로 집계됩니다.
    pub async fn process_batch(self: &Arc<Self>, records: Vec<IngestRecord>) -> BatchOutcome {
        let started = Instant::now();
        let total_records = records.len();
        gauge!(TRANSFORM_BATCH_RECORDS).set(total_records as f64);

        if records.is_empty() {
            return BatchOutcome::new();
        }

        let chunk_size = total_records.div_ceil(self.batch_concurrency).max(1);
        let mut handles = Vec::with_capacity(self.batch_concurrency);

        for chunk in records.chunks(chunk_size) {
            let chunk: Vec<IngestRecord> = chunk.to_vec();
            let engine = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                let mut partial = BatchOutcome::new();
                for record in &chunk {
                    partial.push(engine.process_ingest(record));
                }
                partial
            }));
        }

        let mut outcome = BatchOutcome::new();
        for handle in handles {
            match handle.await {
                Ok(partial) => outcome.merge(partial),
                Err(e) => tracing::error!(error = %e, "batch worker task failed"),
            }
        }

        histogram!(TRANSFORM_BATCH_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        tracing::info!(
            records = total_records,
            mapped = outcome.mapped.len(),
            unmapped = outcome.unmapped.len(),
            unroutable = outcome.unroutable,
            "processed batch"
        );

        outcome
    }

    fn unmapped(&self, source: &str, reason: UnmappedReason, payload: Value) -> Outcome {
        self.unmapped_count.fetch_add(1, Ordering::Relaxed);
        counter!(
            TRANSFORM_EVENTS_UNMAPPED_TOTAL,
            LABEL_SOURCE => source.to_owned(),
            LABEL_REASON => reason.label()
        )
        .increment(1);
        Outcome::Unmapped(UnmappedRecord {
            source: Some(source.to_owned()),
            reason,
            payload,
        })
    }

    fn unmapped_unattributed(&self, reason: UnmappedReason, payload: Value) -> Outcome {
        self.unmapped_count.fetch_add(1, Ordering::Relaxed);
        counter!(
            TRANSFORM_EVENTS_UNMAPPED_TOTAL,
            LABEL_REASON => reason.label()
        )
        .increment(1);
        Outcome::Unmapped(UnmappedRecord {
            source: None,
            reason,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sysmon_document() -> String {
        json!({
            "custom_source_events": {
                "matched_field": "$.EventId",
                "timestamp": { "field": "$.ts", "format": "epoch" },
                "ocsf_mapping": {
                    "1": {
                        "schema": "process_activity",
                        "schema_mapping": {
                            "activity_id": {
                                "enum": {"evaluate": "$.EventId", "values": {"1": 1}, "other": 99}
                            },
                            "actor": { "process": { "name": "$.Description.Image" } },
                            "cloud": { "region": "$.UserDefined.region" }
                        }
                    }
                }
            }
        })
        .to_string()
    }

    fn test_engine() -> Arc<TransformEngine> {
        let registry = SourcesRegistry::parse(
            r#"{"sources": [{
                "name": "windows-sysmon",
                "mapping_file": "sysmon.json",
                "preprocessor": "sysmon",
                "inputs": {
                    "storage": {"enabled": true, "buckets": [
                        {"bucket": "telemetry", "prefix": "sysmon/*"}
                    ]},
                    "stream": {"enabled": true}
                }
            }]}"#,
            "sources.json",
        )
        .unwrap();

        let mut documents = HashMap::new();
        documents.insert(
            "windows-sysmon".to_owned(),
            MappingDocument::parse(&sysmon_document(), "windows-sysmon").unwrap(),
        );

        let user_defined = UserDefinedValues::new().with("region", "eu-west-1");

        Arc::new(
            TransformEngine::from_parts(
                registry,
                documents,
                PreprocessorRegistry::with_defaults(),
                user_defined,
                4,
            )
            .unwrap(),
        )
    }

    fn sample_event() -> Value {
        json!({
            "EventId": 1,
            "ts": 1700000000,
            "Description": {"Image": "C:\\Windows\\explorer.exe"}
        })
    }

    #[test]
    fn process_event_maps_known_discriminant() {
        let engine = test_engine();
        let outcome = engine.process_event(&sample_event(), "windows-sysmon");

        let Outcome::Mapped(record) = outcome else {
            panic!("expected mapped outcome");
        };
        assert_eq!(record.target_schema, "process_activity");
        assert_eq!(record.target_mapping.get("activity_id"), Some(&json!(1)));
        assert_eq!(
            record.target_mapping.pointer("/actor/process/name"),
            Some(&json!("C:\\Windows\\explorer.exe"))
        );
        assert_eq!(
            record.target_mapping.pointer("/cloud/region"),
            Some(&json!("eu-west-1"))
        );
        assert_eq!(record.event_day.len(), 8);
        assert_eq!(engine.mapped_count(), 1);
    }

    #[test]
    fn unknown_source_is_unmapped() {
        let engine = test_engine();
        let outcome = engine.process_event(&sample_event(), "no-such-source");
        let Outcome::Unmapped(record) = outcome else {
            panic!("expected unmapped outcome");
        };
        assert_eq!(record.reason, UnmappedReason::NoSourceConfig);
        assert_eq!(engine.unmapped_count(), 1);
    }

    #[test]
    fn missing_timestamp_is_unmapped() {
        let engine = test_engine();
        let event = json!({"EventId": 1});
        let outcome = engine.process_event(&event, "windows-sysmon");
        let Outcome::Unmapped(record) = outcome else {
            panic!("expected unmapped outcome");
        };
        assert!(matches!(
            record.reason,
            UnmappedReason::TimestampMissing { .. }
        ));
    }

    #[test]
    fn unparseable_timestamp_is_unmapped() {
        let engine = test_engine();
        let event = json!({"EventId": 1, "ts": "yesterday"});
        let outcome = engine.process_event(&event, "windows-sysmon");
        let Outcome::Unmapped(record) = outcome else {
            panic!("expected unmapped outcome");
        };
        assert!(matches!(
            record.reason,
            UnmappedReason::TimestampUnparseable { .. }
        ));
    }

    #[test]
    fn unknown_discriminant_is_unmapped_with_reason() {
        let engine = test_engine();
        let event = json!({"EventId": 42, "ts": 1700000000});
        let outcome = engine.process_event(&event, "windows-sysmon");
        let Outcome::Unmapped(record) = outcome else {
            panic!("expected unmapped outcome");
        };
        assert_eq!(
            record.reason,
            UnmappedReason::NoMappingForType {
                matched_value: "42".to_owned()
            }
        );
        assert_eq!(record.reason.to_string(), "no mapping for discriminant '42'");
    }

    #[test]
    fn missing_discriminant_is_unmapped() {
        let engine = test_engine();
        let event = json!({"ts": 1700000000});
        let outcome = engine.process_event(&event, "windows-sysmon");
        let Outcome::Unmapped(record) = outcome else {
            panic!("expected unmapped outcome");
        };
        assert!(matches!(
            record.reason,
            UnmappedReason::DiscriminantMissing { .. }
        ));
    }

    #[test]
    fn idempotent_transformation() {
        let engine = test_engine();
        let event = sample_event();
        let first = engine.process_event(&event, "windows-sysmon");
        let second = engine.process_event(&event, "windows-sysmon");
        assert_eq!(first, second);
    }

    #[test]
    fn ingest_storage_record_with_sysmon_preprocessor() {
        let engine = test_engine();
        let line = json!({
            "EventId": 1,
            "ts": 1700000000,
            "Description": "Image: C:\\Windows\\explorer.exe\r\nUser: alice"
        })
        .to_string();
        let record =
            IngestRecord::from_storage(line.into(), "telemetry", "sysmon/2024/01/15/host.log");

        let Outcome::Mapped(mapped) = engine.process_ingest(&record) else {
            panic!("expected mapped outcome");
        };
        assert_eq!(
            mapped.target_mapping.pointer("/actor/process/name"),
            Some(&json!("C:\\Windows\\explorer.exe"))
        );
    }

    #[test]
    fn ingest_unroutable_storage_key() {
        let engine = test_engine();
        let record = IngestRecord::from_storage("{}".into(), "telemetry", "other/key.log");
        assert_eq!(engine.process_ingest(&record), Outcome::Unroutable);
        assert_eq!(engine.unroutable_count(), 1);
    }

    #[test]
    fn ingest_stream_record_with_metadata() {
        let engine = test_engine();
        let payload = json!({
            "source": "windows-sysmon",
            "EventId": 1,
            "ts": 1700000000,
            "Description": "Image: a.exe"
        })
        .to_string();
        let record = IngestRecord::from_stream(payload.into(), "telemetry-stream");

        let Outcome::Mapped(mapped) = engine.process_ingest(&record) else {
            panic!("expected mapped outcome");
        };
        assert_eq!(mapped.source, "windows-sysmon");
    }

    #[test]
    fn ingest_stream_unwraps_message_envelope() {
        let engine = test_engine();
        let payload = json!({
            "source": "windows-sysmon",
            "message": {
                "EventId": 1,
                "ts": 1700000000,
                "Description": "Image: wrapped.exe"
            }
        })
        .to_string();
        let record = IngestRecord::from_stream(payload.into(), "telemetry-stream");

        let Outcome::Mapped(mapped) = engine.process_ingest(&record) else {
            panic!("expected mapped outcome");
        };
        assert_eq!(
            mapped.target_mapping.pointer("/actor/process/name"),
            Some(&json!("wrapped.exe"))
        );
    }

    #[test]
    fn ingest_stream_undetected_source_is_unmapped() {
        let engine = test_engine();
        let record =
            IngestRecord::from_stream(r#"{"source": "mystery"}"#.into(), "telemetry-stream");
        let Outcome::Unmapped(unmapped) = engine.process_ingest(&record) else {
            panic!("expected unmapped outcome");
        };
        assert_eq!(unmapped.source, None);
        assert_eq!(unmapped.reason, UnmappedReason::NoSourceDetected);
    }

    #[test]
    fn ingest_stream_invalid_json_is_unmapped() {
        let engine = test_engine();
        let record = IngestRecord::from_stream("not json".into(), "telemetry-stream");
        let Outcome::Unmapped(unmapped) = engine.process_ingest(&record) else {
            panic!("expected unmapped outcome");
        };
        assert!(matches!(unmapped.reason, UnmappedReason::DecodeFailed { .. }));
    }

    #[tokio::test]
    async fn batch_collects_both_buckets() {
        let engine = test_engine();

        let mapped_line = json!({
            "EventId": 1, "ts": 1700000000, "Description": "Image: a.exe"
        })
        .to_string();
        let unmapped_line = json!({
            "EventId": 42, "ts": 1700000000, "Description": "Image: b.exe"
        })
        .to_string();

        let records = vec![
            IngestRecord::from_storage(mapped_line.into(), "telemetry", "sysmon/a.log"),
            IngestRecord::from_storage(unmapped_line.into(), "telemetry", "sysmon/b.log"),
            IngestRecord::from_storage("{}".into(), "other-bucket", "sysmon/c.log"),
        ];

        let outcome = engine.process_batch(records).await;
        assert_eq!(outcome.mapped.len(), 1);
        assert_eq!(outcome.unmapped.len(), 1);
        assert_eq!(outcome.unroutable, 1);
        assert_eq!(outcome.total(), 3);
    }

    #[tokio::test]
    async fn empty_batch_is_empty_outcome() {
        let engine = test_engine();
        let outcome = engine.process_batch(Vec::new()).await;
        assert_eq!(outcome.total(), 0);
    }

    #[test]
    fn multischema_flag_from_documents() {
        let engine = test_engine();
        assert!(!engine.is_multischema("windows-sysmon"));
        assert!(!engine.is_multischema("unknown"));
    }
}
