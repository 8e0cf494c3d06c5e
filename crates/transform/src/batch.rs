//! 배치 결과 집계와 파티션 그룹핑
//!
//! 이벤트 단위 처리 결과를 mapped/unmapped 두 버킷(및 unroutable
//! 카운트)으로 모으고, 싱크에 넘기기 전에 파티션 키로 그룹핑합니다.

use std::collections::BTreeMap;

use ocsforge_core::types::{PartitionKey, TransformedRecord, UnmappedRecord};

/// 이벤트 하나의 처리 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 변환 성공
    Mapped(TransformedRecord),
    /// 매핑 실패 (사유 포함, 감사 버킷으로)
    Unmapped(UnmappedRecord),
    /// 어떤 소스에도 귀속되지 않음 (카운트만 유지)
    Unroutable,
}

/// 배치 하나의 집계 결과
///
/// 배치 호출자는 두 버킷과 진단 카운트만 봅니다 -- 이벤트 단위 에러는
/// 여기를 넘어 전파되지 않습니다.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 변환 성공 레코드
    pub mapped: Vec<TransformedRecord>,
    /// 매핑 실패 레코드
    pub unmapped: Vec<UnmappedRecord>,
    /// 소스 미귀속 레코드 수
    pub unroutable: u64,
}

impl BatchOutcome {
    /// 빈 집계를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 처리 결과 하나를 집계에 더합니다.
    pub fn push(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Mapped(record) => self.mapped.push(record),
            Outcome::Unmapped(record) => self.unmapped.push(record),
            Outcome::Unroutable => self.unroutable += 1,
        }
    }

    /// 다른 집계를 병합합니다 (워커 태스크 결과 합산).
    pub fn merge(&mut self, other: BatchOutcome) {
        self.mapped.extend(other.mapped);
        self.unmapped.extend(other.unmapped);
        self.unroutable += other.unroutable;
    }

    /// 집계된 전체 레코드 수를 반환합니다.
    pub fn total(&self) -> u64 {
        self.mapped.len() as u64 + self.unmapped.len() as u64 + self.unroutable
    }
}

/// 변환 레코드를 싱크 파티션으로 그룹핑합니다.
///
/// 멀티 스키마 소스는 `(source, schema, event_day)`, 단일 스키마 소스는
/// `(source, event_day)` 키로 묶입니다.
pub fn group_partitions(
    records: Vec<TransformedRecord>,
    is_multischema: impl Fn(&str) -> bool,
) -> BTreeMap<PartitionKey, Vec<TransformedRecord>> {
    let mut partitions: BTreeMap<PartitionKey, Vec<TransformedRecord>> = BTreeMap::new();

    for record in records {
        let key = PartitionKey {
            source: record.source.clone(),
            schema: is_multischema(&record.source).then(|| record.target_schema.clone()),
            event_day: record.event_day.clone(),
        };
        partitions.entry(key).or_default().push(record);
    }

    partitions
}
