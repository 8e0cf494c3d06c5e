//! 수집 레코드 — 트랜스포트에서 전달되는 입력 단위
//!
//! 오브젝트 스토리지의 한 줄, 또는 스트림의 한 레코드가
//! [`IngestRecord`] 하나에 대응합니다. 오브젝트 조회/압축 해제/큐 소비는
//! 외부 협력자의 책임이며, 엔진은 디코딩 직전의 바이트와 출처 메타데이터만
//! 전달받습니다.

use std::fmt;
use std::time::SystemTime;

use bytes::Bytes;

/// 레코드 출처
///
/// 소스 판별(source detection) 전략이 출처 유형에 따라 갈립니다:
/// 스토리지 레코드는 키 패턴 매칭, 스트림 레코드는 메타데이터 필드 검사.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    /// 오브젝트 스토리지에서 읽은 한 줄
    Storage {
        /// 버킷 이름
        bucket: String,
        /// 오브젝트 키 (URL 디코딩 완료 상태)
        key: String,
    },
    /// 스트리밍 트랜스포트에서 수신한 레코드
    Stream {
        /// 스트림 식별자
        stream: String,
    },
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage { bucket, key } => write!(f, "storage:{bucket}/{key}"),
            Self::Stream { stream } => write!(f, "stream:{stream}"),
        }
    }
}

/// 수집된 원시 레코드
///
/// 트랜스포트 협력자가 생성하고 변환 엔진이 소비하는 입력 단위입니다.
/// 변환 후 폐기되며 레코드 간 상태 공유가 없습니다.
#[derive(Debug, Clone)]
pub struct IngestRecord {
    /// 레코드 고유 ID (UUID v4)
    pub id: String,
    /// 수신 시각
    pub received_at: SystemTime,
    /// 원시 페이로드 바이트
    pub data: Bytes,
    /// 레코드 출처
    pub origin: RecordOrigin,
}

impl IngestRecord {
    /// 스토리지 출처 레코드를 생성합니다.
    pub fn from_storage(
        data: Bytes,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            received_at: SystemTime::now(),
            data,
            origin: RecordOrigin::Storage {
                bucket: bucket.into(),
                key: key.into(),
            },
        }
    }

    /// 스트림 출처 레코드를 생성합니다.
    pub fn from_stream(data: Bytes, stream: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            received_at: SystemTime::now(),
            data,
            origin: RecordOrigin::Stream {
                stream: stream.into(),
            },
        }
    }
}
