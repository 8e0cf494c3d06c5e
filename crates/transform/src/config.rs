//! 소스 레지스트리 설정 -- `sources.json` 문서
//!
//! 레지스트리는 처리 대상 로그 소스의 목록을 선언합니다. 소스마다
//! 매핑 문서 파일, 선택적 전처리기 이름, 그리고 입력 경로(스토리지 키
//! 패턴 / 스트림 메타데이터)를 지정합니다.
//!
//! 소스 배열의 **순서는 의미가 있습니다**: 소스 판별은 설정 순서대로
//! 평가되며 첫 번째로 만족하는 소스가 선택됩니다.
//!
//! # 문서 스키마
//! ```json
//! {
//!   "sources": [
//!     {
//!       "name": "alb",
//!       "mapping_file": "alb.json",
//!       "preprocessor": "alb",
//!       "inputs": {
//!         "storage": {
//!           "enabled": true,
//!           "buckets": [
//!             { "bucket": "lb-logs", "prefix": "AWSLogs/*/elasticloadbalancing/*" }
//!           ]
//!         },
//!         "stream": { "enabled": false }
//!       }
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// 레지스트리 문서 최대 크기 (바이트)
const MAX_REGISTRY_FILE_SIZE: u64 = 1024 * 1024; // 1MB

fn default_metadata_field() -> String {
    "source".to_owned()
}

fn default_enabled() -> bool {
    true
}

/// 소스 레지스트리 -- `sources.json` 문서 전체
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesRegistry {
    /// 설정 순서가 보존되는 소스 목록
    pub sources: Vec<SourceSpec>,
}

impl SourcesRegistry {
    /// JSON 파일에서 레지스트리를 로드합니다.
    ///
    /// 파싱/검증 실패는 프로세스 시작을 중단시키는 치명적 에러입니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| TransformError::Registry {
                path: path.display().to_string(),
                reason: format!("failed to read file metadata: {e}"),
            })?;

        if metadata.len() > MAX_REGISTRY_FILE_SIZE {
            return Err(TransformError::Registry {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_REGISTRY_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| TransformError::Registry {
                    path: path.display().to_string(),
                    reason: format!("failed to read file: {e}"),
                })?;

        Self::parse(&content, &path.display().to_string())
    }

    /// JSON 문자열에서 레지스트리를 파싱하고 검증합니다.
    pub fn parse(json_str: &str, origin: &str) -> Result<Self, TransformError> {
        let registry: SourcesRegistry =
            serde_json::from_str(json_str).map_err(|e| TransformError::Registry {
                path: origin.to_owned(),
                reason: format!("JSON parse error: {e}"),
            })?;

        registry.validate()?;

        Ok(registry)
    }

    /// 레지스트리의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TransformError> {
        if self.sources.is_empty() {
            return Err(TransformError::Config {
                field: "sources".to_owned(),
                reason: "at least one source must be configured".to_owned(),
            });
        }

        let mut seen_names = HashSet::new();
        for source in &self.sources {
            source.validate()?;
            if !seen_names.insert(source.name.as_str()) {
                return Err(TransformError::Config {
                    field: "sources".to_owned(),
                    reason: format!("duplicate source name '{}'", source.name),
                });
            }
        }

        Ok(())
    }

    /// 이름으로 소스를 조회합니다.
    pub fn source(&self, name: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.name == name)
    }
}

/// 소스 하나의 선언
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    /// 소스 이름 (레지스트리 내 유일)
    pub name: String,
    /// 매핑 문서 파일명 (`mappings_dir` 기준 상대 경로)
    pub mapping_file: String,
    /// 전처리기 이름 (없으면 pass-through)
    #[serde(default)]
    pub preprocessor: Option<String>,
    /// 입력 경로 설정
    #[serde(default)]
    pub inputs: InputPaths,
}

impl SourceSpec {
    /// 소스 선언의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TransformError> {
        if self.name.is_empty() {
            return Err(TransformError::Config {
                field: "sources[].name".to_owned(),
                reason: "source name must not be empty".to_owned(),
            });
        }

        if self.mapping_file.is_empty() {
            return Err(TransformError::Config {
                field: "sources[].mapping_file".to_owned(),
                reason: format!("mapping_file must not be empty for source '{}'", self.name),
            });
        }

        if let Some(storage) = &self.inputs.storage {
            if storage.enabled && storage.buckets.is_empty() {
                return Err(TransformError::Config {
                    field: "sources[].inputs.storage.buckets".to_owned(),
                    reason: format!(
                        "at least one bucket rule required for source '{}'",
                        self.name
                    ),
                });
            }
            for rule in &storage.buckets {
                if rule.bucket.is_empty() || rule.prefix.is_empty() {
                    return Err(TransformError::Config {
                        field: "sources[].inputs.storage.buckets".to_owned(),
                        reason: format!(
                            "bucket and prefix must not be empty for source '{}'",
                            self.name
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// 소스의 입력 경로 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputPaths {
    /// 오브젝트 스토리지 입력
    #[serde(default)]
    pub storage: Option<StorageInput>,
    /// 스트리밍 트랜스포트 입력
    #[serde(default)]
    pub stream: Option<StreamInput>,
}

/// 스토리지 입력 설정 -- 키 패턴 기반 소스 판별
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageInput {
    /// 활성화 여부
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 버킷별 키 접두어 규칙 (glob `*` 지원)
    pub buckets: Vec<BucketRule>,
}

/// 버킷 하나의 키 매칭 규칙
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRule {
    /// 버킷 이름 (정확히 일치)
    pub bucket: String,
    /// 오브젝트 키 패턴 (`*`는 임의 문자열에 매칭, 양끝 고정)
    pub prefix: String,
}

/// 스트림 입력 설정 -- 메타데이터 필드 기반 소스 판별
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInput {
    /// 활성화 여부
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 페이로드에서 소스 이름을 담는 필드명 (기본: "source")
    #[serde(default = "default_metadata_field")]
    pub metadata_field: String,
}
