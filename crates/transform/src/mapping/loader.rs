//! 매핑 문서 로더 -- 소스별 매핑 JSON을 디스크에서 로드합니다.
//!
//! 레지스트리에 선언된 소스마다 `mappings_dir/<mapping_file>`을 읽어
//! [`MappingDocument`]로 구성합니다. 문서 파싱/검증 실패는 프로세스
//! 시작을 중단시키고, 파일이 존재하지 않는 소스는 경고 로그를 남기고
//! 건너뜁니다 (해당 소스의 이벤트는 런타임에 언매핑 처리됩니다).

use std::collections::HashMap;
use std::path::Path;

use crate::config::SourceSpec;
use crate::error::TransformError;

use super::types::MappingDocument;

/// 매핑 문서 최대 크기 (바이트)
const MAX_MAPPING_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// 매핑 문서 로더
pub struct MappingLoader;

impl MappingLoader {
    /// 레지스트리의 모든 소스에 대해 매핑 문서를 로드합니다.
    ///
    /// # Errors
    /// - 문서 파싱 또는 유효성 검증 실패
    /// - 문서 크기 초과
    pub async fn load_documents(
        mappings_dir: impl AsRef<Path>,
        sources: &[SourceSpec],
    ) -> Result<HashMap<String, MappingDocument>, TransformError> {
        let mappings_dir = mappings_dir.as_ref();
        let mut documents = HashMap::with_capacity(sources.len());

        for source in sources {
            let path = mappings_dir.join(&source.mapping_file);

            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::warn!(
                    source = %source.name,
                    path = %path.display(),
                    "mapping file not found, skipping source"
                );
                continue;
            }

            let document = Self::load_file(&path, &source.name).await?;
            tracing::info!(
                source = %source.name,
                mappings = document.mappings.len(),
                "loaded mapping document"
            );
            documents.insert(source.name.clone(), document);
        }

        tracing::info!(
            dir = %mappings_dir.display(),
            count = documents.len(),
            "loaded mapping documents"
        );

        Ok(documents)
    }

    /// 단일 매핑 문서 파일을 로드합니다.
    pub async fn load_file(
        path: impl AsRef<Path>,
        source: &str,
    ) -> Result<MappingDocument, TransformError> {
        let path = path.as_ref();

        let metadata =
            tokio::fs::metadata(path)
                .await
                .map_err(|e| TransformError::MappingLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file metadata: {e}"),
                })?;

        if metadata.len() > MAX_MAPPING_FILE_SIZE {
            return Err(TransformError::MappingLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_MAPPING_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| TransformError::MappingLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file: {e}"),
                })?;

        MappingDocument::parse(&content, source)
    }
}
