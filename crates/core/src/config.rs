//! 설정 관리 — ocsforge.toml 파싱 및 런타임 설정
//!
//! [`OcsforgeConfig`]는 프로세스 전역 설정을 담는 최상위 구조체입니다.
//! 소스 레지스트리(`sources.json`)와 매핑 문서는 별도 JSON 문서이며,
//! 여기서는 그 경로와 실행 파라미터만 다룹니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`OCSFORGE_TRANSFORM_MAPPINGS_DIR=...` 형식)
//! 3. 설정 파일 (`ocsforge.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ocsforge_core::error::OcsforgeError> {
//! use ocsforge_core::config::OcsforgeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = OcsforgeConfig::load("ocsforge.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = OcsforgeConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, OcsforgeError};
use crate::types::UserDefinedValues;

/// Ocsforge 통합 설정
///
/// `ocsforge.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcsforgeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 변환 엔진 설정
    #[serde(default)]
    pub transform: TransformSettings,
    /// 사이드 채널 값 (`$.UserDefined.<key>` 로케이터로 참조)
    #[serde(default)]
    pub user_defined: HashMap<String, String>,
}

impl OcsforgeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, OcsforgeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, OcsforgeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OcsforgeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                OcsforgeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, OcsforgeError> {
        toml::from_str(toml_str).map_err(|e| {
            OcsforgeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `OCSFORGE_{SECTION}_{FIELD}`
    /// 예: `OCSFORGE_TRANSFORM_MAPPINGS_DIR=/etc/ocsforge/mappings`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "OCSFORGE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "OCSFORGE_GENERAL_LOG_FORMAT");

        // Transform
        override_string(
            &mut self.transform.sources_file,
            "OCSFORGE_TRANSFORM_SOURCES_FILE",
        );
        override_string(
            &mut self.transform.mappings_dir,
            "OCSFORGE_TRANSFORM_MAPPINGS_DIR",
        );
        override_usize(
            &mut self.transform.batch_concurrency,
            "OCSFORGE_TRANSFORM_BATCH_CONCURRENCY",
        );
        override_string(&mut self.transform.output_dir, "OCSFORGE_TRANSFORM_OUTPUT_DIR");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), OcsforgeError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.transform.validate()?;

        Ok(())
    }

    /// `[user_defined]` 섹션을 사이드 채널 값 집합으로 변환합니다.
    pub fn user_defined_values(&self) -> UserDefinedValues {
        UserDefinedValues::from_map(self.user_defined.clone())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 변환 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// 소스 레지스트리 문서 경로
    pub sources_file: String,
    /// 매핑 문서 디렉토리
    pub mappings_dir: String,
    /// 배치 처리 동시성 (워커 태스크 수)
    pub batch_concurrency: usize,
    /// 배치 싱크 출력 디렉토리
    pub output_dir: String,
}

impl TransformSettings {
    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), OcsforgeError> {
        const MAX_BATCH_CONCURRENCY: usize = 1024;

        if self.sources_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "transform.sources_file".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.mappings_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "transform.mappings_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.batch_concurrency == 0 || self.batch_concurrency > MAX_BATCH_CONCURRENCY {
            return Err(ConfigError::InvalidValue {
                field: "transform.batch_concurrency".to_owned(),
                reason: format!("must be 1-{MAX_BATCH_CONCURRENCY}"),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            sources_file: "/etc/ocsforge/sources.json".to_owned(),
            mappings_dir: "/etc/ocsforge/mappings".to_owned(),
            batch_concurrency: 8,
            output_dir: "/var/lib/ocsforge/out".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
