//! 설정 관리 — licensehub.toml 파싱 및 런타임 설정
//!
//! [`LicenseHubConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LICENSEHUB_SCAN_MAX_FILE_SIZE=2097152` 형식)
//! 3. 설정 파일 (`licensehub.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), licensehub_core::error::LicenseHubError> {
//! use licensehub_core::config::LicenseHubConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LicenseHubConfig::load("licensehub.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LicenseHubConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LicenseHubError};

/// 동시 스캔 저장소 수 상한
const MAX_CONCURRENT_REPOS_LIMIT: usize = 64;
/// 저장소별 동시 파일 조회 수 상한
const MAX_CONCURRENT_FILES_LIMIT: usize = 256;
/// 매니페스트 최대 크기 상한 (64MB)
const MAX_FILE_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// LicenseHub 통합 설정
///
/// `licensehub.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseHubConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 정책/승인 문서 저장소 설정
    #[serde(default)]
    pub settings: SettingsConfig,
}

impl LicenseHubConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LicenseHubError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LicenseHubError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LicenseHubError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LicenseHubError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LicenseHubError> {
        toml::from_str(toml_str).map_err(|e| {
            LicenseHubError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LICENSEHUB_{SECTION}_{FIELD}`
    /// 예: `LICENSEHUB_SETTINGS_STORE_DIR=/srv/licensehub`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LICENSEHUB_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "LICENSEHUB_GENERAL_LOG_FORMAT",
        );

        // Scan
        override_string(&mut self.scan.project, "LICENSEHUB_SCAN_PROJECT");
        override_usize(
            &mut self.scan.max_concurrent_repos,
            "LICENSEHUB_SCAN_MAX_CONCURRENT_REPOS",
        );
        override_usize(
            &mut self.scan.max_concurrent_files,
            "LICENSEHUB_SCAN_MAX_CONCURRENT_FILES",
        );
        override_usize(
            &mut self.scan.max_file_size,
            "LICENSEHUB_SCAN_MAX_FILE_SIZE",
        );

        // Settings
        override_string(
            &mut self.settings.store_dir,
            "LICENSEHUB_SETTINGS_STORE_DIR",
        );
        override_string(
            &mut self.settings.collection,
            "LICENSEHUB_SETTINGS_COLLECTION",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LicenseHubError> {
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

        if self.scan.max_concurrent_repos == 0
            || self.scan.max_concurrent_repos > MAX_CONCURRENT_REPOS_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_concurrent_repos".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_REPOS_LIMIT}"),
            }
            .into());
        }

        if self.scan.max_concurrent_files == 0
            || self.scan.max_concurrent_files > MAX_CONCURRENT_FILES_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_concurrent_files".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_FILES_LIMIT}"),
            }
            .into());
        }

        if self.scan.max_file_size == 0 || self.scan.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.scan.project.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scan.project".to_owned(),
                reason: "project name must not be empty".to_owned(),
            }
            .into());
        }

        if self.settings.store_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "settings.store_dir".to_owned(),
                reason: "store_dir must not be empty".to_owned(),
            }
            .into());
        }

        // 경로 순회 방지: 컬렉션 이름은 파일 시스템 경로 구성요소로 쓰임
        if self.settings.collection.is_empty()
            || self
                .settings
                .collection
                .contains(['/', '\\'])
            || self.settings.collection.contains("..")
        {
            return Err(ConfigError::InvalidValue {
                field: "settings.collection".to_owned(),
                reason: "collection must be a non-empty single path segment".to_owned(),
            }
            .into());
        }

        Ok(())
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
            log_format: "pretty".to_owned(),
        }
    }
}

/// 스캔 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 프로젝트 이름 (로컬 스캔 시 프로젝트 컨텍스트로 사용)
    pub project: String,
    /// 동시에 스캔하는 저장소 수
    pub max_concurrent_repos: usize,
    /// 저장소별 동시에 조회하는 파일 수
    pub max_concurrent_files: usize,
    /// 매니페스트 최대 크기 (바이트), 초과 시 건너뜀
    pub max_file_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            project: "local".to_owned(),
            max_concurrent_repos: 5,
            max_concurrent_files: 10,
            max_file_size: 1024 * 1024, // 1 MiB
        }
    }
}

/// 정책/승인 문서 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// 문서 저장 디렉토리
    pub store_dir: String,
    /// 설정 문서 컬렉션 이름
    pub collection: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            store_dir: ".licensehub".to_owned(),
            collection: "ComplianceScannerSettings".to_owned(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = LicenseHubConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.scan.max_concurrent_repos, 5);
        assert_eq!(config.scan.max_concurrent_files, 10);
        assert_eq!(config.scan.max_file_size, 1_048_576);
        assert_eq!(config.settings.collection, "ComplianceScannerSettings");
    }

    #[test]
    fn default_config_passes_validation() {
        let config = LicenseHubConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = LicenseHubConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.scan.project, "local");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[scan]
max_concurrent_repos = 2
"#;
        let config = LicenseHubConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.scan.max_concurrent_repos, 2);
        assert_eq!(config.scan.max_concurrent_files, 10);
    }

    #[test]
    fn from_str_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "json"

[scan]
project = "platform"
max_concurrent_repos = 8
max_concurrent_files = 20
max_file_size = 2097152

[settings]
store_dir = "/var/lib/licensehub"
collection = "Compliance"
"#;
        let config = LicenseHubConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.scan.project, "platform");
        assert_eq!(config.scan.max_file_size, 2_097_152);
        assert_eq!(config.settings.store_dir, "/var/lib/licensehub");
        config.validate().unwrap();
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = LicenseHubConfig::parse("invalid = [[[toml");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LicenseHubError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = LicenseHubConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = LicenseHubConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = LicenseHubConfig::default();
        config.scan.max_concurrent_repos = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_repos"));

        let mut config = LicenseHubConfig::default();
        config.scan.max_concurrent_files = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_files"));
    }

    #[test]
    fn validate_rejects_oversized_max_file_size() {
        let mut config = LicenseHubConfig::default();
        config.scan.max_file_size = MAX_FILE_SIZE_LIMIT + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_file_size"));
    }

    #[test]
    fn validate_rejects_blank_project() {
        let mut config = LicenseHubConfig::default();
        config.scan.project = "  ".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_collection_with_path_separator() {
        let mut config = LicenseHubConfig::default();
        config.settings.collection = "../escape".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("collection"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 환경변수 조작을 직렬화합니다.
        unsafe { std::env::set_var("TEST_LICENSEHUB_STR", "overridden") };
        override_string(&mut val, "TEST_LICENSEHUB_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_LICENSEHUB_STR") };
    }

    #[test]
    #[serial]
    fn env_override_usize_invalid_keeps_original() {
        let mut val = 10usize;
        // SAFETY: serial 테스트로 환경변수 조작을 직렬화합니다.
        unsafe { std::env::set_var("TEST_LICENSEHUB_USIZE_BAD", "ten") };
        override_usize(&mut val, "TEST_LICENSEHUB_USIZE_BAD");
        assert_eq!(val, 10); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_LICENSEHUB_USIZE_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_LICENSEHUB_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = LicenseHubConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = LicenseHubConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.scan.max_file_size, parsed.scan.max_file_size);
        assert_eq!(config.settings.store_dir, parsed.settings.store_dir);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = LicenseHubConfig::from_file("/nonexistent/path/licensehub.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LicenseHubError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
