//! 스캔 오케스트레이터 설정
//!
//! [`ScannerConfig`]는 core의 [`ScanConfig`](licensehub_core::config::ScanConfig)에서
//! 동시성/크기 제한만 가져옵니다. 프로젝트 이름은 호스트([`RepositorySource`](crate::RepositorySource))가
//! 결정합니다.
//!
//! # 사용 예시
//!
//! ```
//! use licensehub_scanner::ScannerConfigBuilder;
//!
//! let config = ScannerConfigBuilder::new()
//!     .max_concurrent_repos(2)
//!     .max_file_size(512 * 1024)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.max_concurrent_files, 10);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ScannerError;

/// 동시 저장소 스캔 수 상한
const MAX_CONCURRENT_REPOS_LIMIT: usize = 64;
/// 저장소별 동시 파일 조회 수 상한
const MAX_CONCURRENT_FILES_LIMIT: usize = 256;
/// 매니페스트 최대 크기 상한 (64MB)
const MAX_FILE_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// 스캔 오케스트레이터 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// 동시에 스캔하는 저장소 수
    pub max_concurrent_repos: usize,
    /// 저장소별 동시에 조회하는 파일 수
    pub max_concurrent_files: usize,
    /// 매니페스트 최대 크기 (바이트). 초과하는 내용은 버립니다.
    pub max_file_size: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_repos: 5,
            max_concurrent_files: 10,
            max_file_size: 1024 * 1024, // 1 MiB
        }
    }
}

impl ScannerConfig {
    /// core의 `ScanConfig`에서 스캐너 설정을 생성합니다.
    pub fn from_core(core: &licensehub_core::config::ScanConfig) -> Self {
        Self {
            max_concurrent_repos: core.max_concurrent_repos,
            max_concurrent_files: core.max_concurrent_files,
            max_file_size: core.max_file_size,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `max_concurrent_repos`: 1-64
    /// - `max_concurrent_files`: 1-256
    /// - `max_file_size`: 1-67108864 (64MB)
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.max_concurrent_repos == 0 || self.max_concurrent_repos > MAX_CONCURRENT_REPOS_LIMIT
        {
            return Err(ScannerError::Config {
                field: "max_concurrent_repos".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_REPOS_LIMIT}"),
            });
        }

        if self.max_concurrent_files == 0 || self.max_concurrent_files > MAX_CONCURRENT_FILES_LIMIT
        {
            return Err(ScannerError::Config {
                field: "max_concurrent_files".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_FILES_LIMIT}"),
            });
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ScannerError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            });
        }

        Ok(())
    }
}

/// 스캐너 설정 빌더
#[derive(Debug, Default)]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl ScannerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_concurrent_repos(mut self, count: usize) -> Self {
        self.config.max_concurrent_repos = count;
        self
    }

    pub fn max_concurrent_files(mut self, count: usize) -> Self {
        self.config.max_concurrent_files = count;
        self
    }

    pub fn max_file_size(mut self, bytes: usize) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// 설정을 검증하고 반환합니다.
    pub fn build(self) -> Result<ScannerConfig, ScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
