//! 스캐너 에러 타입
//!
//! [`ScannerError`]는 스캐너 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ScannerError> for LicenseHubError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **매니페스트 파싱**: `ManifestParse` (파서 내부에서만 사용, 호출자에게는 빈 결과로 노출)
//! - **스캔 치명 에러**: `NoProject`, `RepositoryListing`
//! - **저장소 단위 에러**: `Discovery`, `Fetch`, `Task`
//! - **SBOM 생성**: `SbomGeneration`
//! - **설정/저장소**: `Config`, `Store`
//! - **취소**: `Superseded`
//! - **파일 I/O**: `Io`, `FileTooBig`

use licensehub_core::error::{ConfigError, LicenseHubError, ScanError, StoreError};

/// 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// 매니페스트 파싱 실패
    #[error("manifest parse error: {path}: {reason}")]
    ManifestParse {
        /// 파싱 대상 파일 경로
        path: String,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 현재 프로젝트 컨텍스트를 확인할 수 없음
    #[error("no project context: {0}")]
    NoProject(String),

    /// 프로젝트의 저장소 목록 조회 실패
    #[error("repository listing failed for project {project}: {reason}")]
    RepositoryListing {
        /// 프로젝트 이름
        project: String,
        /// 실패 사유
        reason: String,
    },

    /// 저장소 파일 탐색 실패
    #[error("discovery failed for repository {repo}: {reason}")]
    Discovery {
        /// 저장소 이름
        repo: String,
        /// 실패 사유
        reason: String,
    },

    /// 파일 내용 조회 실패
    #[error("fetch failed: {repo}:{path}: {reason}")]
    Fetch {
        /// 저장소 이름
        repo: String,
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 저장소 스캔 태스크 실패 (panic, 취소)
    #[error("scan task failed: {0}")]
    Task(String),

    /// SBOM 문서 생성 실패
    #[error("sbom generation error: {0}")]
    SbomGeneration(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 설정 문서 저장소 에러
    #[error("document store error: {collection}/{id}: {reason}")]
    Store {
        /// 컬렉션 이름
        collection: String,
        /// 문서 ID
        id: String,
        /// 에러 사유
        reason: String,
    },

    /// 더 최신 스캔이 시작되어 결과가 폐기됨
    #[error("scan generation {generation} superseded by {latest}")]
    Superseded {
        /// 이 스캔의 세대 번호
        generation: u64,
        /// 현재 최신 세대 번호
        latest: u64,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: usize,
        /// 최대 허용 크기 (바이트)
        max: usize,
    },
}

impl From<ScannerError> for LicenseHubError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::ManifestParse { path, reason } => LicenseHubError::Scan(
                ScanError::ParseFailed(format!("manifest parse error: {path}: {reason}")),
            ),
            ScannerError::NoProject(msg) => LicenseHubError::Scan(ScanError::NoProject(msg)),
            ScannerError::RepositoryListing { project, reason } => LicenseHubError::Scan(
                ScanError::Discovery(format!("project {project}: {reason}")),
            ),
            ScannerError::Discovery { repo, reason } => {
                LicenseHubError::Scan(ScanError::Discovery(format!("{repo}: {reason}")))
            }
            ScannerError::Fetch { repo, path, reason } => LicenseHubError::Scan(
                ScanError::Discovery(format!("fetch {repo}:{path}: {reason}")),
            ),
            ScannerError::Task(msg) => LicenseHubError::Scan(ScanError::Discovery(msg)),
            ScannerError::SbomGeneration(msg) => LicenseHubError::Scan(ScanError::Sbom(msg)),
            ScannerError::Config { field, reason } => {
                LicenseHubError::Config(ConfigError::InvalidValue { field, reason })
            }
            ScannerError::Store {
                collection,
                id,
                reason,
            } => LicenseHubError::Store(StoreError::Read(format!("{collection}/{id}: {reason}"))),
            ScannerError::Superseded { latest, .. } => {
                LicenseHubError::Scan(ScanError::Superseded(latest))
            }
            ScannerError::Io { source, .. } => LicenseHubError::Io(source),
            ScannerError::FileTooBig { path, size, max } => LicenseHubError::Scan(
                ScanError::ParseFailed(format!("file too large: {path}: {size} bytes (max: {max})")),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parse_error_display() {
        let err = ScannerError::ManifestParse {
            path: "/web/package.json".to_owned(),
            reason: "expected value at line 1".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/web/package.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn discovery_error_display() {
        let err = ScannerError::Discovery {
            repo: "billing".to_owned(),
            reason: "404".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "discovery failed for repository billing: 404"
        );
    }

    #[test]
    fn superseded_error_display() {
        let err = ScannerError::Superseded {
            generation: 2,
            latest: 3,
        };
        assert!(err.to_string().contains("generation 2 superseded by 3"));
    }

    #[test]
    fn file_too_big_error_display() {
        let err = ScannerError::FileTooBig {
            path: "package-lock.json".to_owned(),
            size: 2_000_000,
            max: 1_048_576,
        };
        let msg = err.to_string();
        assert!(msg.contains("2000000"));
        assert!(msg.contains("1048576"));
    }

    #[test]
    fn converts_no_project_to_scan_error() {
        let err: LicenseHubError = ScannerError::NoProject("not set".to_owned()).into();
        assert!(matches!(err, LicenseHubError::Scan(ScanError::NoProject(_))));
    }

    #[test]
    fn converts_config_to_invalid_value() {
        let err: LicenseHubError = ScannerError::Config {
            field: "max_concurrent_files".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            LicenseHubError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn converts_store_to_store_error() {
        let err: LicenseHubError = ScannerError::Store {
            collection: "ComplianceScannerSettings".to_owned(),
            id: "license-policy".to_owned(),
            reason: "permission denied".to_owned(),
        }
        .into();
        assert!(matches!(err, LicenseHubError::Store(StoreError::Read(_))));
    }

    #[test]
    fn converts_superseded_keeps_latest_generation() {
        let err: LicenseHubError = ScannerError::Superseded {
            generation: 1,
            latest: 4,
        }
        .into();
        assert!(matches!(
            err,
            LicenseHubError::Scan(ScanError::Superseded(4))
        ));
    }
}
