//! 에러 타입 — 도메인별 에러 정의

/// LicenseHub 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LicenseHubError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 처리 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// 설정 문서 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 프로젝트 컨텍스트를 확인할 수 없음
    #[error("project context unavailable: {0}")]
    NoProject(String),

    /// 저장소 탐색 실패
    #[error("repository discovery failed: {0}")]
    Discovery(String),

    /// 매니페스트 파싱 실패
    #[error("manifest parse failed: {0}")]
    ParseFailed(String),

    /// SBOM 생성 실패
    #[error("sbom generation failed: {0}")]
    Sbom(String),

    /// 더 최신 스캔에 의해 대체됨
    #[error("scan superseded by generation {0}")]
    Superseded(u64),
}

/// 설정 문서 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 문서 읽기 실패
    #[error("read failed: {0}")]
    Read(String),

    /// 문서 쓰기 실패
    #[error("write failed: {0}")]
    Write(String),

    /// 문서 형식 오류
    #[error("malformed document: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: LicenseHubError = ConfigError::InvalidValue {
            field: "scan.max_file_size".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(err, LicenseHubError::Config(_)));
        assert!(err.to_string().contains("scan.max_file_size"));
    }

    #[test]
    fn scan_error_display_includes_generation() {
        let err = ScanError::Superseded(7);
        assert_eq!(err.to_string(), "scan superseded by generation 7");
    }

    #[test]
    fn store_error_converts_to_top_level() {
        let err: LicenseHubError = StoreError::Malformed("missing policy".to_owned()).into();
        assert!(matches!(err, LicenseHubError::Store(StoreError::Malformed(_))));
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LicenseHubError = io.into();
        assert!(err.to_string().contains("denied"));
    }
}
