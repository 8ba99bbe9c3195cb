//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않은 경우 호출은 아무 효과가 없습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `licensehub_`
//! - 모듈명: `scan_`, `parser_`, `policy_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(licensehub_core::metrics::SCAN_REPOS_SCANNED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 에코시스템 레이블 키 (nuget, npm, go, python, maven)
pub const LABEL_ECOSYSTEM: &str = "ecosystem";

/// 정책 액션 레이블 키 (warn, block)
pub const LABEL_ACTION: &str = "action";

// ─── Scan 메트릭 ────────────────────────────────────────────────────

/// Scan: 완료된 전체 스캔 수 (counter)
pub const SCAN_COMPLETED_TOTAL: &str = "licensehub_scan_completed_total";

/// Scan: 성공적으로 스캔된 저장소 수 (counter)
pub const SCAN_REPOS_SCANNED_TOTAL: &str = "licensehub_scan_repos_scanned_total";

/// Scan: 실패한 저장소 수 (counter)
pub const SCAN_REPOS_FAILED_TOTAL: &str = "licensehub_scan_repos_failed_total";

/// Scan: 크기 제한/조회 실패로 건너뛴 파일 수 (counter)
pub const SCAN_FILES_SKIPPED_TOTAL: &str = "licensehub_scan_files_skipped_total";

/// Scan: 전체 스캔 소요 시간 (histogram, 초)
pub const SCAN_DURATION_SECONDS: &str = "licensehub_scan_duration_seconds";

// ─── Parser 메트릭 ──────────────────────────────────────────────────

/// Parser: 파싱된 매니페스트 수 (counter, label: ecosystem)
pub const PARSER_MANIFESTS_PARSED_TOTAL: &str = "licensehub_parser_manifests_parsed_total";

/// Parser: 추출된 의존성 수 (counter, label: ecosystem)
pub const PARSER_DEPENDENCIES_TOTAL: &str = "licensehub_parser_dependencies_total";

// ─── Policy 메트릭 ──────────────────────────────────────────────────

/// Policy: 발생한 정책 위반 수 (counter, label: action)
pub const POLICY_VIOLATIONS_TOTAL: &str = "licensehub_policy_violations_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 스캔 소요 시간 히스토그램 버킷 (초)
///
/// 100ms ~ 300s 범위 (원격 파일 조회 포함)
pub const SCAN_DURATION_BUCKETS: [f64; 9] = [0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Scan
    describe_counter!(SCAN_COMPLETED_TOTAL, "Total number of full scans completed");
    describe_counter!(
        SCAN_REPOS_SCANNED_TOTAL,
        "Total number of repositories scanned successfully"
    );
    describe_counter!(
        SCAN_REPOS_FAILED_TOTAL,
        "Total number of repositories whose scan failed"
    );
    describe_counter!(
        SCAN_FILES_SKIPPED_TOTAL,
        "Total number of manifest files skipped (empty, too large or unreadable)"
    );
    describe_histogram!(
        SCAN_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time to complete a full scan in seconds"
    );

    // Parser
    describe_counter!(
        PARSER_MANIFESTS_PARSED_TOTAL,
        "Total number of manifest files handed to a parser"
    );
    describe_counter!(
        PARSER_DEPENDENCIES_TOTAL,
        "Total number of declared dependencies extracted from manifests"
    );

    // Policy
    describe_counter!(
        POLICY_VIOLATIONS_TOTAL,
        "Total number of policy violations raised"
    );
}
