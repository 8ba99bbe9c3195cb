//! 도메인 타입 -- 의존성, 라이선스, 정책 위반, 스캔 결과
//!
//! 파서가 만드는 [`ParsedDependency`]부터 오케스트레이터가 반환하는
//! [`FullScanResult`]까지 파이프라인 전 구간에서 공유하는 데이터 구조입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sbom::CycloneDxBom;

/// 패키지 생태계 (언어/패키지 관리자)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// .NET (csproj, packages.config, Directory.Packages.props, nuspec)
    NuGet,
    /// JavaScript/TypeScript (package.json, package-lock.json)
    Npm,
    /// Go modules (go.mod)
    Go,
    /// Python (requirements*.txt, pyproject.toml, setup.py, setup.cfg, Pipfile)
    Python,
    /// Java (pom.xml)
    Maven,
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ecosystem {
    /// 모든 생태계 (고정 순서)
    pub const ALL: [Ecosystem; 5] = [
        Ecosystem::NuGet,
        Ecosystem::Npm,
        Ecosystem::Go,
        Ecosystem::Python,
        Ecosystem::Maven,
    ];

    /// 직렬화 이름과 동일한 소문자 식별자를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NuGet => "nuget",
            Self::Npm => "npm",
            Self::Go => "go",
            Self::Python => "python",
            Self::Maven => "maven",
        }
    }

    /// 생태계에 대응하는 Package URL 타입을 반환합니다.
    ///
    /// 예: Go -> "golang", Python -> "pypi"
    pub fn purl_type(&self) -> &'static str {
        match self {
            Self::NuGet => "nuget",
            Self::Npm => "npm",
            Self::Go => "golang",
            Self::Python => "pypi",
            Self::Maven => "maven",
        }
    }

    /// 문자열에서 생태계를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nuget" | "dotnet" | ".net" => Some(Self::NuGet),
            "npm" | "node" | "javascript" | "js" => Some(Self::Npm),
            "go" | "golang" => Some(Self::Go),
            "python" | "pip" | "pypi" => Some(Self::Python),
            "maven" | "java" => Some(Self::Maven),
            _ => None,
        }
    }
}

/// 의존성 선언 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    Runtime,
    Dev,
    Peer,
    Optional,
    Test,
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime => write!(f, "runtime"),
            Self::Dev => write!(f, "dev"),
            Self::Peer => write!(f, "peer"),
            Self::Optional => write!(f, "optional"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// 라이선스 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenseCategory {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    Proprietary,
    Unknown,
}

impl LicenseCategory {
    /// 모든 분류 (고정 순서)
    pub const ALL: [LicenseCategory; 5] = [
        LicenseCategory::Permissive,
        LicenseCategory::WeakCopyleft,
        LicenseCategory::StrongCopyleft,
        LicenseCategory::Proprietary,
        LicenseCategory::Unknown,
    ];

    /// 사람이 읽는 표시 이름
    ///
    /// 정책 위반 사유 문자열에 그대로 쓰입니다.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Permissive => "Permissive",
            Self::WeakCopyleft => "Weak copyleft",
            Self::StrongCopyleft => "Strong copyleft",
            Self::Proprietary => "Proprietary",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::WeakCopyleft => write!(f, "weak-copyleft"),
            Self::StrongCopyleft => write!(f, "strong-copyleft"),
            Self::Proprietary => write!(f, "proprietary"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// 정책 평가 결과 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Warn,
    Block,
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Warn => write!(f, "warn"),
            Self::Block => write!(f, "block"),
        }
    }
}

impl PolicyAction {
    /// 문자열에서 액션을 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "allow" | "pass" => Some(Self::Allow),
            "warn" | "warning" | "flag" => Some(Self::Warn),
            "block" | "deny" => Some(Self::Block),
            _ => None,
        }
    }
}

/// 매니페스트에서 추출한 선언 의존성
///
/// 파일의 선언 하나당 한 번 생성되며 이후 변경되지 않습니다.
/// `declared_license`는 *프로젝트 자신의* 라이선스를 해당 파일의 의존성에
/// 붙인 추정 신호일 뿐, 의존성의 실제 라이선스를 보장하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDependency {
    /// 패키지 이름 (생태계 규칙에 따라 정규화될 수 있음)
    pub name: String,
    /// 선언된 버전 토큰, 없으면 `"*"`
    pub version: String,
    /// 패키지 생태계
    pub ecosystem: Ecosystem,
    /// 선언 범위
    pub scope: DependencyScope,
    /// 선언이 발견된 파일 경로
    pub source_file: String,
    /// 매니페스트가 선언한 라이선스 (추정 신호)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_license: Option<String>,
}

impl ParsedDependency {
    /// 라이선스 없이 의존성을 생성합니다.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        ecosystem: Ecosystem,
        scope: DependencyScope,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ecosystem,
            scope,
            source_file: source_file.into(),
            declared_license: None,
        }
    }

    /// 선언 라이선스를 붙입니다.
    pub fn with_declared_license(mut self, license: Option<String>) -> Self {
        self.declared_license = license;
        self
    }
}

impl fmt::Display for ParsedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.ecosystem)
    }
}

/// 라이선스가 확정된 의존성
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    /// 원본 파싱 결과
    #[serde(flatten)]
    pub dependency: ParsedDependency,
    /// 정규화된 라이선스 ID, 확인 불가 시 `"Unknown"`
    pub license: String,
    /// 라이선스 분류
    pub license_category: LicenseCategory,
}

impl ResolvedDependency {
    pub fn name(&self) -> &str {
        &self.dependency.name
    }

    pub fn version(&self) -> &str {
        &self.dependency.version
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.dependency.ecosystem
    }

    pub fn scope(&self) -> DependencyScope {
        self.dependency.scope
    }
}

impl fmt::Display for ResolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.dependency, self.license)
    }
}

/// 정책 위반
///
/// 액션은 항상 `Warn` 또는 `Block` 입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyViolation {
    /// 위반 의존성
    pub dependency: ResolvedDependency,
    /// 적용된 액션
    pub action: PolicyAction,
    /// 사람이 읽는 사유
    pub reason: String,
    /// 저장소 이름
    pub repo_name: String,
}

/// 버전 최신성 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreshnessStatus {
    Current,
    MinorBehind,
    MajorBehind,
    Unknown,
}

/// 의존성별 최신성 평가 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessResult {
    pub dependency: ResolvedDependency,
    pub status: FreshnessStatus,
    pub current_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_hint: Option<String>,
    pub repo_name: String,
}

/// 저장소 단위 스캔 결과
///
/// 다음 스캔에서 통째로 교체되며 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoScanResult {
    pub repo_name: String,
    pub repo_id: String,
    pub dependencies: Vec<ResolvedDependency>,
    pub violations: Vec<PolicyViolation>,
    pub freshness: Vec<FreshnessResult>,
    pub sbom: CycloneDxBom,
    /// 스캔 완료 시각 (RFC 3339)
    pub scanned_at: String,
    /// 파서에 전달된 매니페스트 파일 수
    pub files_scanned: usize,
}

impl RepoScanResult {
    /// `Block` 액션 위반 수
    pub fn blocked_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.action == PolicyAction::Block)
            .count()
    }
}

/// 프로젝트 전체 스캔 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullScanResult {
    /// 저장소 결과 (위반 수 내림차순, 다음으로 의존성 수 내림차순)
    pub repos: Vec<RepoScanResult>,
    /// 프로젝트의 모든 저장소 이름 (실패 포함)
    pub all_repo_names: Vec<String>,
    pub total_dependencies: usize,
    pub total_violations: usize,
    /// 스캔에 실패한 저장소 이름
    pub failed_repos: Vec<String>,
    pub scan_duration_ms: u64,
}

impl FullScanResult {
    /// 저장소 결과를 정렬하고 합계를 계산하여 결과를 조립합니다.
    pub fn assemble(
        mut repos: Vec<RepoScanResult>,
        all_repo_names: Vec<String>,
        failed_repos: Vec<String>,
        scan_duration_ms: u64,
    ) -> Self {
        repos.sort_by(|a, b| {
            b.violations
                .len()
                .cmp(&a.violations.len())
                .then_with(|| b.dependencies.len().cmp(&a.dependencies.len()))
        });
        let total_dependencies = repos.iter().map(|r| r.dependencies.len()).sum();
        let total_violations = repos.iter().map(|r| r.violations.len()).sum();
        Self {
            repos,
            all_repo_names,
            total_dependencies,
            total_violations,
            failed_repos,
            scan_duration_ms,
        }
    }

    /// 전체 `Block` 위반 수
    pub fn blocked_count(&self) -> usize {
        self.repos.iter().map(RepoScanResult::blocked_count).sum()
    }
}

/// 스캔 진행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Discovery,
    Scanning,
    Resolving,
    Analyzing,
    Complete,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::Scanning => write!(f, "scanning"),
            Self::Resolving => write!(f, "resolving"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// 스캔 진행 상황 스냅샷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    pub repos_total: usize,
    pub repos_completed: usize,
    pub current_repo: Option<String>,
    pub message: String,
    pub failed_repos: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecosystem_display_matches_serde_name() {
        for eco in Ecosystem::ALL {
            let json = serde_json::to_string(&eco).unwrap();
            assert_eq!(json, format!("\"{eco}\""));
        }
    }

    #[test]
    fn ecosystem_purl_type() {
        assert_eq!(Ecosystem::NuGet.purl_type(), "nuget");
        assert_eq!(Ecosystem::Go.purl_type(), "golang");
        assert_eq!(Ecosystem::Python.purl_type(), "pypi");
        assert_eq!(Ecosystem::Maven.purl_type(), "maven");
    }

    #[test]
    fn ecosystem_from_str_loose() {
        assert_eq!(Ecosystem::from_str_loose("NuGet"), Some(Ecosystem::NuGet));
        assert_eq!(Ecosystem::from_str_loose("pypi"), Some(Ecosystem::Python));
        assert_eq!(Ecosystem::from_str_loose("golang"), Some(Ecosystem::Go));
        assert_eq!(Ecosystem::from_str_loose("cargo"), None);
    }

    #[test]
    fn license_category_serializes_kebab_case() {
        let json = serde_json::to_string(&LicenseCategory::WeakCopyleft).unwrap();
        assert_eq!(json, "\"weak-copyleft\"");
        assert_eq!(LicenseCategory::WeakCopyleft.to_string(), "weak-copyleft");
        assert_eq!(LicenseCategory::WeakCopyleft.label(), "Weak copyleft");
    }

    #[test]
    fn policy_action_from_str_loose() {
        assert_eq!(PolicyAction::from_str_loose("BLOCK"), Some(PolicyAction::Block));
        assert_eq!(PolicyAction::from_str_loose("warn"), Some(PolicyAction::Warn));
        assert_eq!(PolicyAction::from_str_loose("maybe"), None);
    }

    #[test]
    fn resolved_dependency_flattens_parsed_fields() {
        let resolved = ResolvedDependency {
            dependency: ParsedDependency::new(
                "lodash",
                "4.17.21",
                Ecosystem::Npm,
                DependencyScope::Runtime,
                "/package.json",
            ),
            license: "MIT".to_owned(),
            license_category: LicenseCategory::Permissive,
        };
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["name"], "lodash");
        assert_eq!(value["license"], "MIT");
        assert_eq!(value["license_category"], "permissive");
        assert!(value.get("declared_license").is_none());
    }

    #[test]
    fn parsed_dependency_display() {
        let dep = ParsedDependency::new(
            "Serilog",
            "3.1.1",
            Ecosystem::NuGet,
            DependencyScope::Runtime,
            "/App.csproj",
        );
        assert_eq!(dep.to_string(), "Serilog@3.1.1 (nuget)");
    }
}
