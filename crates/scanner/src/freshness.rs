//! 버전 최신성 분석
//!
//! 외부 레지스트리 조회 없이 동작하는 자리 표시 구현입니다. 모든 의존성의 상태는
//! [`FreshnessStatus::Unknown`]이며, 분석기가 실제로 제공하는 정보는 저장소 간
//! 버전 불일치 목록([`FreshnessAnalyzer::inconsistencies`])입니다.
//!
//! 분석기는 오케스트레이터가 소유하며 오케스트레이터 태스크에서만 접근하므로
//! 동기화가 필요 없습니다.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::types::{FreshnessResult, FreshnessStatus, ResolvedDependency};

static SEMVER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)").expect("semver prefix regex is valid")
});

/// 저장소 이름 -> 관찰된 버전 집합
pub type RepoVersions = BTreeMap<String, BTreeSet<String>>;

/// 저장소 간 버전 추적기
#[derive(Debug, Default)]
pub struct FreshnessAnalyzer {
    /// `"{ecosystem}:{소문자 이름}"` -> 저장소별 버전
    versions: HashMap<String, RepoVersions>,
}

impl FreshnessAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장소의 의존성 버전을 기록하고 의존성마다 평가 결과를 반환합니다.
    pub fn analyze(&mut self, repo_name: &str, deps: &[ResolvedDependency]) -> Vec<FreshnessResult> {
        deps.iter()
            .map(|dep| {
                self.versions
                    .entry(tracking_key(dep))
                    .or_default()
                    .entry(repo_name.to_owned())
                    .or_default()
                    .insert(dep.version().to_owned());

                // 레지스트리 조회가 없으므로 최신성은 판정하지 않습니다.
                FreshnessResult {
                    dependency: dep.clone(),
                    status: FreshnessStatus::Unknown,
                    current_version: dep.version().to_owned(),
                    latest_hint: None,
                    repo_name: repo_name.to_owned(),
                }
            })
            .collect()
    }

    /// 저장소 전체에서 둘 이상의 버전이 관찰된 패키지 (키 오름차순)
    pub fn inconsistencies(&self) -> BTreeMap<String, RepoVersions> {
        self.versions
            .iter()
            .filter(|(_, repos)| {
                let distinct: BTreeSet<&String> = repos.values().flatten().collect();
                distinct.len() > 1
            })
            .map(|(key, repos)| (key.clone(), repos.clone()))
            .collect()
    }

    /// 추적 중인 패키지 수
    pub fn tracked_packages(&self) -> usize {
        self.versions.len()
    }

    /// 모든 기록을 지웁니다. 전체 스캔 시작 시 호출됩니다.
    pub fn reset(&mut self) {
        self.versions.clear();
    }
}

fn tracking_key(dep: &ResolvedDependency) -> String {
    format!("{}:{}", dep.ecosystem(), dep.name().to_lowercase())
}

/// `major.minor.patch` 접두를 파싱합니다.
///
/// 선행 `v`를 허용하고 뒤따르는 프리릴리스/빌드 문자열은 무시합니다.
pub fn parse_semver(version: &str) -> Option<Version> {
    let caps = SEMVER_PREFIX.captures(version.trim())?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;
    let patch = caps[3].parse().ok()?;
    Some(Version::new(major, minor, patch))
}

/// 버전 목록에서 semver로 해석되는 가장 높은 버전을 찾습니다.
///
/// 해석할 수 없는 버전(`^18.2.0`, `*` 등)은 비교에서 제외합니다.
pub fn highest_version<'a>(versions: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    versions
        .into_iter()
        .filter_map(|raw| parse_semver(raw).map(|v| (v, raw)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DependencyScope, Ecosystem, LicenseCategory, ParsedDependency};

    fn resolved(name: &str, version: &str) -> ResolvedDependency {
        ResolvedDependency {
            dependency: ParsedDependency::new(
                name,
                version,
                Ecosystem::Npm,
                DependencyScope::Runtime,
                "/package.json",
            ),
            license: "MIT".to_owned(),
            license_category: LicenseCategory::Permissive,
        }
    }

    #[test]
    fn highest_version_skips_unparseable() {
        let versions = ["^18.2.0", "1.10.0", "v1.9.3", "*"];
        assert_eq!(highest_version(versions), Some("1.10.0"));
        assert_eq!(highest_version(["*", "latest"]), None);
    }

    #[test]
    fn parse_semver_accepts_prefix_and_suffix() {
        assert_eq!(parse_semver("1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_semver("v0.9.1"), Some(Version::new(0, 9, 1)));
        assert_eq!(parse_semver("2.0.0-beta.1"), Some(Version::new(2, 0, 0)));
        assert_eq!(parse_semver("^18.2.0"), None);
        assert_eq!(parse_semver("1.2"), None);
        assert_eq!(parse_semver("*"), None);
    }

    #[test]
    fn analyze_returns_unknown_for_every_dependency() {
        let mut analyzer = FreshnessAnalyzer::new();
        let deps = [resolved("a", "1.0.0"), resolved("b", "0.1.0"), resolved("c", "latest")];
        let results = analyzer.analyze("web", &deps);
        assert_eq!(results.len(), 3);
        for (result, dep) in results.iter().zip(&deps) {
            assert_eq!(result.status, FreshnessStatus::Unknown);
            assert_eq!(result.current_version, dep.version());
            assert_eq!(result.repo_name, "web");
            assert!(result.latest_hint.is_none());
        }
    }

    #[test]
    fn detects_version_drift_across_repos() {
        let mut analyzer = FreshnessAnalyzer::new();
        analyzer.analyze("web", &[resolved("Lodash", "4.17.20"), resolved("react", "18.2.0")]);
        analyzer.analyze("admin", &[resolved("lodash", "4.17.21"), resolved("react", "18.2.0")]);

        let drift = analyzer.inconsistencies();
        assert_eq!(drift.len(), 1);
        let lodash = &drift["npm:lodash"];
        assert!(lodash["web"].contains("4.17.20"));
        assert!(lodash["admin"].contains("4.17.21"));
    }

    #[test]
    fn multiple_versions_in_one_repo_count_as_drift() {
        let mut analyzer = FreshnessAnalyzer::new();
        analyzer.analyze("web", &[resolved("a", "1.0.0"), resolved("a", "2.0.0")]);
        assert_eq!(analyzer.inconsistencies().len(), 1);
    }

    #[test]
    fn reset_clears_state() {
        let mut analyzer = FreshnessAnalyzer::new();
        analyzer.analyze("web", &[resolved("a", "1.0.0")]);
        analyzer.analyze("api", &[resolved("a", "1.1.0")]);
        assert_eq!(analyzer.tracked_packages(), 1);
        analyzer.reset();
        assert_eq!(analyzer.tracked_packages(), 0);
        assert!(analyzer.inconsistencies().is_empty());
    }
}
