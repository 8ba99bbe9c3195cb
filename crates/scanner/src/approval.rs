//! 승인 패키지 확인
//!
//! 승인 레지스트리는 두 종류의 항목을 가집니다.
//!
//! - `packages`: 생태계 + 정확한 이름 (대소문자 무시) -> [`ApprovalStatus::Approved`]
//! - `auto_approval_rules`: 생태계 + `*` 와일드카드 패턴 -> [`ApprovalStatus::AutoApproved`]
//!
//! 패턴은 `*`만 와일드카드로 취급하며 나머지 문자는 문자 그대로 비교합니다.
//! 패턴 전체가 이름 전체와 일치해야 합니다 (예: `Microsoft.*`).

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{Ecosystem, ResolvedDependency};

/// 명시적으로 승인된 패키지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedPackageEntry {
    pub name: String,
    pub ecosystem: Ecosystem,
    pub approved_by: String,
    /// 승인 시각 (RFC 3339)
    pub approved_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 패턴 기반 자동 승인 규칙
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoApprovalRule {
    /// `*` 와일드카드 패턴
    pub pattern: String,
    pub ecosystem: Ecosystem,
    pub approved_by: String,
    pub approved_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 승인 레지스트리
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedPackagesRegistry {
    #[serde(default)]
    pub packages: Vec<ApprovedPackageEntry>,
    #[serde(default)]
    pub auto_approval_rules: Vec<AutoApprovalRule>,
}

/// 승인 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalStatus {
    Approved,
    AutoApproved,
    Unapproved,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::AutoApproved => write!(f, "auto-approved"),
            Self::Unapproved => write!(f, "unapproved"),
        }
    }
}

/// 승인 맵의 키: `(이름, 생태계, 버전)`
pub type ApprovalKey = (String, Ecosystem, String);

/// `*` 글롭 패턴을 대소문자 무시, 전체 일치 정규식으로 변환합니다.
///
/// 패턴이 정규식 크기 제한을 넘으면 `None`.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    match RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern, error = %e, "ignoring unusable auto-approval pattern");
            None
        }
    }
}

/// 레지스트리의 규칙을 한 번만 컴파일해 둔 검사기
struct CompiledRegistry {
    explicit: HashSet<(Ecosystem, String)>,
    rules: Vec<(Ecosystem, Regex)>,
}

impl CompiledRegistry {
    fn new(registry: &ApprovedPackagesRegistry) -> Self {
        Self {
            explicit: registry
                .packages
                .iter()
                .map(|p| (p.ecosystem, p.name.to_lowercase()))
                .collect(),
            rules: registry
                .auto_approval_rules
                .iter()
                .filter_map(|r| compile_pattern(&r.pattern).map(|re| (r.ecosystem, re)))
                .collect(),
        }
    }

    fn status(&self, name: &str, ecosystem: Ecosystem) -> ApprovalStatus {
        if self.explicit.contains(&(ecosystem, name.to_lowercase())) {
            return ApprovalStatus::Approved;
        }
        if self
            .rules
            .iter()
            .any(|(eco, re)| *eco == ecosystem && re.is_match(name))
        {
            return ApprovalStatus::AutoApproved;
        }
        ApprovalStatus::Unapproved
    }
}

/// 의존성 하나의 승인 상태를 확인합니다.
pub fn approval_status(
    dep: &ResolvedDependency,
    registry: &ApprovedPackagesRegistry,
) -> ApprovalStatus {
    CompiledRegistry::new(registry).status(dep.name(), dep.ecosystem())
}

/// 여러 의존성의 승인 상태를 한 번에 계산합니다.
///
/// 규칙 패턴은 한 번만 컴파일됩니다.
pub fn build_approval_map(
    deps: &[ResolvedDependency],
    registry: &ApprovedPackagesRegistry,
) -> HashMap<ApprovalKey, ApprovalStatus> {
    let compiled = CompiledRegistry::new(registry);
    deps.iter()
        .map(|dep| {
            let key = (
                dep.name().to_owned(),
                dep.ecosystem(),
                dep.version().to_owned(),
            );
            (key, compiled.status(dep.name(), dep.ecosystem()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DependencyScope, LicenseCategory, ParsedDependency};

    fn resolved(name: &str, ecosystem: Ecosystem) -> ResolvedDependency {
        ResolvedDependency {
            dependency: ParsedDependency::new(name, "1.0.0", ecosystem, DependencyScope::Runtime, "/f"),
            license: "MIT".to_owned(),
            license_category: LicenseCategory::Permissive,
        }
    }

    fn registry() -> ApprovedPackagesRegistry {
        ApprovedPackagesRegistry {
            packages: vec![ApprovedPackageEntry {
                name: "Newtonsoft.Json".to_owned(),
                ecosystem: Ecosystem::NuGet,
                approved_by: "legal@contoso.com".to_owned(),
                approved_at: "2024-05-01T00:00:00Z".to_owned(),
                reason: None,
            }],
            auto_approval_rules: vec![AutoApprovalRule {
                pattern: "Microsoft.*".to_owned(),
                ecosystem: Ecosystem::NuGet,
                approved_by: "legal@contoso.com".to_owned(),
                approved_at: "2024-05-01T00:00:00Z".to_owned(),
                reason: Some("first-party".to_owned()),
            }],
        }
    }

    #[test]
    fn explicit_entry_is_approved_case_insensitively() {
        let dep = resolved("newtonsoft.json", Ecosystem::NuGet);
        assert_eq!(approval_status(&dep, &registry()), ApprovalStatus::Approved);
    }

    #[test]
    fn wildcard_rule_auto_approves() {
        let dep = resolved("microsoft.Extensions.Logging", Ecosystem::NuGet);
        assert_eq!(approval_status(&dep, &registry()), ApprovalStatus::AutoApproved);
    }

    #[test]
    fn rules_are_scoped_to_ecosystem() {
        let dep = resolved("Microsoft.Extensions.Logging", Ecosystem::Npm);
        assert_eq!(approval_status(&dep, &registry()), ApprovalStatus::Unapproved);
        let dep = resolved("Newtonsoft.Json", Ecosystem::Npm);
        assert_eq!(approval_status(&dep, &registry()), ApprovalStatus::Unapproved);
    }

    #[test]
    fn pattern_is_anchored_and_literal() {
        let re = compile_pattern("Microsoft.*").unwrap();
        assert!(re.is_match("Microsoft.AspNetCore"));
        assert!(!re.is_match("NotMicrosoft.AspNetCore"));
        // '.'은 와일드카드가 아님
        assert!(!re.is_match("MicrosoftXAspNetCore"));

        let re = compile_pattern("lodash").unwrap();
        assert!(re.is_match("LODASH"));
        assert!(!re.is_match("lodash.merge"));

        let re = compile_pattern("@types/*").unwrap();
        assert!(re.is_match("@types/node"));
    }

    #[test]
    fn empty_registry_is_unapproved() {
        let dep = resolved("react", Ecosystem::Npm);
        let empty = ApprovedPackagesRegistry::default();
        assert_eq!(approval_status(&dep, &empty), ApprovalStatus::Unapproved);
    }

    #[test]
    fn approval_map_matches_single_lookups() {
        let deps = vec![
            resolved("Newtonsoft.Json", Ecosystem::NuGet),
            resolved("Microsoft.Extensions.Http", Ecosystem::NuGet),
            resolved("Serilog", Ecosystem::NuGet),
        ];
        let reg = registry();
        let map = build_approval_map(&deps, &reg);
        assert_eq!(map.len(), 3);
        for dep in &deps {
            let key = (dep.name().to_owned(), dep.ecosystem(), dep.version().to_owned());
            assert_eq!(map[&key], approval_status(dep, &reg));
        }
    }

    #[test]
    fn explicit_entry_wins_over_matching_rule() {
        let mut reg = registry();
        reg.packages.push(ApprovedPackageEntry {
            name: "Microsoft.Identity.Client".to_owned(),
            ecosystem: Ecosystem::NuGet,
            approved_by: "legal@contoso.com".to_owned(),
            approved_at: "2024-06-01T00:00:00Z".to_owned(),
            reason: None,
        });
        let dep = resolved("microsoft.identity.client", Ecosystem::NuGet);

        assert_eq!(approval_status(&dep, &reg), ApprovalStatus::Approved);
        let map = build_approval_map(std::slice::from_ref(&dep), &reg);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![ApprovalStatus::Approved]);
    }

    #[test]
    fn registry_json_shape() {
        let json = serde_json::to_value(registry()).unwrap();
        assert_eq!(json["packages"][0]["approvedBy"], "legal@contoso.com");
        assert_eq!(json["autoApprovalRules"][0]["pattern"], "Microsoft.*");
        assert_eq!(json["autoApprovalRules"][0]["ecosystem"], "nuget");

        let parsed: ApprovedPackagesRegistry = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, ApprovedPackagesRegistry::default());
    }
}
