//! 라이선스 정책 평가
//!
//! [`PolicyEngine`]은 해석된 의존성마다 다음 우선순위로 액션을 정합니다.
//!
//! 1. `excluded_packages`에 이름이 있으면 평가하지 않음 (대소문자 무시, 생태계 무관)
//! 2. `specific_overrides`에서 라이선스 ID가 일치하는 첫 항목 (대소문자 무시)
//! 3. 분류별 기본 액션 `category_defaults`
//!
//! `Warn`/`Block`만 [`PolicyViolation`]을 만듭니다.
//!
//! # 저장 형식
//!
//! ```json
//! {
//!   "categoryDefaults": {
//!     "permissive": "allow",
//!     "weak-copyleft": "warn",
//!     "strong-copyleft": "block",
//!     "proprietary": "warn",
//!     "unknown": "warn"
//!   },
//!   "specificOverrides": [{ "licenseId": "LGPL-2.1-only", "action": "allow" }],
//!   "excludedPackages": ["internal-sdk"]
//! }
//! ```

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use licensehub_core::metrics as m;

use crate::types::{LicenseCategory, PolicyAction, PolicyViolation, ResolvedDependency};

/// 분류별 기본 액션
///
/// 분류마다 필드가 하나씩 있으므로 액션이 빠진 분류는 존재할 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CategoryDefaults {
    pub permissive: PolicyAction,
    pub weak_copyleft: PolicyAction,
    pub strong_copyleft: PolicyAction,
    pub proprietary: PolicyAction,
    pub unknown: PolicyAction,
}

impl CategoryDefaults {
    /// 분류의 기본 액션을 반환합니다.
    pub fn action_for(&self, category: LicenseCategory) -> PolicyAction {
        match category {
            LicenseCategory::Permissive => self.permissive,
            LicenseCategory::WeakCopyleft => self.weak_copyleft,
            LicenseCategory::StrongCopyleft => self.strong_copyleft,
            LicenseCategory::Proprietary => self.proprietary,
            LicenseCategory::Unknown => self.unknown,
        }
    }

    /// 분류의 기본 액션을 변경합니다.
    pub fn set(&mut self, category: LicenseCategory, action: PolicyAction) {
        let slot = match category {
            LicenseCategory::Permissive => &mut self.permissive,
            LicenseCategory::WeakCopyleft => &mut self.weak_copyleft,
            LicenseCategory::StrongCopyleft => &mut self.strong_copyleft,
            LicenseCategory::Proprietary => &mut self.proprietary,
            LicenseCategory::Unknown => &mut self.unknown,
        };
        *slot = action;
    }
}

impl Default for CategoryDefaults {
    fn default() -> Self {
        Self {
            permissive: PolicyAction::Allow,
            weak_copyleft: PolicyAction::Warn,
            strong_copyleft: PolicyAction::Block,
            proprietary: PolicyAction::Warn,
            unknown: PolicyAction::Warn,
        }
    }
}

/// 특정 라이선스 ID에 대한 액션 재정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseOverride {
    pub license_id: String,
    pub action: PolicyAction,
}

impl LicenseOverride {
    pub fn new(license_id: impl Into<String>, action: PolicyAction) -> Self {
        Self {
            license_id: license_id.into(),
            action,
        }
    }
}

/// 라이선스 정책
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensePolicy {
    #[serde(default)]
    pub category_defaults: CategoryDefaults,
    /// 순서대로 검사하며 첫 일치 항목이 적용됩니다.
    #[serde(default)]
    pub specific_overrides: Vec<LicenseOverride>,
    /// 평가에서 제외할 패키지 이름
    #[serde(default)]
    pub excluded_packages: Vec<String>,
}

impl LicensePolicy {
    /// 패키지가 제외 목록에 있는지 확인합니다.
    pub fn is_excluded(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.excluded_packages
            .iter()
            .any(|p| p.to_lowercase() == name)
    }

    /// 라이선스 ID에 일치하는 첫 재정의를 찾습니다.
    pub fn override_for(&self, license: &str) -> Option<&LicenseOverride> {
        let license = license.to_lowercase();
        self.specific_overrides
            .iter()
            .find(|o| o.license_id.to_lowercase() == license)
    }
}

/// 정책 엔진
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    policy: LicensePolicy,
}

impl PolicyEngine {
    /// 주어진 정책으로 엔진을 생성합니다.
    pub fn new(policy: LicensePolicy) -> Self {
        Self { policy }
    }

    /// 현재 정책
    pub fn policy(&self) -> &LicensePolicy {
        &self.policy
    }

    /// 정책을 교체합니다. 이후 `evaluate` 호출부터 적용됩니다.
    pub fn set_policy(&mut self, policy: LicensePolicy) {
        self.policy = policy;
    }

    /// 의존성 하나에 적용될 액션. 제외된 패키지는 `None`.
    pub fn action_for(&self, dep: &ResolvedDependency) -> Option<PolicyAction> {
        if self.policy.is_excluded(dep.name()) {
            return None;
        }
        Some(
            self.policy
                .override_for(&dep.license)
                .map(|o| o.action)
                .unwrap_or_else(|| {
                    self.policy
                        .category_defaults
                        .action_for(dep.license_category)
                }),
        )
    }

    /// 저장소의 의존성을 평가하여 위반 목록을 반환합니다.
    ///
    /// 위반은 입력 순서를 따릅니다.
    pub fn evaluate(&self, repo_name: &str, deps: &[ResolvedDependency]) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();
        for dep in deps {
            let Some(action) = self.action_for(dep) else {
                debug!(repo = repo_name, package = dep.name(), "package excluded from policy");
                continue;
            };
            if action == PolicyAction::Allow {
                continue;
            }
            counter!(m::POLICY_VIOLATIONS_TOTAL, m::LABEL_ACTION => action.to_string())
                .increment(1);
            violations.push(PolicyViolation {
                dependency: dep.clone(),
                action,
                reason: violation_reason(dep, action),
                repo_name: repo_name.to_owned(),
            });
        }
        violations
    }
}

fn violation_reason(dep: &ResolvedDependency, action: PolicyAction) -> String {
    let verb = if action == PolicyAction::Block {
        "blocked"
    } else {
        "flagged"
    };
    if dep.license_category == LicenseCategory::Unknown {
        return format!(
            "Unknown license for {}@{} — {verb} by policy",
            dep.name(),
            dep.version()
        );
    }
    format!(
        "{} license {} on {}@{} — {verb} by policy",
        dep.license_category.label(),
        dep.license,
        dep.name(),
        dep.version()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DependencyScope, Ecosystem, ParsedDependency};

    fn resolved(name: &str, license: &str, category: LicenseCategory) -> ResolvedDependency {
        ResolvedDependency {
            dependency: ParsedDependency::new(
                name,
                "1.0.0",
                Ecosystem::Npm,
                DependencyScope::Runtime,
                "/package.json",
            ),
            license: license.to_owned(),
            license_category: category,
        }
    }

    #[test]
    fn default_policy_actions() {
        let defaults = CategoryDefaults::default();
        assert_eq!(defaults.action_for(LicenseCategory::Permissive), PolicyAction::Allow);
        assert_eq!(defaults.action_for(LicenseCategory::WeakCopyleft), PolicyAction::Warn);
        assert_eq!(defaults.action_for(LicenseCategory::StrongCopyleft), PolicyAction::Block);
        assert_eq!(defaults.action_for(LicenseCategory::Proprietary), PolicyAction::Warn);
        assert_eq!(defaults.action_for(LicenseCategory::Unknown), PolicyAction::Warn);

        let policy = LicensePolicy::default();
        assert!(policy.specific_overrides.is_empty());
        assert!(policy.excluded_packages.is_empty());
    }

    #[test]
    fn every_category_has_an_action() {
        let defaults = CategoryDefaults::default();
        for category in LicenseCategory::ALL {
            // 모든 분류에서 호출 가능해야 함
            let _ = defaults.action_for(category);
        }
    }

    #[test]
    fn empty_dependency_list_yields_no_violations() {
        assert!(PolicyEngine::default().evaluate("repo", &[]).is_empty());
    }

    #[test]
    fn gpl_dependency_is_blocked_with_reason() {
        let engine = PolicyEngine::default();
        let deps = [resolved("foo", "GPL-3.0-only", LicenseCategory::StrongCopyleft)];
        let violations = engine.evaluate("web", &deps);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].action, PolicyAction::Block);
        assert_eq!(violations[0].repo_name, "web");
        assert_eq!(
            violations[0].reason,
            "Strong copyleft license GPL-3.0-only on foo@1.0.0 — blocked by policy"
        );
    }

    #[test]
    fn unknown_license_is_flagged() {
        let engine = PolicyEngine::default();
        let deps = [resolved("mystery", "Unknown", LicenseCategory::Unknown)];
        let violations = engine.evaluate("web", &deps);
        assert_eq!(violations[0].action, PolicyAction::Warn);
        assert_eq!(
            violations[0].reason,
            "Unknown license for mystery@1.0.0 — flagged by policy"
        );
    }

    #[test]
    fn permissive_dependency_is_allowed() {
        let engine = PolicyEngine::default();
        let deps = [resolved("react", "MIT", LicenseCategory::Permissive)];
        assert!(engine.evaluate("web", &deps).is_empty());
    }

    #[test]
    fn override_beats_category_default() {
        let mut policy = LicensePolicy::default();
        policy
            .specific_overrides
            .push(LicenseOverride::new("gpl-3.0-only", PolicyAction::Allow));
        let engine = PolicyEngine::new(policy);
        let deps = [resolved("foo", "GPL-3.0-only", LicenseCategory::StrongCopyleft)];
        assert!(engine.evaluate("web", &deps).is_empty());
    }

    #[test]
    fn first_matching_override_wins() {
        let mut policy = LicensePolicy::default();
        policy.specific_overrides = vec![
            LicenseOverride::new("MIT", PolicyAction::Block),
            LicenseOverride::new("MIT", PolicyAction::Allow),
        ];
        let engine = PolicyEngine::new(policy);
        let deps = [resolved("react", "MIT", LicenseCategory::Permissive)];
        let violations = engine.evaluate("web", &deps);
        assert_eq!(violations[0].action, PolicyAction::Block);
        assert_eq!(
            violations[0].reason,
            "Permissive license MIT on react@1.0.0 — blocked by policy"
        );
    }

    #[test]
    fn exclusion_beats_override() {
        let mut policy = LicensePolicy::default();
        policy
            .specific_overrides
            .push(LicenseOverride::new("MIT", PolicyAction::Block));
        policy.excluded_packages.push("REACT".to_owned());
        let engine = PolicyEngine::new(policy);
        let deps = [resolved("react", "MIT", LicenseCategory::Permissive)];
        assert!(engine.evaluate("web", &deps).is_empty());
        assert_eq!(engine.action_for(&deps[0]), None);
    }

    #[test]
    fn set_policy_applies_to_next_evaluation() {
        let mut engine = PolicyEngine::default();
        let deps = [resolved("lib", "MPL-2.0", LicenseCategory::WeakCopyleft)];
        assert_eq!(engine.evaluate("r", &deps).len(), 1);

        let mut policy = LicensePolicy::default();
        policy
            .category_defaults
            .set(LicenseCategory::WeakCopyleft, PolicyAction::Allow);
        engine.set_policy(policy);
        assert!(engine.evaluate("r", &deps).is_empty());
    }

    #[test]
    fn policy_json_uses_camel_case_and_kebab_categories() {
        let json = serde_json::to_value(LicensePolicy::default()).unwrap();
        assert_eq!(json["categoryDefaults"]["strong-copyleft"], "block");
        assert!(json["specificOverrides"].is_array());
        assert!(json["excludedPackages"].is_array());

        let parsed: LicensePolicy = serde_json::from_str(
            r#"{"specificOverrides":[{"licenseId":"MIT","action":"warn"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.category_defaults, CategoryDefaults::default());
        assert_eq!(parsed.specific_overrides[0].action, PolicyAction::Warn);
    }
}
