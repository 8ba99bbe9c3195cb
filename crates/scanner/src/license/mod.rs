//! 라이선스 해석 -- 선언 라이선스 정규화, 알려진 패키지 조회, 분류
//!
//! [`LicenseResolver`]는 세 단계로 라이선스를 결정합니다.
//!
//! 1. 매니페스트의 `declared_license`가 있으면 SPDX ID로 정규화
//! 2. 없으면 정적 테이블에서 `(생태계, 소문자 이름)` 조회
//! 3. 둘 다 없으면 `"Unknown"`
//!
//! 분류는 정규화된 ID로 [`registry::category_of`]를 조회하며, 테이블에 없는 ID는
//! [`LicenseCategory::Unknown`]이 됩니다. 해석 실패는 오류가 아니라 데이터입니다.

pub mod registry;

use crate::types::{LicenseCategory, ParsedDependency, ResolvedDependency};

/// 라이선스를 확인할 수 없을 때의 값
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// 라이선스 해석기
///
/// 상태가 없으며 여러 태스크에서 공유할 수 있습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseResolver;

impl LicenseResolver {
    pub fn new() -> Self {
        Self
    }

    /// 의존성 목록의 라이선스를 해석합니다.
    ///
    /// 입력과 같은 길이, 같은 순서의 결과를 반환합니다.
    pub fn resolve(&self, deps: &[ParsedDependency]) -> Vec<ResolvedDependency> {
        deps.iter().map(|dep| self.resolve_one(dep)).collect()
    }

    /// 의존성 하나의 라이선스를 해석합니다.
    pub fn resolve_one(&self, dep: &ParsedDependency) -> ResolvedDependency {
        let license = resolve_license(dep);
        let license_category = categorize(&license);
        ResolvedDependency {
            dependency: dep.clone(),
            license,
            license_category,
        }
    }
}

fn resolve_license(dep: &ParsedDependency) -> String {
    if let Some(declared) = dep.declared_license.as_deref()
        && !declared.trim().is_empty()
    {
        return normalize_license(declared);
    }

    registry::known_license(dep.ecosystem, &dep.name)
        .unwrap_or(UNKNOWN_LICENSE)
        .to_owned()
}

/// 라이선스 ID의 분류를 반환합니다.
pub fn categorize(license: &str) -> LicenseCategory {
    if license == UNKNOWN_LICENSE {
        return LicenseCategory::Unknown;
    }
    registry::category_of(license).unwrap_or(LicenseCategory::Unknown)
}

/// 자유 형식 라이선스 문자열을 SPDX ID로 정규화합니다.
///
/// 분류 테이블에 정확히 있는 ID는 그대로 반환합니다. 그 외에는 [`registry::LICENSE_ALIASES`]의
/// 정확한 표기 변형, 이어서 부분 문자열 규칙을 순서대로 검사하고, 어느 것에도 맞지 않으면 공백만 제거한 원문을 반환합니다.
/// SPDX 표현식(`MIT OR Apache-2.0`)은 해석하지 않습니다.
pub fn normalize_license(raw: &str) -> String {
    let trimmed = raw.trim();
    if registry::is_known_id(trimmed) {
        return trimmed.to_owned();
    }

    let lower = trimmed.to_lowercase();
    if let Some((_, spdx)) = registry::LICENSE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
    {
        return (*spdx).to_owned();
    }

    let has = |needle: &str| lower.contains(needle);
    let spdx = if has("apache") && has("2") {
        "Apache-2.0"
    } else if has("lgpl") && has("3") {
        "LGPL-3.0-only"
    } else if has("lgpl") && has("2") {
        "LGPL-2.1-only"
    } else if has("agpl") && has("3") {
        "AGPL-3.0-only"
    } else if has("gpl") && has("3") {
        "GPL-3.0-only"
    } else if has("gpl") && has("2") {
        "GPL-2.0-only"
    } else if has("mozilla") || has("mpl-2") {
        "MPL-2.0"
    } else if has("eclipse") && has("2") {
        "EPL-2.0"
    } else if has("eclipse") || has("epl") {
        "EPL-1.0"
    } else if has("creative commons zero") {
        "CC0-1.0"
    } else {
        return trimmed.to_owned();
    };
    spdx.to_owned()
}
