//! 저장소 단위 의존성 중복 제거
//!
//! 같은 패키지가 여러 매니페스트(예: `package.json`과 `package-lock.json`)에
//! 선언되면 `(생태계, 소문자 이름)` 기준으로 처음 나온 항목만 남깁니다.

use std::collections::HashSet;

use crate::types::{Ecosystem, ParsedDependency};

/// 중복 제거 키
fn dedup_key(dep: &ParsedDependency) -> (Ecosystem, String) {
    (dep.ecosystem, dep.name.to_lowercase())
}

/// 첫 등장 순서를 유지하며 중복을 제거합니다.
pub fn deduplicate(deps: Vec<ParsedDependency>) -> Vec<ParsedDependency> {
    let mut seen = HashSet::with_capacity(deps.len());
    deps.into_iter()
        .filter(|dep| seen.insert(dedup_key(dep)))
        .collect()
}
