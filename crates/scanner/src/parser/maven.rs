//! pom.xml 파서
//!
//! `<dependencyManagement>` 섹션을 먼저 제거한 뒤 남은 `<dependency>` 블록마다
//! `groupId:artifactId` 이름의 의존성을 만듭니다. `groupId`나 `artifactId`가 없는
//! 블록은 건너뜁니다. 버전은 적힌 그대로 쓰며 `${name}` 프로퍼티 참조도 치환하지 않습니다.
//!
//! 프로젝트 `<licenses>`의 첫 `<license><name>`이 정규화되어 파일의 모든 의존성에
//! 선언 라이선스로 붙습니다.

use std::sync::LazyLock;

use regex::Regex;

use super::{ManifestParser, file_name_lower, non_empty};
use crate::types::{DependencyScope, Ecosystem, ParsedDependency};

static DEPENDENCY_MANAGEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<dependencyManagement\s*>.*?</dependencyManagement\s*>")
        .expect("dependencyManagement regex is valid")
});

static DEPENDENCY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<dependency\s*>(.*?)</dependency\s*>").expect("dependency regex is valid")
});

static EXCLUSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<exclusions\s*>.*?</exclusions\s*>").expect("exclusions regex is valid")
});

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(groupId|artifactId|version|scope)\s*>\s*([^<]*?)\s*</")
        .expect("dependency field regex is valid")
});

static PROJECT_LICENSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<licenses\s*>\s*<license\s*>.*?<name\s*>([^<]+)</name\s*>")
        .expect("license regex is valid")
});

/// pom.xml 파서
pub struct MavenParser;

impl ManifestParser for MavenParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn can_parse(&self, path: &str) -> bool {
        file_name_lower(path).ends_with("pom.xml")
    }

    fn parse(&self, _repo_name: &str, file_path: &str, content: &str) -> Vec<ParsedDependency> {
        let declared_license = PROJECT_LICENSE
            .captures(content)
            .and_then(|c| non_empty(&c[1]))
            .map(|name| normalize_license_name(&name));

        let without_management = DEPENDENCY_MANAGEMENT.replace_all(content, "");

        DEPENDENCY_BLOCK
            .captures_iter(&without_management)
            .filter_map(|caps| {
                let block = EXCLUSIONS.replace_all(&caps[1], "");
                let fields = DependencyFields::from_block(&block);
                let group_id = fields.group_id?;
                let artifact_id = fields.artifact_id?;
                let version = fields.version.unwrap_or_else(|| "*".to_owned());
                Some(
                    ParsedDependency::new(
                        format!("{group_id}:{artifact_id}"),
                        version,
                        Ecosystem::Maven,
                        map_scope(fields.scope.as_deref()),
                        file_path,
                    )
                    .with_declared_license(declared_license.clone()),
                )
            })
            .collect()
    }
}

/// `<dependency>` 블록에서 뽑은 필드 (같은 태그가 여러 번 나오면 첫 값)
#[derive(Default)]
struct DependencyFields {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    scope: Option<String>,
}

impl DependencyFields {
    fn from_block(block: &str) -> Self {
        let mut fields = Self::default();
        for caps in FIELD.captures_iter(block) {
            let slot = match caps[1].to_ascii_lowercase().as_str() {
                "groupid" => &mut fields.group_id,
                "artifactid" => &mut fields.artifact_id,
                "version" => &mut fields.version,
                _ => &mut fields.scope,
            };
            if slot.is_none() {
                *slot = non_empty(&caps[2]);
            }
        }
        fields
    }
}

fn map_scope(scope: Option<&str>) -> DependencyScope {
    match scope.map(str::to_ascii_lowercase).as_deref() {
        Some("test") => DependencyScope::Test,
        Some("provided") => DependencyScope::Optional,
        _ => DependencyScope::Runtime,
    }
}

/// POM 라이선스 이름을 SPDX 식별자로 정규화합니다.
///
/// 부분 문자열 검사를 순서대로 적용하며, 어느 규칙에도 맞지 않으면 원래 이름을 반환합니다.
pub fn normalize_license_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    let spdx = if has("apache") && has("2") {
        "Apache-2.0"
    } else if has("mit") {
        "MIT"
    } else if has("bsd") && has("3") {
        "BSD-3-Clause"
    } else if has("bsd") && has("2") {
        "BSD-2-Clause"
    } else if has("eclipse public license") && has("2") {
        "EPL-2.0"
    } else if has("eclipse public license") || has("epl") {
        "EPL-1.0"
    } else if has("lgpl") && has("3") {
        "LGPL-3.0-only"
    } else if has("lgpl") && has("2") {
        "LGPL-2.1-only"
    } else if has("gpl") && has("3") {
        "GPL-3.0-only"
    } else if has("gpl") && has("2") {
        "GPL-2.0-only"
    } else if has("mozilla") || has("mpl") {
        "MPL-2.0"
    } else if has("cddl") {
        "CDDL-1.0"
    } else if has("isc") {
        "ISC"
    } else if has("unlicense") {
        "Unlicense"
    } else {
        return name.trim().to_owned();
    };
    spdx.to_owned()
}
