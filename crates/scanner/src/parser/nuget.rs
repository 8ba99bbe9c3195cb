//! NuGet 매니페스트 파서
//!
//! [`NuGetParser`]는 네 가지 NuGet 형식을 처리합니다.
//!
//! - `.csproj`: `<PackageReference Include="X" Version="Y"/>` 속성형과
//!   `<PackageReference Include="X"><Version>Y</Version></PackageReference>` 중첩형.
//!   `<PackageLicenseExpression>`이 있으면 파일의 모든 의존성에 선언 라이선스로 붙습니다.
//! - `packages.config`: `<package id="X" version="Y"/>`
//! - `Directory.Packages.props`: `<PackageVersion Include="X" Version="Y"/>` (중앙 버전 관리)
//! - `.nuspec`: `<dependencies>` 안의 `<dependency id="X" version="Y"/>`,
//!   `<license type="expression">`이 선언 라이선스가 됩니다.

use std::sync::LazyLock;

use regex::Regex;

use super::{ManifestParser, file_name_lower, non_empty, xml_attribute};
use crate::types::{DependencyScope, Ecosystem, ParsedDependency};

/// 테스트 전용 패키지로 간주하는 이름 조각 (소문자)
const TEST_PACKAGE_MARKERS: [&str; 14] = [
    "xunit",
    "nunit",
    "mstest",
    "moq",
    "nsubstitute",
    "fakeiteasy",
    "fluentassertions",
    "shouldly",
    "coverlet",
    "microsoft.net.test.sdk",
    "bogus",
    "autofixture",
    "testcontainers",
    "wiremock",
];

static PACKAGE_REFERENCE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<PackageReference\b([^>]*?)(/?)>").expect("PackageReference regex is valid")
});

static PACKAGE_REFERENCE_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<PackageReference\b([^>]*?[^/])>(.*?)</PackageReference\s*>")
        .expect("PackageReference element regex is valid")
});

static VERSION_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<Version\s*>([^<]*)</Version\s*>").expect("Version regex is valid")
});

static PACKAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<package\b([^>]*)>").expect("package regex is valid"));

static PACKAGE_VERSION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<PackageVersion\b([^>]*)>").expect("PackageVersion regex is valid")
});

static DEPENDENCIES_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<dependencies\b[^>]*>(.*?)</dependencies\s*>")
        .expect("dependencies regex is valid")
});

static DEPENDENCY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<dependency\b([^>]*)>").expect("dependency regex is valid")
});

static LICENSE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<license\s+type\s*=\s*["']expression["']\s*>([^<]+)</license\s*>"#)
        .expect("license expression regex is valid")
});

static PACKAGE_LICENSE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<PackageLicenseExpression\s*>([^<]+)</PackageLicenseExpression\s*>")
        .expect("PackageLicenseExpression regex is valid")
});

static PACKAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<PackageId\s*>([^<]+)</PackageId\s*>").expect("PackageId regex is valid")
});

static NUSPEC_METADATA_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<metadata\b[^>]*>.*?<id\s*>([^<]+)</id\s*>.*?</metadata\s*>")
        .expect("nuspec metadata regex is valid")
});

/// NuGet 매니페스트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NuGetManifest {
    Csproj,
    PackagesConfig,
    DirectoryPackagesProps,
    Nuspec,
}

impl NuGetManifest {
    fn detect(path: &str) -> Option<Self> {
        let name = file_name_lower(path);
        if name.ends_with(".csproj") {
            Some(Self::Csproj)
        } else if name.ends_with("packages.config") {
            Some(Self::PackagesConfig)
        } else if name.ends_with("directory.packages.props") {
            Some(Self::DirectoryPackagesProps)
        } else if name.ends_with(".nuspec") {
            Some(Self::Nuspec)
        } else {
            None
        }
    }
}

/// NuGet 매니페스트 파서
pub struct NuGetParser;

impl ManifestParser for NuGetParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::NuGet
    }

    fn can_parse(&self, path: &str) -> bool {
        NuGetManifest::detect(path).is_some()
    }

    fn parse(&self, _repo_name: &str, file_path: &str, content: &str) -> Vec<ParsedDependency> {
        match NuGetManifest::detect(file_path) {
            Some(NuGetManifest::Csproj) => parse_csproj(file_path, content),
            Some(NuGetManifest::PackagesConfig) => {
                parse_attribute_tags(&PACKAGE_TAG, "id", "version", file_path, content)
            }
            Some(NuGetManifest::DirectoryPackagesProps) => {
                parse_attribute_tags(&PACKAGE_VERSION_TAG, "Include", "Version", file_path, content)
            }
            Some(NuGetManifest::Nuspec) => parse_nuspec(file_path, content),
            None => Vec::new(),
        }
    }
}

impl NuGetParser {
    /// 이 파일이 스스로 배포하는 패키지 ID를 반환합니다.
    ///
    /// `.nuspec`의 `<metadata><id>`, `.csproj`의 `<PackageId>`를 읽습니다.
    /// 저장소가 내부에서 만든 패키지를 식별하는 데 사용됩니다.
    pub fn produced_package_ids(file_path: &str, content: &str) -> Vec<String> {
        let regex = match NuGetManifest::detect(file_path) {
            Some(NuGetManifest::Nuspec) => &NUSPEC_METADATA_ID,
            Some(NuGetManifest::Csproj) => &PACKAGE_ID,
            _ => return Vec::new(),
        };
        regex
            .captures(content)
            .and_then(|caps| non_empty(&caps[1]))
            .into_iter()
            .collect()
    }
}

fn scope_for(name: &str) -> DependencyScope {
    let lower = name.to_lowercase();
    if TEST_PACKAGE_MARKERS.iter().any(|m| lower.contains(m)) {
        DependencyScope::Test
    } else {
        DependencyScope::Runtime
    }
}

fn nuget_dependency(
    name: String,
    version: Option<String>,
    scope: DependencyScope,
    file_path: &str,
    license: Option<&String>,
) -> ParsedDependency {
    ParsedDependency::new(
        name,
        version.unwrap_or_else(|| "*".to_owned()),
        Ecosystem::NuGet,
        scope,
        file_path,
    )
    .with_declared_license(license.cloned())
}

fn parse_csproj(file_path: &str, content: &str) -> Vec<ParsedDependency> {
    let license = PACKAGE_LICENSE_EXPRESSION
        .captures(content)
        .and_then(|caps| non_empty(&caps[1]));

    let mut deps: Vec<ParsedDependency> = Vec::new();

    // 1차: 자기 닫힘 태그 또는 Version 속성을 가진 시작 태그
    for caps in PACKAGE_REFERENCE_TAG.captures_iter(content) {
        let attrs = &caps[1];
        let self_closing = !caps[2].is_empty();
        let version = xml_attribute(attrs, "Version");
        if !self_closing && version.is_none() {
            // 중첩형은 2차에서 처리
            continue;
        }
        let Some(name) = xml_attribute(attrs, "Include").filter(|n| !n.is_empty()) else {
            continue;
        };
        let scope = scope_for(&name);
        deps.push(nuget_dependency(
            name,
            version,
            scope,
            file_path,
            license.as_ref(),
        ));
    }

    // 2차: <Version> 자식 요소를 가진 중첩형, 이미 잡은 이름은 제외
    for caps in PACKAGE_REFERENCE_ELEMENT.captures_iter(content) {
        let Some(name) = xml_attribute(&caps[1], "Include").filter(|n| !n.is_empty()) else {
            continue;
        };
        if deps.iter().any(|d| d.name.eq_ignore_ascii_case(&name)) {
            continue;
        }
        let version = VERSION_ELEMENT
            .captures(&caps[2])
            .and_then(|v| non_empty(&v[1]));
        let scope = scope_for(&name);
        deps.push(nuget_dependency(
            name,
            version,
            scope,
            file_path,
            license.as_ref(),
        ));
    }

    deps
}

fn parse_attribute_tags(
    tag: &Regex,
    name_attr: &str,
    version_attr: &str,
    file_path: &str,
    content: &str,
) -> Vec<ParsedDependency> {
    tag.captures_iter(content)
        .filter_map(|caps| {
            let attrs = &caps[1];
            let name = xml_attribute(attrs, name_attr).filter(|n| !n.is_empty())?;
            let version = xml_attribute(attrs, version_attr);
            let scope = scope_for(&name);
            Some(nuget_dependency(name, version, scope, file_path, None))
        })
        .collect()
}

fn parse_nuspec(file_path: &str, content: &str) -> Vec<ParsedDependency> {
    let license = LICENSE_EXPRESSION
        .captures(content)
        .and_then(|caps| non_empty(&caps[1]));

    DEPENDENCIES_BLOCK
        .captures_iter(content)
        .flat_map(|block| {
            DEPENDENCY_TAG
                .captures_iter(block.get(1).map_or("", |m| m.as_str()))
                .filter_map(|caps| {
                    let attrs = &caps[1];
                    let name = xml_attribute(attrs, "id").filter(|n| !n.is_empty())?;
                    let version = xml_attribute(attrs, "version");
                    Some(nuget_dependency(
                        name,
                        version,
                        DependencyScope::Runtime,
                        file_path,
                        license.as_ref(),
                    ))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
