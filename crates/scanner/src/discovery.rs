//! 매니페스트 파일 탐색 -- 의존성 파일 패턴과 제외 경로
//!
//! 저장소 아이템 목록에서 스캔 대상 매니페스트 경로만 골라냅니다.
//! 패턴은 모두 대소문자를 구분하지 않으며 경로 끝에 고정됩니다.

use std::sync::LazyLock;

use regex::RegexSet;

/// 스캔 대상 매니페스트 파일 패턴 (정규식 소스)
pub const DEPENDENCY_FILE_PATTERNS: [&str; 13] = [
    r"(?i)\.csproj$",
    r"(?i)packages\.config$",
    r"(?i)Directory\.Packages\.props$",
    r"(?i)\.nuspec$",
    r"(?i)package\.json$",
    r"(?i)package-lock\.json$",
    r"(?i)go\.mod$",
    r"(?i)requirements.*\.txt$",
    r"(?i)pyproject\.toml$",
    r"(?i)setup\.py$",
    r"(?i)setup\.cfg$",
    r"(?i)Pipfile$",
    r"(?i)pom\.xml$",
];

/// 탐색에서 제외하는 경로 조각
///
/// 벤더링/빌드 산출물 디렉토리를 가리킵니다.
pub const SKIP_PATTERNS: [&str; 9] = [
    "node_modules/",
    "vendor/",
    ".git/",
    "dist/",
    "bin/",
    "obj/",
    ".vs/",
    "packages/",
    "TestResults/",
];

static DEPENDENCY_FILES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(DEPENDENCY_FILE_PATTERNS).expect("dependency file patterns are valid regexes")
});

/// 저장소 트리의 아이템 (파일 또는 폴더)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryItem {
    /// 저장소 루트 기준 경로 (예: `/src/App/App.csproj`)
    pub path: String,
    /// 폴더 여부
    pub is_folder: bool,
}

impl RepositoryItem {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: false,
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: true,
        }
    }
}

/// 경로가 의존성 매니페스트 패턴 중 하나와 일치하는지 확인합니다.
pub fn is_dependency_file(path: &str) -> bool {
    DEPENDENCY_FILES.is_match(path)
}

/// 경로가 제외 대상 디렉토리를 포함하는지 확인합니다 (대소문자 무시).
///
/// Windows 구분자(`\`)도 `/`로 간주합니다.
pub fn is_skipped_path(path: &str) -> bool {
    let path = path.replace('\\', "/").to_lowercase();
    SKIP_PATTERNS
        .iter()
        .any(|skip| path.contains(&skip.to_lowercase()))
}

/// 아이템 목록에서 스캔할 매니페스트 경로를 골라냅니다.
///
/// 폴더가 아니고, 제외 경로에 속하지 않으며, 매니페스트 패턴과 일치하는
/// 항목만 입력 순서대로 반환합니다.
pub fn discover_manifests(items: &[RepositoryItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| !item.is_folder)
        .filter(|item| !is_skipped_path(&item.path))
        .filter(|item| is_dependency_file(&item.path))
        .map(|item| item.path.clone())
        .collect()
}
