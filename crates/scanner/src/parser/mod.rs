//! 매니페스트 파서 -- csproj, package.json, go.mod, pyproject.toml, pom.xml 등
//!
//! [`ManifestParser`] trait은 각 생태계 파서가 구현해야 하는 인터페이스입니다.
//! [`ParserRegistry`]는 파일 경로에 맞는 모든 파서에 내용을 전달하고 결과를 모읍니다.
//!
//! # 지원 형식
//!
//! - NuGet: `.csproj`, `packages.config`, `Directory.Packages.props`, `.nuspec` -- [`NuGetParser`]
//! - npm: `package.json`, `package-lock.json` -- [`NpmParser`]
//! - Go: `go.mod` -- [`GoModParser`]
//! - Python: `requirements*.txt`, `pyproject.toml`, `setup.py`, `setup.cfg`, `Pipfile` -- [`PythonParser`]
//! - Maven: `pom.xml` -- [`MavenParser`]
//!
//! # 실패 처리
//!
//! 파서는 실패하지 않습니다. 형식이 깨진 입력은 해당 부분만 건너뛰고
//! 나머지에서 추출 가능한 의존성을 반환합니다. 파싱은 순수 함수이며
//! I/O를 수행하지 않습니다.

pub mod go;
pub mod maven;
pub mod npm;
pub mod nuget;
pub mod python;

use std::sync::LazyLock;

use metrics::counter;
use regex::Regex;
use tracing::debug;

use licensehub_core::metrics as m;

use crate::types::{Ecosystem, ParsedDependency};

pub use go::GoModParser;
pub use maven::MavenParser;
pub use npm::NpmParser;
pub use nuget::NuGetParser;
pub use python::PythonParser;

/// 매니페스트 파서 trait
///
/// 각 패키지 생태계의 매니페스트 형식을 파싱하여 선언 의존성 목록을 생성합니다.
pub trait ManifestParser: Send + Sync {
    /// 이 파서가 담당하는 생태계를 반환합니다.
    fn ecosystem(&self) -> Ecosystem;

    /// 주어진 경로의 파일을 이 파서가 처리할 수 있는지 확인합니다.
    ///
    /// 파일 이름 패턴으로 판별하며 대소문자를 구분하지 않습니다.
    fn can_parse(&self, path: &str) -> bool;

    /// 매니페스트 내용을 파싱하여 선언 의존성을 반환합니다.
    ///
    /// # Arguments
    ///
    /// - `repo_name`: 저장소 이름 (로그용)
    /// - `file_path`: 원본 파일 경로 (`source_file`에 기록)
    /// - `content`: 파일 내용 (UTF-8 문자열)
    fn parse(&self, repo_name: &str, file_path: &str, content: &str) -> Vec<ParsedDependency>;
}

/// 파서 레지스트리
///
/// 등록된 파서 중 경로가 일치하는 모든 파서를 실행합니다.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ManifestParser>>,
}

impl ParserRegistry {
    /// 다섯 가지 기본 파서를 등록한 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(NuGetParser),
                Box::new(NpmParser),
                Box::new(GoModParser),
                Box::new(PythonParser),
                Box::new(MavenParser),
            ],
        }
    }

    /// 파서 없이 빈 레지스트리를 생성합니다.
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// 파서를 추가 등록합니다.
    pub fn register(&mut self, parser: Box<dyn ManifestParser>) {
        self.parsers.push(parser);
    }

    /// 등록된 파서 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// 등록된 파서가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// 경로를 처리할 수 있는 파서가 하나라도 있는지 확인합니다.
    pub fn supports(&self, path: &str) -> bool {
        self.parsers.iter().any(|p| p.can_parse(path))
    }

    /// 경로에 일치하는 모든 파서로 내용을 파싱합니다.
    ///
    /// 결과는 파서 등록 순서대로 이어 붙여집니다.
    pub fn parse_file(
        &self,
        repo_name: &str,
        file_path: &str,
        content: &str,
    ) -> Vec<ParsedDependency> {
        let mut deps = Vec::new();
        for parser in self.parsers.iter().filter(|p| p.can_parse(file_path)) {
            let ecosystem = parser.ecosystem();
            let parsed = parser.parse(repo_name, file_path, content);
            debug!(
                repo = repo_name,
                path = file_path,
                ecosystem = %ecosystem,
                count = parsed.len(),
                "manifest parsed"
            );
            counter!(m::PARSER_MANIFESTS_PARSED_TOTAL, m::LABEL_ECOSYSTEM => ecosystem.as_str())
                .increment(1);
            counter!(m::PARSER_DEPENDENCIES_TOTAL, m::LABEL_ECOSYSTEM => ecosystem.as_str())
                .increment(parsed.len() as u64);
            deps.extend(parsed);
        }
        deps
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// --- 파서 공용 헬퍼 ---

/// 경로의 마지막 구성요소를 소문자로 반환합니다.
pub(crate) fn file_name_lower(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_lowercase()
}

static XML_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w.:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("xml attribute regex is valid")
});

/// XML 시작 태그의 속성 문자열에서 속성 값을 찾습니다 (이름 대소문자 무시).
pub(crate) fn xml_attribute(attrs: &str, name: &str) -> Option<String> {
    XML_ATTRIBUTE
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().to_owned())
}

/// 문자열이 비어 있지 않으면 `Some`으로 감쌉니다.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
