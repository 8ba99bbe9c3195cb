//! Python 매니페스트 파서
//!
//! [`PythonParser`]는 다섯 가지 형식을 처리합니다. 파일 종류는 소문자 파일 이름으로 판별합니다.
//!
//! | 파일 | 추출 대상 | 범위 |
//! |------|-----------|------|
//! | `requirements*.txt` | 각 줄의 요구사항 | 경로에 `dev`/`test` 포함 시 Dev, 아니면 Runtime |
//! | `pyproject.toml` | `[project] dependencies`, `[project.optional-dependencies]` | Runtime / Dev(test, testing, dev) / Optional |
//! | `setup.py` | `install_requires`, `tests_require` | Runtime / Test |
//! | `setup.cfg` | `[options] install_requires` | Runtime |
//! | `Pipfile` | `[packages]`, `[dev-packages]` | Runtime / Dev |
//!
//! 패키지 이름은 PEP 503 규칙으로 정규화됩니다 (소문자, `.`/`_`/`-` 연속은 `-` 하나로).

use std::sync::LazyLock;

use regex::Regex;

use super::{ManifestParser, file_name_lower, non_empty};
use crate::types::{DependencyScope, Ecosystem, ParsedDependency};

static REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*(?:([><=~!]+)\s*([^\s;]+))?")
        .expect("requirement regex is valid")
});

static NAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("name separator regex is valid"));

static TOML_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^("[^"]+"|'[^']+'|[A-Za-z0-9_.-]+)\s*=\s*(.*)$"#).expect("toml key regex is valid")
});

static TABLE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\[?\s*([^\[\]]+?)\s*\]\]?\s*(?:#.*)?$").expect("table header regex is valid")
});

static INLINE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\btext\s*=\s*"([^"]+)""#).expect("inline text regex is valid")
});

static INLINE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bversion\s*=\s*"([^"]*)""#).expect("inline version regex is valid")
});

static SETUP_INSTALL_REQUIRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\binstall_requires\s*=\s*").expect("install_requires regex is valid")
});

static SETUP_TESTS_REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\btests_require\s*=\s*").expect("tests_require regex is valid")
});

/// optional-dependencies 그룹 중 개발용으로 보는 이름
const DEV_GROUPS: [&str; 3] = ["test", "testing", "dev"];

/// Python 매니페스트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PythonManifest {
    Requirements,
    Pyproject,
    SetupPy,
    SetupCfg,
    Pipfile,
}

impl PythonManifest {
    fn detect(path: &str) -> Option<Self> {
        let name = file_name_lower(path);
        match name.as_str() {
            "pyproject.toml" => Some(Self::Pyproject),
            "setup.py" => Some(Self::SetupPy),
            "setup.cfg" => Some(Self::SetupCfg),
            "pipfile" => Some(Self::Pipfile),
            _ if name.starts_with("requirements") && name.ends_with(".txt") => {
                Some(Self::Requirements)
            }
            _ => None,
        }
    }
}

/// Python 매니페스트 파서
pub struct PythonParser;

impl ManifestParser for PythonParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }

    fn can_parse(&self, path: &str) -> bool {
        PythonManifest::detect(path).is_some()
    }

    fn parse(&self, _repo_name: &str, file_path: &str, content: &str) -> Vec<ParsedDependency> {
        match PythonManifest::detect(file_path) {
            Some(PythonManifest::Requirements) => parse_requirements(file_path, content),
            Some(PythonManifest::Pyproject) => parse_pyproject(file_path, content),
            Some(PythonManifest::SetupPy) => parse_setup_py(file_path, content),
            Some(PythonManifest::SetupCfg) => parse_setup_cfg(file_path, content),
            Some(PythonManifest::Pipfile) => parse_pipfile(file_path, content),
            None => Vec::new(),
        }
    }
}

/// PEP 503 이름 정규화
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

/// 요구사항 문자열 하나를 `(정규화된 이름, 버전)`으로 분해합니다.
///
/// 버전은 연산자 뒤의 토큰 전체입니다 (`>=2.31,<3` -> `2.31,<3`). 환경 마커(`;` 이후)는 버립니다.
/// 버전 제약이 없으면 `"*"`. 이름 뒤에 URL 등 요구사항이 아닌 내용이 이어지면 `None`.
fn parse_requirement(raw: &str) -> Option<(String, String)> {
    let cleaned = raw.split(';').next().unwrap_or_default().trim();
    let caps = REQUIREMENT.captures(cleaned)?;
    let rest = &cleaned[caps.get(0).map_or(0, |m| m.end())..];
    let well_formed = rest.is_empty()
        || rest.starts_with([',', ';', '@', '#'])
        || rest.starts_with(char::is_whitespace);
    if !well_formed {
        return None;
    }
    let version = caps
        .get(3)
        .map(|m| m.as_str().trim_end_matches(',').to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "*".to_owned());
    Some((normalize_name(&caps[1]), version))
}

fn python_dependency(
    (name, version): (String, String),
    scope: DependencyScope,
    file_path: &str,
) -> ParsedDependency {
    ParsedDependency::new(name, version, Ecosystem::Python, scope, file_path)
}

fn parse_requirements(file_path: &str, content: &str) -> Vec<ParsedDependency> {
    let lower_path = file_path.to_lowercase();
    let scope = if lower_path.contains("dev") || lower_path.contains("test") {
        DependencyScope::Dev
    } else {
        DependencyScope::Runtime
    };

    content
        .lines()
        .map(|raw| raw.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(parse_requirement)
        .map(|req| python_dependency(req, scope, file_path))
        .collect()
}

// --- TOML/INI 섹션 스캔 헬퍼 ---

/// `[header]` 단위로 본문을 나눕니다. 첫 헤더 이전 내용은 빈 이름의 섹션입니다.
fn sections(content: &str) -> Vec<(String, String)> {
    let mut out = vec![(String::new(), String::new())];
    for line in content.lines() {
        if let Some(caps) = TABLE_HEADER.captures(line.trim()) {
            out.push((caps[1].to_owned(), String::new()));
            continue;
        }
        if let Some((_, body)) = out.last_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }
    out
}

/// 섹션 본문의 `key = value` 목록. 여러 줄에 걸친 배열 값은 닫힐 때까지 이어 붙입니다.
fn assignments(body: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut lines = body.lines();
    while let Some(line) = lines.next() {
        let Some(caps) = TOML_KEY.captures(line.trim()) else {
            continue;
        };
        let key = caps[1].trim_matches(['"', '\'']).to_owned();
        let mut value = caps[2].to_owned();
        if value.trim_start().starts_with('[') {
            while !scan_array(&value).1 {
                let Some(next) = lines.next() else { break };
                value.push('\n');
                value.push_str(next);
            }
        }
        out.push((key, value));
    }
    out
}

/// 첫 `[`부터 짝이 맞는 `]`까지 최상위 문자열 항목을 모읍니다.
///
/// 따옴표 안의 괄호와 `#` 주석은 무시합니다. 반환값의 두 번째 요소는
/// 배열이 닫혔는지 여부입니다.
fn scan_array(text: &str) -> (Vec<String>, bool) {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut current = String::new();
    let mut in_comment = false;

    for ch in text.chars() {
        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }
        if let Some(q) = quote {
            if ch == q {
                quote = None;
                if depth == 1 {
                    items.push(std::mem::take(&mut current));
                }
            } else if depth == 1 {
                current.push(ch);
            }
            continue;
        }
        match ch {
            '"' | '\'' if depth > 0 => {
                quote = Some(ch);
                current.clear();
            }
            '#' => in_comment = true,
            '[' => depth += 1,
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return (items, true);
                }
            }
            _ => {}
        }
    }
    (items, false)
}

fn parse_pyproject(file_path: &str, content: &str) -> Vec<ParsedDependency> {
    let mut deps = Vec::new();
    let mut license = None;

    for (header, body) in sections(content) {
        match header.as_str() {
            "project" => {
                for (key, value) in assignments(&body) {
                    match key.as_str() {
                        "dependencies" => {
                            let (items, _) = scan_array(&value);
                            deps.extend(items.iter().filter_map(|i| parse_requirement(i)).map(
                                |req| python_dependency(req, DependencyScope::Runtime, file_path),
                            ));
                        }
                        "license" => license = pyproject_license(&value),
                        _ => {}
                    }
                }
            }
            "project.optional-dependencies" => {
                for (group, value) in assignments(&body) {
                    let scope = if DEV_GROUPS.contains(&group.to_lowercase().as_str()) {
                        DependencyScope::Dev
                    } else {
                        DependencyScope::Optional
                    };
                    let (items, _) = scan_array(&value);
                    deps.extend(
                        items
                            .iter()
                            .filter_map(|i| parse_requirement(i))
                            .map(|req| python_dependency(req, scope, file_path)),
                    );
                }
            }
            _ => {}
        }
    }

    if license.is_some() {
        for dep in deps
            .iter_mut()
            .filter(|d| d.scope == DependencyScope::Runtime)
        {
            dep.declared_license = license.clone();
        }
    }
    deps
}

/// `license = { text = "..." }` 또는 `license = "..."`
fn pyproject_license(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with('{') {
        return INLINE_TEXT.captures(value).and_then(|c| non_empty(&c[1]));
    }
    let quoted = value.strip_prefix('"')?;
    non_empty(quoted.split('"').next().unwrap_or_default())
}

fn parse_setup_py(file_path: &str, content: &str) -> Vec<ParsedDependency> {
    let keyword_list = |keyword: &Regex, scope: DependencyScope| -> Vec<ParsedDependency> {
        let Some(m) = keyword.find(content) else {
            return Vec::new();
        };
        let rest = &content[m.end()..];
        if !rest.starts_with('[') {
            return Vec::new();
        }
        let (items, _) = scan_array(rest);
        items
            .iter()
            .filter_map(|i| parse_requirement(i))
            .map(|req| python_dependency(req, scope, file_path))
            .collect()
    };

    let mut deps = keyword_list(&*SETUP_INSTALL_REQUIRES, DependencyScope::Runtime);
    deps.extend(keyword_list(&*SETUP_TESTS_REQUIRE, DependencyScope::Test));
    deps
}

fn parse_setup_cfg(file_path: &str, content: &str) -> Vec<ParsedDependency> {
    let Some((_, body)) = sections(content)
        .into_iter()
        .find(|(header, _)| header == "options")
    else {
        return Vec::new();
    };

    let mut deps = Vec::new();
    let mut lines = body.lines().peekable();
    while let Some(line) = lines.next() {
        let Some(caps) = TOML_KEY.captures(line.trim()) else {
            continue;
        };
        if &caps[1] != "install_requires" {
            continue;
        }
        let mut requirements = vec![caps[2].to_owned()];
        // 들여쓴 연속 줄
        while let Some(next) = lines.peek() {
            if next.trim().is_empty() || !next.starts_with(char::is_whitespace) {
                break;
            }
            requirements.push(next.to_string());
            lines.next();
        }
        deps.extend(
            requirements
                .iter()
                .map(|r| r.split('#').next().unwrap_or_default().trim())
                .filter(|r| !r.is_empty())
                .filter_map(parse_requirement)
                .map(|req| python_dependency(req, DependencyScope::Runtime, file_path)),
        );
        break;
    }
    deps
}

fn parse_pipfile(file_path: &str, content: &str) -> Vec<ParsedDependency> {
    let mut deps = Vec::new();
    for (header, body) in sections(content) {
        let scope = match header.as_str() {
            "packages" => DependencyScope::Runtime,
            "dev-packages" => DependencyScope::Dev,
            _ => continue,
        };
        for (name, value) in assignments(&body) {
            let Some(spec) = pipfile_version_spec(&value) else {
                continue;
            };
            let version = if spec == "*" {
                spec
            } else {
                spec.trim_start_matches(['>', '<', '=', '~', '!'])
                    .to_owned()
            };
            deps.push(ParsedDependency::new(
                normalize_name(&name),
                version,
                Ecosystem::Python,
                scope,
                file_path,
            ));
        }
    }
    deps
}

/// `"==1.2.3"` 문자열 또는 `{ version = "..." }` 인라인 테이블의 버전 지정자
fn pipfile_version_spec(value: &str) -> Option<String> {
    let value = value.split(" #").next().unwrap_or_default().trim();
    if let Some(quoted) = value.strip_prefix('"') {
        return quoted.strip_suffix('"').map(str::to_owned);
    }
    if value.starts_with('{') {
        return Some(
            INLINE_VERSION
                .captures(value)
                .map(|c| c[1].to_owned())
                .unwrap_or_else(|| "*".to_owned()),
        );
    }
    None
}
