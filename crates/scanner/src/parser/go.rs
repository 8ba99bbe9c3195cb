//! go.mod 파서
//!
//! 한 줄 `require <module> <version>`과 `require ( ... )` 블록을 처리합니다.
//! 블록 안에서 `// indirect` 주석이 붙은 줄은 `Optional` 범위가 됩니다.

use super::{ManifestParser, file_name_lower};
use crate::types::{DependencyScope, Ecosystem, ParsedDependency};

/// go.mod 파서
pub struct GoModParser;

impl ManifestParser for GoModParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn can_parse(&self, path: &str) -> bool {
        file_name_lower(path).ends_with("go.mod")
    }

    fn parse(&self, _repo_name: &str, file_path: &str, content: &str) -> Vec<ParsedDependency> {
        let mut deps = Vec::new();
        let mut in_require_block = false;

        for raw in content.lines() {
            let line = raw.trim();

            if !in_require_block {
                if line == "require (" || line == "require(" {
                    in_require_block = true;
                } else if let Some(rest) = line.strip_prefix("require ")
                    && !line.contains('(')
                {
                    if let Some(dep) = single_require(rest, file_path) {
                        deps.push(dep);
                    }
                }
                continue;
            }

            if line == ")" {
                in_require_block = false;
                continue;
            }
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some(dep) = block_require(line, file_path) {
                deps.push(dep);
            }
        }

        deps
    }
}

fn go_dependency(
    module: &str,
    version: &str,
    scope: DependencyScope,
    file_path: &str,
) -> ParsedDependency {
    ParsedDependency::new(module, version, Ecosystem::Go, scope, file_path)
}

/// `require` 키워드 뒤의 `<module> <version>`
fn single_require(rest: &str, file_path: &str) -> Option<ParsedDependency> {
    let mut tokens = rest.split_whitespace();
    let module = tokens.next()?;
    let version = tokens.next()?;
    Some(go_dependency(
        module,
        version,
        DependencyScope::Runtime,
        file_path,
    ))
}

/// 블록 내부 한 줄: `<module> <version> [// indirect]`
fn block_require(line: &str, file_path: &str) -> Option<ParsedDependency> {
    let indirect = line.contains("// indirect");
    let code = line.split("//").next().unwrap_or_default();
    let mut tokens = code.split_whitespace();
    let module = tokens.next()?;
    let version = tokens.next()?;
    let scope = if indirect {
        DependencyScope::Optional
    } else {
        DependencyScope::Runtime
    };
    Some(go_dependency(module, version, scope, file_path))
}
