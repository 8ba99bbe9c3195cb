//! package.json / package-lock.json 파서
//!
//! [`NpmParser`]는 npm 매니페스트 두 종류를 처리합니다.
//! `node_modules/` 아래의 파일은 항상 건너뜁니다.
//!
//! # package-lock.json v3 형식 예시
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "lockfileVersion": 3,
//!   "packages": {
//!     "": { "name": "my-app", "version": "1.0.0" },
//!     "node_modules/lodash": { "version": "4.17.21", "license": "MIT" },
//!     "node_modules/jest": { "version": "29.7.0", "dev": true }
//!   }
//! }
//! ```
//!
//! v1 형식은 `packages` 대신 `dependencies` 객체(`이름 -> {version, dev}`)를 가집니다.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ManifestParser, file_name_lower};
use crate::error::ScannerError;
use crate::types::{DependencyScope, Ecosystem, ParsedDependency};

const NODE_MODULES: &str = "node_modules/";

/// package.json / package-lock.json 파서
pub struct NpmParser;

/// package.json 구조 (파싱용)
///
/// 섹션 값은 형식이 틀려도 전체 파싱이 실패하지 않도록 `Value`로 받습니다.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    license: Option<Value>,
    #[serde(default)]
    dependencies: Option<Value>,
    #[serde(default)]
    dev_dependencies: Option<Value>,
    #[serde(default)]
    peer_dependencies: Option<Value>,
    #[serde(default)]
    optional_dependencies: Option<Value>,
}

/// package-lock.json 구조 (파싱용)
#[derive(Deserialize)]
struct PackageLock {
    #[serde(default)]
    packages: Option<Value>,
    #[serde(default)]
    dependencies: Option<Value>,
}

impl ManifestParser for NpmParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn can_parse(&self, path: &str) -> bool {
        let name = file_name_lower(path);
        name.ends_with("package.json") || name.ends_with("package-lock.json")
    }

    fn parse(&self, repo_name: &str, file_path: &str, content: &str) -> Vec<ParsedDependency> {
        if file_path.to_lowercase().contains(NODE_MODULES) {
            return Vec::new();
        }

        let name = file_name_lower(file_path);
        let result = if name.ends_with("package-lock.json") {
            parse_package_lock(file_path, content)
        } else if name.ends_with("package.json") {
            parse_package_json(file_path, content)
        } else {
            Ok(Vec::new())
        };

        result.unwrap_or_else(|e| {
            debug!(repo = repo_name, error = %e, "skipping malformed npm manifest");
            Vec::new()
        })
    }
}

fn parse_error(file_path: &str, err: serde_json::Error) -> ScannerError {
    ScannerError::ManifestParse {
        path: file_path.to_owned(),
        reason: err.to_string(),
    }
}

fn parse_package_json(
    file_path: &str,
    content: &str,
) -> Result<Vec<ParsedDependency>, ScannerError> {
    let manifest: PackageJson =
        serde_json::from_str(content).map_err(|e| parse_error(file_path, e))?;

    let declared_license = match &manifest.license {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj
            .get("type")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        _ => None,
    };

    let sections = [
        (&manifest.dependencies, DependencyScope::Runtime),
        (&manifest.dev_dependencies, DependencyScope::Dev),
        (&manifest.peer_dependencies, DependencyScope::Peer),
        (&manifest.optional_dependencies, DependencyScope::Optional),
    ];

    let mut deps = Vec::new();
    for (section, scope) in sections {
        let Some(Value::Object(entries)) = section else {
            continue;
        };
        for (name, version) in entries {
            // 문자열이 아닌 버전 값은 무시
            let Some(version) = version.as_str() else {
                continue;
            };
            let license = if scope == DependencyScope::Runtime {
                declared_license.clone()
            } else {
                None
            };
            deps.push(
                ParsedDependency::new(name, version, Ecosystem::Npm, scope, file_path)
                    .with_declared_license(license),
            );
        }
    }

    Ok(deps)
}

fn parse_package_lock(
    file_path: &str,
    content: &str,
) -> Result<Vec<ParsedDependency>, ScannerError> {
    let lock: PackageLock = serde_json::from_str(content).map_err(|e| parse_error(file_path, e))?;

    // v2/v3: "packages" 객체
    if let Some(Value::Object(packages)) = &lock.packages {
        let mut deps = Vec::new();
        for (key, info) in packages {
            // 루트 패키지는 키가 빈 문자열
            if key.is_empty() {
                continue;
            }
            let name = key.strip_prefix(NODE_MODULES).unwrap_or(key);
            // 중첩 node_modules (전이 의존성) 제외
            if name.contains(NODE_MODULES) {
                continue;
            }
            let license = info
                .get("license")
                .and_then(Value::as_str)
                .map(str::to_owned);
            deps.push(
                ParsedDependency::new(
                    name,
                    lock_version(info),
                    Ecosystem::Npm,
                    lock_scope(info),
                    file_path,
                )
                .with_declared_license(license),
            );
        }
        return Ok(deps);
    }

    // v1: "dependencies" 객체
    let Some(Value::Object(dependencies)) = &lock.dependencies else {
        return Ok(Vec::new());
    };
    Ok(dependencies
        .iter()
        .map(|(name, info)| {
            ParsedDependency::new(
                name,
                lock_version(info),
                Ecosystem::Npm,
                lock_scope(info),
                file_path,
            )
        })
        .collect())
}

fn lock_version(info: &Value) -> String {
    info.get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or("*")
        .to_owned()
}

fn lock_scope(info: &Value) -> DependencyScope {
    if info.get("dev").is_some_and(is_truthy) {
        DependencyScope::Dev
    } else {
        DependencyScope::Runtime
    }
}

/// JSON 값의 참/거짓 판정 (`null`, `false`, `0`, `""`은 거짓)
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
