//! Package URL 생성
//!
//! 형식: `pkg:<type>/<name>@<version>`. 버전은 항상 퍼센트 인코딩됩니다.
//! 인코딩 대상 집합은 `encodeURIComponent`와 같습니다: 영숫자와 `-_.!~*'()`는 그대로 둡니다.
//!
//! | 생태계 | 형식 |
//! |--------|------|
//! | NuGet | `pkg:nuget/<인코딩된 이름>@v` |
//! | npm | `pkg:npm/<이름>@v`, 스코프 패키지(`@scope/x`)도 이름 그대로 |
//! | Go | `pkg:golang/<모듈 경로>@v` |
//! | Python | `pkg:pypi/<이름>@v` |
//! | Maven | `pkg:maven/<groupId>/<artifactId>@v`, `:`로 정확히 두 부분일 때만 |

use std::borrow::Cow;

use crate::types::Ecosystem;

/// `urlencoding::encode`가 인코딩하지만 URI 컴포넌트에서는 그대로 두는 문자
const URI_MARKS: [char; 5] = ['!', '*', '\'', '(', ')'];

/// 생태계 규칙에 따라 purl을 생성합니다.
pub fn build_purl(ecosystem: Ecosystem, name: &str, version: &str) -> String {
    let purl_type = ecosystem.purl_type();
    let version = encode_component(version);

    match ecosystem {
        Ecosystem::NuGet => format!("pkg:{purl_type}/{}@{version}", encode_component(name)),
        Ecosystem::Maven => match name.split(':').collect::<Vec<_>>().as_slice() {
            [group, artifact] => format!("pkg:{purl_type}/{group}/{artifact}@{version}"),
            _ => format!("pkg:{purl_type}/{name}@{version}"),
        },
        Ecosystem::Npm | Ecosystem::Go | Ecosystem::Python => {
            format!("pkg:{purl_type}/{name}@{version}")
        }
    }
}

/// URI 컴포넌트 인코딩
///
/// `urlencoding::encode`는 [`URI_MARKS`]까지 인코딩하므로 그 문자에서 끊어 나머지 구간만 인코딩합니다.
fn encode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(URI_MARKS) {
        return urlencoding::encode(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        if URI_MARKS.contains(&c) {
            out.push_str(&urlencoding::encode(&raw[start..i]));
            out.push(c);
            start = i + c.len_utf8();
        }
    }
    out.push_str(&urlencoding::encode(&raw[start..]));
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purl_per_ecosystem() {
        assert_eq!(
            build_purl(Ecosystem::NuGet, "Newtonsoft.Json", "13.0.3"),
            "pkg:nuget/Newtonsoft.Json@13.0.3"
        );
        assert_eq!(build_purl(Ecosystem::Npm, "react", "18.2.0"), "pkg:npm/react@18.2.0");
        assert_eq!(
            build_purl(Ecosystem::Go, "github.com/pkg/errors", "v0.9.1"),
            "pkg:golang/github.com/pkg/errors@v0.9.1"
        );
        assert_eq!(build_purl(Ecosystem::Python, "requests", "2.31.0"), "pkg:pypi/requests@2.31.0");
    }

    #[test]
    fn maven_purl_splits_group_and_artifact() {
        assert_eq!(
            build_purl(Ecosystem::Maven, "org.apache:commons", "1.0"),
            "pkg:maven/org.apache/commons@1.0"
        );
        assert_eq!(
            build_purl(Ecosystem::Maven, "a:b:c", "1.0"),
            "pkg:maven/a:b:c@1.0"
        );
    }

    #[test]
    fn scoped_npm_name_is_used_as_is() {
        assert_eq!(
            build_purl(Ecosystem::Npm, "@types/node", "20.1.0"),
            "pkg:npm/@types/node@20.1.0"
        );
        assert_eq!(
            build_purl(Ecosystem::Npm, "@babel/core", "^7.23.0"),
            "pkg:npm/@babel/core@%5E7.23.0"
        );
    }

    #[test]
    fn version_is_percent_encoded() {
        assert_eq!(build_purl(Ecosystem::Npm, "react", "^18.2.0"), "pkg:npm/react@%5E18.2.0");
        assert_eq!(
            build_purl(Ecosystem::Python, "requests", "2.31,<3"),
            "pkg:pypi/requests@2.31%2C%3C3"
        );
        assert_eq!(
            build_purl(Ecosystem::Maven, "g:a", "${jackson.version}"),
            "pkg:maven/g/a@%24%7Bjackson.version%7D"
        );
    }

    #[test]
    fn uri_marks_are_left_unescaped() {
        assert_eq!(build_purl(Ecosystem::Python, "numpy", "*"), "pkg:pypi/numpy@*");
        assert_eq!(build_purl(Ecosystem::Npm, "x", "~1.2.3"), "pkg:npm/x@~1.2.3");
        assert_eq!(
            build_purl(Ecosystem::NuGet, "Serilog", "[3.0,4.0)"),
            "pkg:nuget/Serilog@%5B3.0%2C4.0)"
        );
        assert_eq!(
            build_purl(Ecosystem::NuGet, "Contoso.Lib(x)", "1.0"),
            "pkg:nuget/Contoso.Lib(x)@1.0"
        );
        assert_eq!(encode_component("a b!c"), "a%20b!c");
    }
}
