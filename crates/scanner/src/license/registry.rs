//! 정적 라이선스 테이블
//!
//! - [`category_of`]: SPDX ID -> [`LicenseCategory`]
//! - [`known_license`]: (생태계, 소문자 패키지 이름) -> SPDX ID
//! - [`LICENSE_ALIASES`]: 소문자 표기 변형 -> SPDX ID
//!
//! 두 테이블 모두 프로세스 시작 후 처음 조회할 때 한 번 구축되며 이후 읽기 전용입니다.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::types::{Ecosystem, LicenseCategory};

const PERMISSIVE: &[&str] = &[
    "MIT",
    "MIT-CMU",
    "Apache-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "ISC",
    "Unlicense",
    "CC0-1.0",
    "0BSD",
    "Zlib",
    "BSL-1.0",
    "PostgreSQL",
    "PSF-2.0",
    "Artistic-2.0",
    "MS-PL",
    "WTFPL",
    "BlueOak-1.0.0",
];

const WEAK_COPYLEFT: &[&str] = &[
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "LGPL-3.0-only",
    "LGPL-3.0-or-later",
    "MPL-2.0",
    "EPL-1.0",
    "EPL-2.0",
    "CDDL-1.0",
    "CDDL-1.1",
    "CPL-1.0",
    "MS-RL",
];

const STRONG_COPYLEFT: &[&str] = &[
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "GPL-3.0-only",
    "GPL-3.0-or-later",
    "AGPL-3.0-only",
    "AGPL-3.0-or-later",
    "SSPL-1.0",
    "OSL-3.0",
    "EUPL-1.2",
    "RPL-1.5",
];

/// 정확히 일치하는 표기 변형 (소문자) -> SPDX ID
pub const LICENSE_ALIASES: &[(&str, &str)] = &[
    ("mit", "MIT"),
    ("mit license", "MIT"),
    ("bsd-3-clause", "BSD-3-Clause"),
    ("bsd 3-clause", "BSD-3-Clause"),
    ("new bsd", "BSD-3-Clause"),
    ("bsd-2-clause", "BSD-2-Clause"),
    ("bsd 2-clause", "BSD-2-Clause"),
    ("simplified bsd", "BSD-2-Clause"),
    ("isc", "ISC"),
    ("isc license", "ISC"),
    ("unlicense", "Unlicense"),
    ("the unlicense", "Unlicense"),
    ("cc0-1.0", "CC0-1.0"),
    ("cc0", "CC0-1.0"),
];

// npm의 "UNLICENSED"는 공개 라이선스가 없다는 선언
const PROPRIETARY: &[&str] = &["Polyform-Noncommercial-1.0.0", "BUSL-1.1", "UNLICENSED"];

const NUGET_KNOWN: &[(&str, &str)] = &[
    ("newtonsoft.json", "MIT"),
    ("serilog", "Apache-2.0"),
    ("serilog.sinks.console", "Apache-2.0"),
    ("automapper", "MIT"),
    ("dapper", "Apache-2.0"),
    ("polly", "BSD-3-Clause"),
    ("mediatr", "Apache-2.0"),
    ("fluentvalidation", "Apache-2.0"),
    ("swashbuckle.aspnetcore", "MIT"),
    ("microsoft.extensions.logging", "MIT"),
    ("microsoft.extensions.dependencyinjection", "MIT"),
    ("microsoft.entityframeworkcore", "MIT"),
    ("system.text.json", "MIT"),
    ("xunit", "Apache-2.0"),
    ("nunit", "MIT"),
    ("moq", "BSD-3-Clause"),
    ("fluentassertions", "Apache-2.0"),
    ("stackexchange.redis", "MIT"),
    ("npgsql", "PostgreSQL"),
    ("itextsharp", "AGPL-3.0-only"),
];

const NPM_KNOWN: &[(&str, &str)] = &[
    ("react", "MIT"),
    ("react-dom", "MIT"),
    ("lodash", "MIT"),
    ("express", "MIT"),
    ("axios", "MIT"),
    ("typescript", "Apache-2.0"),
    ("webpack", "MIT"),
    ("jest", "MIT"),
    ("eslint", "MIT"),
    ("prettier", "MIT"),
    ("vue", "MIT"),
    ("rxjs", "Apache-2.0"),
    ("moment", "MIT"),
    ("chalk", "MIT"),
    ("commander", "MIT"),
    ("uuid", "MIT"),
    ("tslib", "0BSD"),
    ("semver", "ISC"),
    ("glob", "ISC"),
    ("caniuse-lite", "CC-BY-4.0"),
];

const GO_KNOWN: &[(&str, &str)] = &[
    ("github.com/gin-gonic/gin", "MIT"),
    ("github.com/stretchr/testify", "MIT"),
    ("github.com/spf13/cobra", "Apache-2.0"),
    ("github.com/spf13/viper", "MIT"),
    ("github.com/sirupsen/logrus", "MIT"),
    ("github.com/pkg/errors", "BSD-2-Clause"),
    ("github.com/google/uuid", "BSD-3-Clause"),
    ("github.com/gorilla/mux", "BSD-3-Clause"),
    ("go.uber.org/zap", "MIT"),
    ("golang.org/x/sys", "BSD-3-Clause"),
    ("golang.org/x/net", "BSD-3-Clause"),
    ("google.golang.org/grpc", "Apache-2.0"),
    ("google.golang.org/protobuf", "BSD-3-Clause"),
    ("github.com/hashicorp/vault/api", "MPL-2.0"),
];

const PYTHON_KNOWN: &[(&str, &str)] = &[
    ("requests", "Apache-2.0"),
    ("flask", "BSD-3-Clause"),
    ("django", "BSD-3-Clause"),
    ("numpy", "BSD-3-Clause"),
    ("pandas", "BSD-3-Clause"),
    ("pytest", "MIT"),
    ("pyyaml", "MIT"),
    ("click", "BSD-3-Clause"),
    ("sqlalchemy", "MIT"),
    ("fastapi", "MIT"),
    ("pydantic", "MIT"),
    ("boto3", "Apache-2.0"),
    ("urllib3", "MIT"),
    ("certifi", "MPL-2.0"),
    ("psycopg2", "LGPL-3.0-or-later"),
    ("pyqt5", "GPL-3.0-only"),
];

const MAVEN_KNOWN: &[(&str, &str)] = &[
    ("junit:junit", "EPL-1.0"),
    ("org.junit.jupiter:junit-jupiter", "EPL-2.0"),
    ("com.google.guava:guava", "Apache-2.0"),
    ("com.fasterxml.jackson.core:jackson-databind", "Apache-2.0"),
    ("org.apache.commons:commons-lang3", "Apache-2.0"),
    ("org.slf4j:slf4j-api", "MIT"),
    ("ch.qos.logback:logback-classic", "EPL-1.0"),
    ("org.springframework:spring-core", "Apache-2.0"),
    ("org.projectlombok:lombok", "MIT"),
    ("org.mockito:mockito-core", "MIT"),
    ("mysql:mysql-connector-java", "GPL-2.0-only"),
    ("org.postgresql:postgresql", "BSD-2-Clause"),
];

static CATEGORIES: LazyLock<HashMap<&'static str, LicenseCategory>> = LazyLock::new(|| {
    [
        (PERMISSIVE, LicenseCategory::Permissive),
        (WEAK_COPYLEFT, LicenseCategory::WeakCopyleft),
        (STRONG_COPYLEFT, LicenseCategory::StrongCopyleft),
        (PROPRIETARY, LicenseCategory::Proprietary),
    ]
    .into_iter()
    .flat_map(|(ids, category)| ids.iter().map(move |id| (*id, category)))
    .collect()
});

static KNOWN: LazyLock<HashMap<(Ecosystem, &'static str), &'static str>> = LazyLock::new(|| {
    [
        (Ecosystem::NuGet, NUGET_KNOWN),
        (Ecosystem::Npm, NPM_KNOWN),
        (Ecosystem::Go, GO_KNOWN),
        (Ecosystem::Python, PYTHON_KNOWN),
        (Ecosystem::Maven, MAVEN_KNOWN),
    ]
    .into_iter()
    .flat_map(|(eco, entries)| entries.iter().map(move |(name, id)| ((eco, *name), *id)))
    .collect()
});

/// SPDX ID의 분류를 조회합니다 (대소문자 구분). 테이블에 없으면 `None`.
pub fn category_of(license_id: &str) -> Option<LicenseCategory> {
    CATEGORIES.get(license_id).copied()
}

/// ID가 분류 테이블에 있는지 확인합니다.
pub fn is_known_id(license_id: &str) -> bool {
    CATEGORIES.contains_key(license_id)
}

/// 잘 알려진 패키지의 라이선스를 조회합니다. 이름은 대소문자를 구분하지 않습니다.
pub fn known_license(ecosystem: Ecosystem, name: &str) -> Option<&'static str> {
    KNOWN.get(&(ecosystem, name.to_lowercase().as_str())).copied()
}

/// 분류 테이블의 모든 `(ID, 분류)` 항목 (ID 오름차순)
pub fn categorized_ids() -> Vec<(&'static str, LicenseCategory)> {
    let mut entries: Vec<_> = CATEGORIES.iter().map(|(id, c)| (*id, *c)).collect();
    entries.sort_unstable_by_key(|(id, _)| *id);
    entries
}
