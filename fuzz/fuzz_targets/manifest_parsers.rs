#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use licensehub_scanner::{LicenseResolver, ParserRegistry, deduplicate};

/// 퍼저가 고르는 매니페스트 종류
#[derive(Arbitrary, Debug)]
enum ManifestKind {
    Csproj,
    PackagesConfig,
    PackageJson,
    PackageLock,
    GoMod,
    Requirements,
    Pyproject,
    SetupPy,
    SetupCfg,
    Pipfile,
    Pom,
}

impl ManifestKind {
    fn path(&self) -> &'static str {
        match self {
            Self::Csproj => "/src/App/App.csproj",
            Self::PackagesConfig => "/src/Legacy/packages.config",
            Self::PackageJson => "/web/package.json",
            Self::PackageLock => "/web/package-lock.json",
            Self::GoMod => "/go.mod",
            Self::Requirements => "/requirements-dev.txt",
            Self::Pyproject => "/pyproject.toml",
            Self::SetupPy => "/setup.py",
            Self::SetupCfg => "/setup.cfg",
            Self::Pipfile => "/Pipfile",
            Self::Pom => "/service/pom.xml",
        }
    }
}

#[derive(Arbitrary, Debug)]
struct ManifestInput {
    kind: ManifestKind,
    content: String,
}

fuzz_target!(|input: ManifestInput| {
    let registry = ParserRegistry::new();
    let path = input.kind.path();

    // 파서는 어떤 입력에도 패닉 없이 결과(빈 목록 포함)를 내야 한다
    let deps = registry.parse_file("fuzz", path, &input.content);

    let unique = deduplicate(deps);
    let resolved = LicenseResolver::new().resolve(&unique);
    assert_eq!(resolved.len(), unique.len());
});
