#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use licensehub_scanner::{
    CycloneDxBom, DependencyScope, Ecosystem, LicenseResolver, ParsedDependency, SbomGenerator,
};

#[derive(Arbitrary, Debug)]
enum FuzzEcosystem {
    NuGet,
    Npm,
    Go,
    Python,
    Maven,
}

impl FuzzEcosystem {
    fn to_ecosystem(&self) -> Ecosystem {
        match self {
            Self::NuGet => Ecosystem::NuGet,
            Self::Npm => Ecosystem::Npm,
            Self::Go => Ecosystem::Go,
            Self::Python => Ecosystem::Python,
            Self::Maven => Ecosystem::Maven,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct FuzzDependency {
    ecosystem: FuzzEcosystem,
    name: String,
    version: String,
    dev: bool,
    license: Option<String>,
}

fuzz_target!(|input: Vec<FuzzDependency>| {
    let parsed: Vec<ParsedDependency> = input
        .iter()
        .take(100)
        .filter(|d| !d.name.is_empty())
        .map(|d| {
            let scope = if d.dev {
                DependencyScope::Dev
            } else {
                DependencyScope::Runtime
            };
            ParsedDependency::new(
                d.name.clone(),
                d.version.clone(),
                d.ecosystem.to_ecosystem(),
                scope,
                "/fuzz",
            )
            .with_declared_license(d.license.clone())
        })
        .collect();

    let resolved = LicenseResolver::new().resolve(&parsed);
    let bom = SbomGenerator::new().generate("fuzz", &resolved);

    // 생성된 문서는 직렬화 후 다시 읽을 수 있어야 한다
    let json = bom.to_json_pretty().expect("CycloneDX output must serialize");
    let reparsed = CycloneDxBom::from_json(&json).expect("CycloneDX output must parse back");
    assert_eq!(reparsed.component_count(), resolved.len());
});
