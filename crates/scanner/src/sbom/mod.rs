//! SBOM 생성 -- 해석된 의존성을 CycloneDX 1.5 문서로 변환
//!
//! [`SbomGenerator`]는 저장소마다 하나의 [`CycloneDxBom`]을 만듭니다.
//! 의존성마다 `library` 컴포넌트가 하나씩 생성되며, 생태계는
//! `licensehub:ecosystem` 속성으로 기록됩니다.

pub mod cyclonedx;
pub mod purl;

use chrono::{SecondsFormat, Utc};

pub use cyclonedx::{
    BomComponent, BomLicense, BomLicenseChoice, BomMetadata, BomProperty, BomSubject, BomTool,
    CycloneDxBom,
};
pub use purl::build_purl;

use crate::license::UNKNOWN_LICENSE;
use crate::types::{DependencyScope, ResolvedDependency};

/// 생성 도구 이름
pub const TOOL_NAME: &str = "licensehub";

/// 컴포넌트 생태계 속성 이름
pub const ECOSYSTEM_PROPERTY: &str = "licensehub:ecosystem";

/// SBOM 생성기
#[derive(Debug, Clone, Copy, Default)]
pub struct SbomGenerator;

impl SbomGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 저장소의 의존성으로 CycloneDX 1.5 문서를 생성합니다.
    ///
    /// 호출마다 새 일련번호와 타임스탬프가 부여됩니다.
    pub fn generate(&self, repo_name: &str, deps: &[ResolvedDependency]) -> CycloneDxBom {
        CycloneDxBom {
            bom_format: "CycloneDX".to_owned(),
            spec_version: "1.5".to_owned(),
            serial_number: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            version: 1,
            metadata: BomMetadata {
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                tools: vec![BomTool {
                    name: TOOL_NAME.to_owned(),
                    version: env!("CARGO_PKG_VERSION").to_owned(),
                }],
                component: BomSubject {
                    component_type: "application".to_owned(),
                    name: repo_name.to_owned(),
                },
            },
            components: deps.iter().map(to_component).collect(),
        }
    }
}

fn to_component(dep: &ResolvedDependency) -> BomComponent {
    let licenses = if dep.license == UNKNOWN_LICENSE {
        Vec::new()
    } else {
        vec![BomLicenseChoice {
            license: BomLicense {
                id: dep.license.clone(),
            },
        }]
    };
    let scope = match dep.scope() {
        DependencyScope::Dev | DependencyScope::Test => "optional",
        DependencyScope::Runtime | DependencyScope::Peer | DependencyScope::Optional => {
            "required"
        }
    };

    BomComponent {
        component_type: "library".to_owned(),
        name: dep.name().to_owned(),
        version: dep.version().to_owned(),
        purl: build_purl(dep.ecosystem(), dep.name(), dep.version()),
        licenses,
        scope: scope.to_owned(),
        properties: vec![BomProperty {
            name: ECOSYSTEM_PROPERTY.to_owned(),
            value: dep.ecosystem().as_str().to_owned(),
        }],
    }
}
