//! CycloneDX 1.5 JSON 문서 구조
//!
//! [CycloneDX](https://cyclonedx.org/) 1.5 사양 중 이 도구가 채우는 필드만 정의합니다.
//! 직렬화된 JSON이 파일 내보내기 형식이므로 필드 이름과 순서를 바꾸면 안 됩니다.

use serde::{Deserialize, Serialize};

use crate::error::ScannerError;

/// CycloneDX BOM 루트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycloneDxBom {
    /// 항상 `"CycloneDX"`
    pub bom_format: String,
    /// 항상 `"1.5"`
    pub spec_version: String,
    /// `urn:uuid:<v4>`
    pub serial_number: String,
    pub version: u32,
    pub metadata: BomMetadata,
    pub components: Vec<BomComponent>,
}

impl CycloneDxBom {
    /// 사람이 읽기 좋은 JSON으로 직렬화합니다.
    pub fn to_json_pretty(&self) -> Result<String, ScannerError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ScannerError::SbomGeneration(format!("CycloneDX serialization failed: {e}"))
        })
    }

    /// JSON 문서를 파싱합니다.
    pub fn from_json(json: &str) -> Result<Self, ScannerError> {
        serde_json::from_str(json)
            .map_err(|e| ScannerError::SbomGeneration(format!("invalid CycloneDX document: {e}")))
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// BOM 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomMetadata {
    /// 생성 시각 (RFC 3339)
    pub timestamp: String,
    pub tools: Vec<BomTool>,
    /// 스캔 대상 애플리케이션 (저장소)
    pub component: BomSubject,
}

/// 생성 도구 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomTool {
    pub name: String,
    pub version: String,
}

/// 메타데이터의 대상 컴포넌트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomSubject {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
}

/// 의존성 컴포넌트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    pub version: String,
    pub purl: String,
    /// 라이선스를 모르면 빈 배열
    pub licenses: Vec<BomLicenseChoice>,
    /// `required` 또는 `optional`
    pub scope: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<BomProperty>,
}

impl BomComponent {
    /// 이름이 일치하는 속성 값을 찾습니다.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// `{"license": {"id": "MIT"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLicenseChoice {
    pub license: BomLicense,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLicense {
    pub id: String,
}

/// 이름/값 속성
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomProperty {
    pub name: String,
    pub value: String,
}
