#![doc = include_str!("../README.md")]
//!
//! # 모듈 구조
//!
//! - [`error`]: 도메인 에러 타입 (`ScannerError`)
//! - [`config`]: 오케스트레이터 설정 (`ScannerConfig`, 빌더)
//! - [`types`]: 도메인 타입 (`ParsedDependency`, `ResolvedDependency`, `PolicyViolation`, `FullScanResult`)
//! - [`discovery`]: 매니페스트 파일 패턴과 제외 경로
//! - [`parser`]: 생태계별 매니페스트 파서 (`ManifestParser` trait, `ParserRegistry`)
//! - [`dedup`]: (생태계, 이름) 기준 중복 제거
//! - [`license`]: 라이선스 정규화, 분류, 알려진 패키지 테이블 (`LicenseResolver`)
//! - [`policy`]: 분류별 기본 액션과 예외 규칙 (`LicensePolicy`, `PolicyEngine`)
//! - [`freshness`]: 저장소 간 버전 추적 (`FreshnessAnalyzer`)
//! - [`sbom`]: CycloneDX 1.5 문서 생성 (`SbomGenerator`)
//! - [`approval`]: 승인 패키지 레지스트리와 와일드카드 규칙
//! - [`settings`]: 정책/승인 레지스트리 문서 영속화 (`DocumentStore`)
//! - [`source`]: 호스트 저장소 접근 (`RepositorySource`)
//! - [`scanner`]: 메인 오케스트레이터 (`ScanOrchestrator`)
//!
//! # 아키텍처
//!
//! ```text
//! RepositorySource --> discover_manifests --> ParserRegistry --> deduplicate
//!                                                                    |
//!                                                             LicenseResolver
//!                                                                    |
//!                                        +---------------------------+---------------+
//!                                        |                           |               |
//!                                  PolicyEngine               SbomGenerator   FreshnessAnalyzer
//!                                        |                           |               |
//!                               Vec<PolicyViolation>          CycloneDxBom   Vec<FreshnessResult>
//!                                        +---------------------------+---------------+
//!                                                                    |
//!                                                              RepoScanResult --> FullScanResult
//! ```

pub mod approval;
pub mod config;
pub mod dedup;
pub mod discovery;
pub mod error;
pub mod freshness;
pub mod license;
pub mod parser;
pub mod policy;
pub mod sbom;
pub mod scanner;
pub mod settings;
pub mod source;
pub mod types;

// --- Public API Re-exports ---

// Orchestrator
pub use scanner::{ScanGenerations, ScanOrchestrator, ScanToken};

// Configuration
pub use config::{ScannerConfig, ScannerConfigBuilder};

// Error
pub use error::ScannerError;

// Types
pub use types::{
    DependencyScope, Ecosystem, FreshnessResult, FreshnessStatus, FullScanResult,
    LicenseCategory, ParsedDependency, PolicyAction, PolicyViolation, RepoScanResult,
    ResolvedDependency, ScanPhase, ScanProgress,
};

// Discovery
pub use discovery::{DEPENDENCY_FILE_PATTERNS, RepositoryItem, SKIP_PATTERNS, discover_manifests};

// Parser
pub use parser::{
    GoModParser, ManifestParser, MavenParser, NpmParser, NuGetParser, ParserRegistry,
    PythonParser,
};

// Pipeline stages
pub use dedup::deduplicate;
pub use freshness::FreshnessAnalyzer;
pub use license::LicenseResolver;
pub use policy::{CategoryDefaults, LicenseOverride, LicensePolicy, PolicyEngine};
pub use sbom::{CycloneDxBom, SbomGenerator};

// Approval
pub use approval::{
    ApprovalStatus, ApprovedPackageEntry, ApprovedPackagesRegistry, AutoApprovalRule,
    approval_status, build_approval_map,
};

// Host seams
pub use settings::{
    ApprovedPackagesService, DocumentStore, FileDocumentStore, InMemoryDocumentStore,
    PolicySettingsService,
};
pub use source::{RepositoryRef, RepositorySource};
