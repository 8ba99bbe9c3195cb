//! 설정 문서 서비스 -- 정책과 승인 레지스트리의 영속화
//!
//! 호스트가 제공하는 키/값 문서 저장소([`DocumentStore`]) 위에서 동작합니다.
//! 두 서비스 모두 문서가 없으면 기본값을 저장한 뒤 반환합니다.
//!
//! | 문서 | 컬렉션 | ID | 기본값 |
//! |------|--------|----|--------|
//! | [`PolicyDocument`] | `ComplianceScannerSettings` | `license-policy` | [`LicensePolicy::default`] |
//! | [`ApprovedPackagesDocument`] | `ComplianceScannerSettings` | `approved-packages` | 빈 레지스트리 |

pub mod store;

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::approval::ApprovedPackagesRegistry;
use crate::error::ScannerError;
use crate::policy::LicensePolicy;

pub use store::{FileDocumentStore, InMemoryDocumentStore};

/// 설정 문서 컬렉션 이름
pub const SETTINGS_COLLECTION: &str = "ComplianceScannerSettings";
/// 정책 문서 ID
pub const POLICY_DOC_ID: &str = "license-policy";
/// 정책 문서 스키마 버전
pub const SETTINGS_VERSION: u32 = 1;
/// 승인 레지스트리 문서 ID
pub const APPROVED_PACKAGES_DOC_ID: &str = "approved-packages";
/// 승인 레지스트리 문서 스키마 버전
pub const APPROVED_PACKAGES_VERSION: u32 = 1;

/// JSON 문서 저장소
///
/// 호스트 플랫폼의 확장 데이터 저장소를 추상화합니다.
/// 문서는 `(collection, id)`로 식별됩니다.
pub trait DocumentStore: Send + Sync + 'static {
    /// 문서를 조회합니다. 없으면 `Ok(None)`.
    fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, ScannerError>> + Send;

    /// 문서를 저장합니다 (생성 또는 교체).
    fn set_document(
        &self,
        collection: &str,
        id: &str,
        document: serde_json::Value,
    ) -> impl Future<Output = Result<(), ScannerError>> + Send;
}

/// 저장된 정책 문서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub id: String,
    pub policy: LicensePolicy,
    pub version: u32,
}

/// 저장된 승인 레지스트리 문서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedPackagesDocument {
    pub id: String,
    pub registry: ApprovedPackagesRegistry,
    pub version: u32,
}

fn store_error(collection: &str, id: &str, reason: impl Into<String>) -> ScannerError {
    ScannerError::Store {
        collection: collection.to_owned(),
        id: id.to_owned(),
        reason: reason.into(),
    }
}

async fn save<S, D>(store: &S, collection: &str, id: &str, doc: &D) -> Result<(), ScannerError>
where
    S: DocumentStore,
    D: Serialize,
{
    let value = serde_json::to_value(doc)
        .map_err(|e| store_error(collection, id, format!("serialize failed: {e}")))?;
    store.set_document(collection, id, value).await
}

/// 문서를 읽고, 없으면 `seed`를 저장한 뒤 반환합니다.
///
/// 형식이 깨진 문서는 덮어쓰지 않고 에러로 반환합니다.
async fn load_or_seed<S, D>(
    store: &S,
    collection: &str,
    id: &str,
    seed: impl FnOnce() -> D,
) -> Result<D, ScannerError>
where
    S: DocumentStore,
    D: Serialize + DeserializeOwned,
{
    if let Some(value) = store.get_document(collection, id).await? {
        return serde_json::from_value(value)
            .map_err(|e| store_error(collection, id, format!("malformed document: {e}")));
    }

    let doc = seed();
    save(store, collection, id, &doc).await?;
    info!(collection, id, "seeded default settings document");
    Ok(doc)
}

/// 라이선스 정책 설정 서비스
pub struct PolicySettingsService<S> {
    store: Arc<S>,
    collection: String,
}

impl<S: DocumentStore> PolicySettingsService<S> {
    /// 기본 컬렉션을 사용하는 서비스를 생성합니다.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_collection(store, SETTINGS_COLLECTION)
    }

    pub fn with_collection(store: Arc<S>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    fn default_document() -> PolicyDocument {
        PolicyDocument {
            id: POLICY_DOC_ID.to_owned(),
            policy: LicensePolicy::default(),
            version: SETTINGS_VERSION,
        }
    }

    /// 저장된 정책 문서를 반환합니다. 없으면 기본 정책을 저장합니다.
    pub async fn get_policy(&self) -> Result<PolicyDocument, ScannerError> {
        load_or_seed(
            self.store.as_ref(),
            &self.collection,
            POLICY_DOC_ID,
            Self::default_document,
        )
        .await
    }

    /// 정책을 교체하여 저장합니다.
    pub async fn save_policy(&self, policy: LicensePolicy) -> Result<PolicyDocument, ScannerError> {
        let mut doc = self.get_policy().await?;
        doc.policy = policy;
        save(self.store.as_ref(), &self.collection, POLICY_DOC_ID, &doc).await?;
        Ok(doc)
    }

    /// 정책을 기본값으로 되돌립니다.
    pub async fn reset_policy(&self) -> Result<PolicyDocument, ScannerError> {
        self.save_policy(LicensePolicy::default()).await
    }
}

/// 승인 레지스트리 설정 서비스
pub struct ApprovedPackagesService<S> {
    store: Arc<S>,
    collection: String,
}

impl<S: DocumentStore> ApprovedPackagesService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_collection(store, SETTINGS_COLLECTION)
    }

    pub fn with_collection(store: Arc<S>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// 저장된 레지스트리 문서를 반환합니다. 없으면 빈 레지스트리를 저장합니다.
    pub async fn get_registry(&self) -> Result<ApprovedPackagesDocument, ScannerError> {
        load_or_seed(
            self.store.as_ref(),
            &self.collection,
            APPROVED_PACKAGES_DOC_ID,
            || ApprovedPackagesDocument {
                id: APPROVED_PACKAGES_DOC_ID.to_owned(),
                registry: ApprovedPackagesRegistry::default(),
                version: APPROVED_PACKAGES_VERSION,
            },
        )
        .await
    }

    /// 레지스트리를 교체하여 저장합니다.
    pub async fn save_registry(
        &self,
        registry: ApprovedPackagesRegistry,
    ) -> Result<ApprovedPackagesDocument, ScannerError> {
        let mut doc = self.get_registry().await?;
        doc.registry = registry;
        save(
            self.store.as_ref(),
            &self.collection,
            APPROVED_PACKAGES_DOC_ID,
            &doc,
        )
        .await?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::AutoApprovalRule;
    use crate::policy::LicenseOverride;
    use crate::types::{Ecosystem, PolicyAction};

    #[tokio::test]
    async fn get_policy_seeds_default_once() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = PolicySettingsService::new(Arc::clone(&store));

        assert!(store.get_document(SETTINGS_COLLECTION, POLICY_DOC_ID).await.unwrap().is_none());
        let doc = service.get_policy().await.unwrap();
        assert_eq!(doc.id, POLICY_DOC_ID);
        assert_eq!(doc.version, SETTINGS_VERSION);
        assert_eq!(doc.policy, LicensePolicy::default());

        let stored = store
            .get_document(SETTINGS_COLLECTION, POLICY_DOC_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["policy"]["categoryDefaults"]["strong-copyleft"], "block");
    }

    #[tokio::test]
    async fn save_policy_replaces_payload() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = PolicySettingsService::new(store);

        let mut policy = LicensePolicy::default();
        policy
            .specific_overrides
            .push(LicenseOverride::new("MPL-2.0", PolicyAction::Allow));
        service.save_policy(policy.clone()).await.unwrap();

        let doc = service.get_policy().await.unwrap();
        assert_eq!(doc.policy, policy);

        let doc = service.reset_policy().await.unwrap();
        assert_eq!(doc.policy, LicensePolicy::default());
    }

    #[tokio::test]
    async fn malformed_policy_document_is_an_error() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .set_document(
                SETTINGS_COLLECTION,
                POLICY_DOC_ID,
                serde_json::json!({ "id": POLICY_DOC_ID, "policy": 42 }),
            )
            .await
            .unwrap();
        let service = PolicySettingsService::new(store);
        let err = service.get_policy().await.unwrap_err();
        assert!(matches!(err, ScannerError::Store { .. }));
    }

    #[tokio::test]
    async fn approved_packages_default_is_empty() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = ApprovedPackagesService::new(store);
        let doc = service.get_registry().await.unwrap();
        assert_eq!(doc.id, APPROVED_PACKAGES_DOC_ID);
        assert_eq!(doc.version, APPROVED_PACKAGES_VERSION);
        assert!(doc.registry.packages.is_empty());
        assert!(doc.registry.auto_approval_rules.is_empty());
    }

    #[tokio::test]
    async fn save_registry_round_trips_through_store() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = ApprovedPackagesService::new(Arc::clone(&store));

        let mut registry = ApprovedPackagesRegistry::default();
        registry.auto_approval_rules.push(AutoApprovalRule {
            pattern: "@contoso/*".to_owned(),
            ecosystem: Ecosystem::Npm,
            approved_by: "oss-office".to_owned(),
            approved_at: "2024-06-01T00:00:00Z".to_owned(),
            reason: None,
        });
        service.save_registry(registry.clone()).await.unwrap();

        let reloaded = ApprovedPackagesService::new(store).get_registry().await.unwrap();
        assert_eq!(reloaded.registry, registry);
    }

    #[tokio::test]
    async fn custom_collection_is_isolated() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let a = PolicySettingsService::with_collection(Arc::clone(&store), "TeamA");
        let b = PolicySettingsService::with_collection(Arc::clone(&store), "TeamB");

        let mut policy = LicensePolicy::default();
        policy.excluded_packages.push("internal".to_owned());
        a.save_policy(policy).await.unwrap();

        assert!(b.get_policy().await.unwrap().policy.excluded_packages.is_empty());
    }
}
