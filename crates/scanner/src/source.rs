//! 저장소 소스 -- 호스트 플랫폼이 제공하는 저장소/파일 접근
//!
//! [`RepositorySource`]는 오케스트레이터가 소비하는 외부 인터페이스입니다.
//! 모든 메서드는 비동기이며, 구현체는 여러 태스크에서 동시에 호출될 수 있습니다.

use std::future::Future;

use crate::discovery::RepositoryItem;
use crate::error::ScannerError;

/// 프로젝트 내 저장소 식별 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// 호스트가 부여한 저장소 ID
    pub id: String,
    /// 표시 이름
    pub name: String,
}

impl RepositoryRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// 저장소 접근 trait
///
/// # 구현체
///
/// - CLI의 로컬 디렉토리 소스 (`licensehub-cli`)
/// - 테스트용 메모리 소스
pub trait RepositorySource: Send + Sync + 'static {
    /// 현재 프로젝트 이름. 컨텍스트가 없으면 `Ok(None)`.
    fn current_project(&self) -> impl Future<Output = Result<Option<String>, ScannerError>> + Send;

    /// 프로젝트의 저장소 목록을 조회합니다.
    fn list_repositories(
        &self,
        project: &str,
    ) -> impl Future<Output = Result<Vec<RepositoryRef>, ScannerError>> + Send;

    /// 저장소의 전체 아이템(파일, 폴더)을 재귀적으로 나열합니다.
    fn list_items(
        &self,
        repo_id: &str,
        project: &str,
    ) -> impl Future<Output = Result<Vec<RepositoryItem>, ScannerError>> + Send;

    /// 파일 내용을 텍스트로 가져옵니다.
    fn fetch_content(
        &self,
        repo_id: &str,
        path: &str,
        project: &str,
    ) -> impl Future<Output = Result<String, ScannerError>> + Send;
}
