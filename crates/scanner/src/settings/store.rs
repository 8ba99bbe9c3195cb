//! [`DocumentStore`] 구현
//!
//! - [`InMemoryDocumentStore`]: 프로세스 메모리 (테스트, 임베딩)
//! - [`FileDocumentStore`]: `<root>/<collection>/<id>.json` 파일

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::debug;

use super::DocumentStore;
use crate::error::ScannerError;

/// 메모리 문서 저장소
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 문서 수
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, ScannerError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_owned(), id.to_owned()))
            .cloned())
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        document: serde_json::Value,
    ) -> Result<(), ScannerError> {
        self.documents
            .write()
            .await
            .insert((collection.to_owned(), id.to_owned()), document);
        Ok(())
    }
}

/// 파일 기반 문서 저장소
///
/// 문서마다 JSON 파일 하나를 사용합니다. 쓰기는 임시 파일에 기록한 뒤
/// 이름을 바꾸므로 중간에 중단되어도 이전 문서가 남습니다.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 문서 파일 경로. 경로 구성요소로 쓸 수 없는 이름은 거부합니다.
    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, ScannerError> {
        for segment in [collection, id] {
            if !is_safe_segment(segment) {
                return Err(ScannerError::Store {
                    collection: collection.to_owned(),
                    id: id.to_owned(),
                    reason: format!("invalid path segment: {segment:?}"),
                });
            }
        }
        Ok(self.root.join(collection).join(format!("{id}.json")))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

fn io_error(path: &Path, source: std::io::Error) -> ScannerError {
    ScannerError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl DocumentStore for FileDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, ScannerError> {
        let path = self.document_path(collection, id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings document not found");
                return Ok(None);
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ScannerError::Store {
                collection: collection.to_owned(),
                id: id.to_owned(),
                reason: format!("invalid JSON: {e}"),
            })
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        document: serde_json::Value,
    ) -> Result<(), ScannerError> {
        let path = self.document_path(collection, id)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, e))?;
        }

        let content = serde_json::to_string_pretty(&document).map_err(|e| ScannerError::Store {
            collection: collection.to_owned(),
            id: id.to_owned(),
            reason: format!("serialize failed: {e}"),
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        debug!(path = %path.display(), "settings document written");
        Ok(())
    }
}
