//! Local filesystem implementation of [`RepositorySource`].
//!
//! Each directory passed on the command line is one repository. Repository
//! ids are the positional index (`"0"`, `"1"`, ...) and names are the final
//! path component of the canonical directory.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use licensehub_scanner::discovery::is_skipped_path;
use licensehub_scanner::{RepositoryItem, RepositoryRef, RepositorySource, ScannerError};

/// A single local repository directory.
#[derive(Debug, Clone)]
struct LocalRepository {
    id: String,
    name: String,
    root: PathBuf,
}

/// Serves repositories from local directories.
#[derive(Debug, Clone)]
pub struct LocalRepositorySource {
    project: String,
    repos: Vec<LocalRepository>,
    max_file_size: usize,
}

impl LocalRepositorySource {
    /// Create a source for the given directories.
    ///
    /// Directory names that cannot be derived (e.g. `/`) fall back to
    /// `repo-<index>`.
    pub fn new(project: impl Into<String>, paths: &[PathBuf], max_file_size: usize) -> Self {
        let repos = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let root = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                let name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("repo-{index}"));
                LocalRepository {
                    id: index.to_string(),
                    name,
                    root,
                }
            })
            .collect();

        Self {
            project: project.into(),
            repos,
            max_file_size,
        }
    }

    fn repository(&self, repo_id: &str) -> Result<&LocalRepository, ScannerError> {
        self.repos
            .iter()
            .find(|r| r.id == repo_id)
            .ok_or_else(|| ScannerError::Discovery {
                repo: repo_id.to_owned(),
                reason: "unknown repository id".to_owned(),
            })
    }

    async fn walk(&self, repo: &LocalRepository) -> Result<Vec<RepositoryItem>, ScannerError> {
        let mut items = Vec::new();
        let mut stack = vec![(repo.root.clone(), String::new())];

        while let Some((dir, rel)) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| ScannerError::Io {
                path: dir.display().to_string(),
                source: e,
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| ScannerError::Io {
                path: dir.display().to_string(),
                source: e,
            })? {
                let file_type = entry.file_type().await.map_err(|e| ScannerError::Io {
                    path: entry.path().display().to_string(),
                    source: e,
                })?;
                if file_type.is_symlink() {
                    continue;
                }

                let item_path = format!("{rel}/{}", entry.file_name().to_string_lossy());
                if file_type.is_dir() {
                    if is_skipped_path(&format!("{item_path}/")) {
                        debug!(repo = %repo.name, path = %item_path, "skipping directory");
                        continue;
                    }
                    items.push(RepositoryItem::folder(item_path.clone()));
                    stack.push((entry.path(), item_path));
                } else if file_type.is_file() {
                    items.push(RepositoryItem::file(item_path));
                }
            }
        }

        items.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(items)
    }
}

/// Resolve a repository-relative item path under `root`.
///
/// Rejects paths that would escape the repository.
fn resolve_item_path(root: &Path, item_path: &str) -> Option<PathBuf> {
    let relative = Path::new(item_path.trim_start_matches('/'));
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || relative.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(relative))
}

impl RepositorySource for LocalRepositorySource {
    async fn current_project(&self) -> Result<Option<String>, ScannerError> {
        let project = self.project.trim();
        Ok((!project.is_empty()).then(|| project.to_owned()))
    }

    async fn list_repositories(&self, _project: &str) -> Result<Vec<RepositoryRef>, ScannerError> {
        Ok(self
            .repos
            .iter()
            .map(|r| RepositoryRef::new(r.id.clone(), r.name.clone()))
            .collect())
    }

    async fn list_items(
        &self,
        repo_id: &str,
        _project: &str,
    ) -> Result<Vec<RepositoryItem>, ScannerError> {
        let repo = self.repository(repo_id)?;
        self.walk(repo).await.map_err(|e| ScannerError::Discovery {
            repo: repo.name.clone(),
            reason: e.to_string(),
        })
    }

    async fn fetch_content(
        &self,
        repo_id: &str,
        path: &str,
        _project: &str,
    ) -> Result<String, ScannerError> {
        let repo = self.repository(repo_id)?;
        let full_path = resolve_item_path(&repo.root, path).ok_or_else(|| ScannerError::Fetch {
            repo: repo.name.clone(),
            path: path.to_owned(),
            reason: "path escapes repository root".to_owned(),
        })?;

        let io_error = |source| ScannerError::Io {
            path: full_path.display().to_string(),
            source,
        };

        let metadata = tokio::fs::metadata(&full_path).await.map_err(io_error)?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > self.max_file_size {
            return Err(ScannerError::FileTooBig {
                path: path.to_owned(),
                size,
                max: self.max_file_size,
            });
        }

        let bytes = tokio::fs::read(&full_path).await.map_err(io_error)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
