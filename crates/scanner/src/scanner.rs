//! 스캔 오케스트레이터 -- 프로젝트 전체 저장소 스캔 흐름 관리
//!
//! [`ScanOrchestrator`]는 파서, 라이선스 해석기, 정책 엔진, SBOM 생성기를
//! 프로젝트의 모든 저장소에 적용합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! RepositorySource --> list_repositories
//!                            |
//!            +---------------+---------------+   (저장소 세마포어)
//!            |               |               |
//!        repo task       repo task       repo task
//!            |
//!   list_items --> discover_manifests --> fetch_content (파일 세마포어)
//!            |
//!   ParserRegistry --> deduplicate --> LicenseResolver --> PolicyEngine --> SbomGenerator
//!            |
//!            +--> JoinSet --> (오케스트레이터 태스크) FreshnessAnalyzer --> FullScanResult
//! ```
//!
//! # 취소
//!
//! 스캔마다 [`ScanGenerations`]에서 세대 토큰을 발급합니다. 더 새로운 세대가 발급되면
//! 이전 스캔은 진행 중인 작업을 끝까지 수행하지만 진행 상황 콜백을 더 호출하지 않고
//! [`ScannerError::Superseded`]를 반환합니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use licensehub_core::metrics as m;

use crate::config::ScannerConfig;
use crate::dedup::deduplicate;
use crate::discovery::discover_manifests;
use crate::error::ScannerError;
use crate::freshness::FreshnessAnalyzer;
use crate::license::LicenseResolver;
use crate::parser::ParserRegistry;
use crate::policy::{LicensePolicy, PolicyEngine};
use crate::sbom::SbomGenerator;
use crate::source::{RepositoryRef, RepositorySource};
use crate::types::{FullScanResult, RepoScanResult, ScanPhase, ScanProgress};

/// 스캔 세대 발급기
///
/// 복제본은 같은 카운터를 공유합니다. 호스트는 스캔 시작 전에 핸들을 복제해 두고
/// [`invalidate`](Self::invalidate)로 진행 중인 스캔을 무효화할 수 있습니다.
#[derive(Debug, Clone, Default)]
pub struct ScanGenerations {
    latest: Arc<AtomicU64>,
}

impl ScanGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 세대 토큰을 발급합니다. 이전에 발급된 토큰은 모두 무효가 됩니다.
    pub fn next(&self) -> ScanToken {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        ScanToken {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// 현재까지 발급된 토큰을 모두 무효화합니다.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// 가장 최근 세대 번호
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

/// 스캔 한 번에 부여되는 세대 토큰
#[derive(Debug, Clone)]
pub struct ScanToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl ScanToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 이 토큰이 아직 최신 세대인지 확인합니다.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    fn ensure_current(&self) -> Result<(), ScannerError> {
        if self.is_current() {
            return Ok(());
        }
        Err(ScannerError::Superseded {
            generation: self.generation,
            latest: self.latest.load(Ordering::SeqCst),
        })
    }
}

/// 토큰이 유효할 때만 콜백을 호출하는 진행 상황 보고기
struct ProgressReporter<'a, F> {
    token: &'a ScanToken,
    callback: F,
    total: usize,
}

impl<F: FnMut(ScanProgress)> ProgressReporter<'_, F> {
    fn report(
        &mut self,
        phase: ScanPhase,
        completed: usize,
        current_repo: Option<&str>,
        message: impl Into<String>,
        failed_repos: &[String],
    ) {
        if !self.token.is_current() {
            return;
        }
        (self.callback)(ScanProgress {
            phase,
            repos_total: self.total,
            repos_completed: completed,
            current_repo: current_repo.map(str::to_owned),
            message: message.into(),
            failed_repos: failed_repos.to_vec(),
        });
    }
}

/// 저장소 태스크가 공유하는 읽기 전용 구성요소
struct RepoScanContext<S> {
    source: Arc<S>,
    project: String,
    parsers: Arc<ParserRegistry>,
    resolver: LicenseResolver,
    policy: Arc<PolicyEngine>,
    sbom: SbomGenerator,
    max_concurrent_files: usize,
    max_file_size: usize,
}

/// 스캔 오케스트레이터
pub struct ScanOrchestrator<S> {
    source: Arc<S>,
    config: ScannerConfig,
    parsers: Arc<ParserRegistry>,
    resolver: LicenseResolver,
    policy: Arc<PolicyEngine>,
    sbom: SbomGenerator,
    freshness: FreshnessAnalyzer,
    generations: ScanGenerations,
}

impl<S: RepositorySource> ScanOrchestrator<S> {
    /// 기본 파서 레지스트리로 오케스트레이터를 생성합니다.
    pub fn new(source: Arc<S>, config: ScannerConfig, policy: LicensePolicy) -> Self {
        Self {
            source,
            config,
            parsers: Arc::new(ParserRegistry::new()),
            resolver: LicenseResolver::new(),
            policy: Arc::new(PolicyEngine::new(policy)),
            sbom: SbomGenerator::new(),
            freshness: FreshnessAnalyzer::new(),
            generations: ScanGenerations::new(),
        }
    }

    /// 파서 레지스트리를 교체합니다.
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = Arc::new(parsers);
        self
    }

    /// 외부에서 공유하는 세대 발급기를 사용합니다.
    pub fn with_generations(mut self, generations: ScanGenerations) -> Self {
        self.generations = generations;
        self
    }

    /// 세대 발급기 핸들
    pub fn generations(&self) -> ScanGenerations {
        self.generations.clone()
    }

    /// 현재 정책
    pub fn policy(&self) -> &LicensePolicy {
        self.policy.policy()
    }

    /// 정책을 교체합니다. 다음 스캔부터 적용됩니다.
    pub fn set_policy(&mut self, policy: LicensePolicy) {
        self.policy = Arc::new(PolicyEngine::new(policy));
    }

    /// 마지막 스캔의 버전 추적 상태
    pub fn freshness(&self) -> &FreshnessAnalyzer {
        &self.freshness
    }

    /// 프로젝트의 모든 저장소를 스캔합니다.
    ///
    /// # Errors
    ///
    /// - [`ScannerError::NoProject`]: 프로젝트 컨텍스트가 없음
    /// - [`ScannerError::RepositoryListing`]: 저장소 목록 조회 실패
    /// - [`ScannerError::Superseded`]: 스캔 도중 더 새로운 스캔이 시작됨
    ///
    /// 개별 저장소 실패는 에러가 아니라 결과의 `failed_repos`에 기록됩니다.
    pub async fn scan(
        &mut self,
        on_progress: impl FnMut(ScanProgress),
    ) -> Result<FullScanResult, ScannerError> {
        let token = self.generations.next();
        let started = Instant::now();
        self.freshness.reset();

        let project = self
            .source
            .current_project()
            .await?
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                ScannerError::NoProject("could not determine the current project".to_owned())
            })?;

        let mut progress = ProgressReporter {
            token: &token,
            callback: on_progress,
            total: 0,
        };
        progress.report(
            ScanPhase::Discovery,
            0,
            None,
            "Fetching repositories...",
            &[],
        );

        let repos = self
            .source
            .list_repositories(&project)
            .await
            .map_err(|e| ScannerError::RepositoryListing {
                project: project.clone(),
                reason: e.to_string(),
            })?;
        let all_repo_names: Vec<String> = repos.iter().map(|r| r.name.clone()).collect();
        let total = repos.len();
        progress.total = total;

        info!(
            project = %project,
            repos = total,
            generation = token.generation(),
            "scan started"
        );
        progress.report(ScanPhase::Scanning, 0, None, "Scanning repositories...", &[]);

        let ctx = Arc::new(RepoScanContext {
            source: Arc::clone(&self.source),
            project: project.clone(),
            parsers: Arc::clone(&self.parsers),
            resolver: self.resolver,
            policy: Arc::clone(&self.policy),
            sbom: self.sbom,
            max_concurrent_files: self.config.max_concurrent_files,
            max_file_size: self.config.max_file_size,
        });

        let repo_limit = Arc::new(Semaphore::new(self.config.max_concurrent_repos));
        let (started_tx, mut started_rx) = mpsc::unbounded_channel::<String>();
        let mut pending: HashMap<String, String> = HashMap::with_capacity(total);
        let mut tasks = JoinSet::new();

        for repo in repos {
            pending.insert(repo.id.clone(), repo.name.clone());
            let ctx = Arc::clone(&ctx);
            let limit = Arc::clone(&repo_limit);
            let started_tx = started_tx.clone();
            tasks.spawn(async move {
                let result = match limit.acquire_owned().await {
                    Ok(_permit) => {
                        // 수신측이 먼저 끝나도 스캔은 계속
                        let _ = started_tx.send(repo.name.clone());
                        scan_repository(&ctx, &repo).await
                    }
                    Err(e) => Err(ScannerError::Task(format!("repository limiter closed: {e}"))),
                };
                (repo, result)
            });
        }
        drop(started_tx);

        let mut results = Vec::with_capacity(total);
        let mut failed_repos = Vec::new();
        let mut completed = 0usize;

        loop {
            tokio::select! {
                biased;
                Some(name) = started_rx.recv() => {
                    progress.report(
                        ScanPhase::Scanning,
                        completed,
                        Some(&name),
                        format!("Scanning {name}..."),
                        &failed_repos,
                    );
                }
                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    completed += 1;
                    match joined {
                        Ok((repo, outcome)) => {
                            pending.remove(&repo.id);
                            match outcome {
                                Ok(Some(mut result)) => {
                                    result.freshness =
                                        self.freshness.analyze(&repo.name, &result.dependencies);
                                    counter!(m::SCAN_REPOS_SCANNED_TOTAL).increment(1);
                                    results.push(result);
                                }
                                Ok(None) => {
                                    counter!(m::SCAN_REPOS_SCANNED_TOTAL).increment(1);
                                }
                                Err(e) => {
                                    warn!(repo = %repo.name, error = %e, "repository scan failed");
                                    counter!(m::SCAN_REPOS_FAILED_TOTAL).increment(1);
                                    failed_repos.push(repo.name);
                                }
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "repository scan task aborted");
                        }
                    }
                    progress.report(
                        ScanPhase::Scanning,
                        completed,
                        None,
                        format!("Scanned {completed} of {total} repositories..."),
                        &failed_repos,
                    );
                }
            }
        }

        // 결과를 돌려주지 못한 태스크의 저장소
        for name in pending.into_values() {
            counter!(m::SCAN_REPOS_FAILED_TOTAL).increment(1);
            failed_repos.push(name);
        }

        progress.report(
            ScanPhase::Complete,
            total,
            None,
            "Scan complete",
            &failed_repos,
        );

        let elapsed = started.elapsed();
        histogram!(m::SCAN_DURATION_SECONDS).record(elapsed.as_secs_f64());
        token.ensure_current()?;
        counter!(m::SCAN_COMPLETED_TOTAL).increment(1);

        let result = FullScanResult::assemble(
            results,
            all_repo_names,
            failed_repos,
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        );
        info!(
            project = %project,
            repos = result.repos.len(),
            failed = result.failed_repos.len(),
            dependencies = result.total_dependencies,
            violations = result.total_violations,
            duration_ms = result.scan_duration_ms,
            "scan completed"
        );
        Ok(result)
    }
}

/// 저장소 하나를 스캔합니다. 매니페스트가 없으면 `Ok(None)`.
///
/// 최신성 분석은 호출자가 수행하므로 결과의 `freshness`는 비어 있습니다.
async fn scan_repository<S: RepositorySource>(
    ctx: &RepoScanContext<S>,
    repo: &RepositoryRef,
) -> Result<Option<RepoScanResult>, ScannerError> {
    let items = ctx
        .source
        .list_items(&repo.id, &ctx.project)
        .await
        .map_err(|e| ScannerError::Discovery {
            repo: repo.name.clone(),
            reason: e.to_string(),
        })?;

    let manifests = discover_manifests(&items);
    if manifests.is_empty() {
        debug!(repo = %repo.name, items = items.len(), "no dependency manifests found");
        return Ok(None);
    }

    let files = fetch_manifests(ctx, repo, manifests).await;

    let mut parsed = Vec::new();
    for (path, content) in &files {
        parsed.extend(ctx.parsers.parse_file(&repo.name, path, content));
    }

    let deps = deduplicate(parsed);
    let dependencies = ctx.resolver.resolve(&deps);
    let violations = ctx.policy.evaluate(&repo.name, &dependencies);
    let sbom = ctx.sbom.generate(&repo.name, &dependencies);

    debug!(
        repo = %repo.name,
        files = files.len(),
        dependencies = dependencies.len(),
        violations = violations.len(),
        "repository scanned"
    );

    Ok(Some(RepoScanResult {
        repo_name: repo.name.clone(),
        repo_id: repo.id.clone(),
        dependencies,
        violations,
        freshness: Vec::new(),
        sbom,
        scanned_at: chrono::Utc::now().to_rfc3339(),
        files_scanned: files.len(),
    }))
}

/// 매니페스트 내용을 파일 세마포어 한도 안에서 가져옵니다.
///
/// 조회 실패, 빈 내용, 크기 초과 파일은 버립니다. 반환 순서는 입력 경로 순서입니다.
async fn fetch_manifests<S: RepositorySource>(
    ctx: &RepoScanContext<S>,
    repo: &RepositoryRef,
    paths: Vec<String>,
) -> Vec<(String, String)> {
    let file_limit = Arc::new(Semaphore::new(ctx.max_concurrent_files));
    let mut fetches = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        let source = Arc::clone(&ctx.source);
        let limit = Arc::clone(&file_limit);
        let repo_id = repo.id.clone();
        let project = ctx.project.clone();
        fetches.spawn(async move {
            let fetched = match limit.acquire_owned().await {
                Ok(_permit) => source.fetch_content(&repo_id, &path, &project).await,
                Err(e) => Err(ScannerError::Task(format!("file limiter closed: {e}"))),
            };
            (index, path, fetched)
        });
    }

    let mut files = Vec::new();
    while let Some(joined) = fetches.join_next().await {
        let (index, path, fetched) = match joined {
            Ok(entry) => entry,
            Err(e) => {
                warn!(repo = %repo.name, error = %e, "file fetch task aborted");
                counter!(m::SCAN_FILES_SKIPPED_TOTAL).increment(1);
                continue;
            }
        };
        match fetched {
            Ok(content) if content.is_empty() => {
                debug!(repo = %repo.name, path = %path, "skipping empty manifest");
                counter!(m::SCAN_FILES_SKIPPED_TOTAL).increment(1);
            }
            Ok(content) if content.len() > ctx.max_file_size => {
                debug!(
                    repo = %repo.name,
                    path = %path,
                    size = content.len(),
                    max = ctx.max_file_size,
                    "skipping oversized manifest"
                );
                counter!(m::SCAN_FILES_SKIPPED_TOTAL).increment(1);
            }
            Ok(content) => files.push((index, path, content)),
            Err(e) => {
                warn!(repo = %repo.name, path = %path, error = %e, "failed to fetch manifest, skipping");
                counter!(m::SCAN_FILES_SKIPPED_TOTAL).increment(1);
            }
        }
    }

    files.sort_unstable_by_key(|(index, _, _)| *index);
    files
        .into_iter()
        .map(|(_, path, content)| (path, content))
        .collect()
}
