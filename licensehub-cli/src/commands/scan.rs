//! `licensehub scan` command handler

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use licensehub_scanner::approval::ApprovalKey;
use licensehub_scanner::freshness::{RepoVersions, highest_version};
use licensehub_scanner::{
    ApprovalStatus, ApprovedPackagesRegistry, ApprovedPackagesService, FullScanResult,
    PolicyAction, PolicySettingsService, ResolvedDependency, ScanOrchestrator, ScannerConfig,
    build_approval_map,
};

use crate::cli::ScanArgs;
use crate::commands::{load_config, open_store};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, colored_action, colored_approval};
use crate::source::LocalRepositorySource;

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;

    let project = args.project.unwrap_or_else(|| config.scan.project.clone());
    let scanner_config = ScannerConfig::from_core(&config.scan);
    scanner_config.validate()?;

    let store = open_store(&config);
    let policy = PolicySettingsService::with_collection(Arc::clone(&store), &config.settings.collection)
        .get_policy()
        .await?
        .policy;
    let registry = ApprovedPackagesService::with_collection(store, &config.settings.collection)
        .get_registry()
        .await?
        .registry;

    info!(project = %project, repos = args.paths.len(), "starting license scan");

    let source = Arc::new(LocalRepositorySource::new(
        project.clone(),
        &args.paths,
        scanner_config.max_file_size,
    ));
    let mut orchestrator = ScanOrchestrator::new(source, scanner_config, policy);

    let result = orchestrator
        .scan(|progress| {
            debug!(
                phase = %progress.phase,
                completed = progress.repos_completed,
                total = progress.repos_total,
                "{}",
                progress.message
            );
        })
        .await?;

    let sbom_paths = match args.sbom_dir.as_deref() {
        Some(dir) => write_sboms(dir, &result).await?,
        None => HashMap::new(),
    };

    let report = build_scan_report(
        project,
        &result,
        orchestrator.freshness().inconsistencies(),
        &registry,
        &sbom_paths,
    );

    writer.render(&report)?;

    if report.blocked > 0 {
        return Err(CliError::PolicyBlocked(format!(
            "{} blocked dependencies",
            report.blocked
        )));
    }

    Ok(())
}

/// Write one CycloneDX document per scanned repository.
///
/// Returns repository name -> written file path.
async fn write_sboms(
    dir: &Path,
    result: &FullScanResult,
) -> Result<HashMap<String, String>, CliError> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = HashMap::new();
    for repo in &result.repos {
        let path = dir.join(sbom_file_name(&repo.repo_name));
        let json = repo.sbom.to_json_pretty()?;
        tokio::fs::write(&path, json).await?;
        info!(repo = %repo.repo_name, path = %path.display(), "wrote SBOM");
        written.insert(repo.repo_name.clone(), path.display().to_string());
    }
    Ok(written)
}

/// File name for a repository SBOM: unsafe characters become `_`.
pub fn sbom_file_name(repo_name: &str) -> PathBuf {
    let safe: String = repo_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_matches('.');
    let stem = if safe.is_empty() { "repository" } else { safe };
    PathBuf::from(format!("{stem}.cdx.json"))
}

/// Convert a scan result into the CLI report.
pub fn build_scan_report(
    project: String,
    result: &FullScanResult,
    inconsistencies: BTreeMap<String, RepoVersions>,
    registry: &ApprovedPackagesRegistry,
    sbom_paths: &HashMap<String, String>,
) -> ScanReport {
    let violating: Vec<ResolvedDependency> = result
        .repos
        .iter()
        .flat_map(|r| r.violations.iter().map(|v| v.dependency.clone()))
        .collect();
    let approvals: HashMap<ApprovalKey, ApprovalStatus> =
        build_approval_map(&violating, registry);

    let repos = result
        .repos
        .iter()
        .map(|r| RepoSummary {
            name: r.repo_name.clone(),
            files_scanned: r.files_scanned,
            dependencies: r.dependencies.len(),
            violations: r.violations.len(),
            blocked: r.blocked_count(),
            sbom_path: sbom_paths.get(&r.repo_name).cloned(),
        })
        .collect();

    let violations = result
        .repos
        .iter()
        .flat_map(|r| &r.violations)
        .map(|v| {
            let dep = &v.dependency;
            let key = (
                dep.name().to_owned(),
                dep.ecosystem(),
                dep.version().to_owned(),
            );
            ViolationEntry {
                repo: v.repo_name.clone(),
                package: dep.name().to_owned(),
                version: dep.version().to_owned(),
                ecosystem: dep.ecosystem().to_string(),
                license: dep.license.clone(),
                action: v.action,
                reason: v.reason.clone(),
                approval: approvals
                    .get(&key)
                    .copied()
                    .unwrap_or(ApprovalStatus::Unapproved),
            }
        })
        .collect();

    let inconsistencies = inconsistencies
        .into_iter()
        .map(|(package, repos)| {
            let highest =
                highest_version(repos.values().flatten().map(String::as_str)).map(str::to_owned);
            InconsistencyEntry {
                package,
                highest,
                repos: repos
                    .into_iter()
                    .map(|(repo, versions)| (repo, versions.into_iter().collect()))
                    .collect(),
            }
        })
        .collect();

    ScanReport {
        project,
        repos_total: result.all_repo_names.len(),
        total_dependencies: result.total_dependencies,
        total_violations: result.total_violations,
        blocked: result.blocked_count(),
        failed_repos: result.failed_repos.clone(),
        scan_duration_ms: result.scan_duration_ms,
        repos,
        violations,
        inconsistencies,
    }
}

#[derive(Serialize)]
pub struct ScanReport {
    pub project: String,
    pub repos_total: usize,
    pub total_dependencies: usize,
    pub total_violations: usize,
    pub blocked: usize,
    pub failed_repos: Vec<String>,
    pub scan_duration_ms: u64,
    pub repos: Vec<RepoSummary>,
    pub violations: Vec<ViolationEntry>,
    pub inconsistencies: Vec<InconsistencyEntry>,
}

#[derive(Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub files_scanned: usize,
    pub dependencies: usize,
    pub violations: usize,
    pub blocked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbom_path: Option<String>,
}

#[derive(Serialize)]
pub struct ViolationEntry {
    pub repo: String,
    pub package: String,
    pub version: String,
    pub ecosystem: String,
    pub license: String,
    pub action: PolicyAction,
    pub reason: String,
    pub approval: ApprovalStatus,
}

/// A package observed at more than one version across repositories.
#[derive(Serialize)]
pub struct InconsistencyEntry {
    /// `"{ecosystem}:{name}"`
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest: Option<String>,
    pub repos: BTreeMap<String, Vec<String>>,
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Project: {}", self.project.bold())?;
        writeln!(
            w,
            "Repositories: {} ({} with dependencies, {} failed)",
            self.repos_total,
            self.repos.len(),
            self.failed_repos.len()
        )?;
        writeln!(w, "Dependencies: {}", self.total_dependencies)?;

        let violation_str = format!(
            "{} total ({} blocked)",
            self.total_violations, self.blocked
        );
        if self.blocked > 0 {
            writeln!(w, "Violations: {}", violation_str.red().bold())?;
        } else if self.total_violations > 0 {
            writeln!(w, "Violations: {}", violation_str.yellow())?;
        } else {
            writeln!(w, "Violations: {}", violation_str.green().bold())?;
        }
        writeln!(w, "Duration: {}ms", self.scan_duration_ms)?;

        if !self.failed_repos.is_empty() {
            writeln!(w, "Failed: {}", self.failed_repos.join(", ").red())?;
        }
        writeln!(w)?;

        if !self.repos.is_empty() {
            writeln!(
                w,
                "{:<28} {:>6} {:>6} {:>10} {:>8}",
                "Repository", "Files", "Deps", "Violations", "Blocked"
            )?;
            writeln!(w, "{}", "-".repeat(62))?;
            for r in &self.repos {
                writeln!(
                    w,
                    "{:<28} {:>6} {:>6} {:>10} {:>8}",
                    r.name, r.files_scanned, r.dependencies, r.violations, r.blocked
                )?;
                if let Some(ref path) = r.sbom_path {
                    writeln!(w, "  sbom: {}", path.dimmed())?;
                }
            }
            writeln!(w)?;
        }

        if self.violations.is_empty() {
            writeln!(w, "{}", "No policy violations found.".green())?;
        } else {
            writeln!(
                w,
                "{:<6} {:<16} {:<30} {:<14} {:<20} Approval",
                "Action", "Repository", "Package", "Version", "License"
            )?;
            writeln!(w, "{}", "-".repeat(100))?;
            for v in &self.violations {
                writeln!(
                    w,
                    "{:<6} {:<16} {:<30} {:<14} {:<20} {}",
                    colored_action(v.action),
                    v.repo,
                    format!("{} ({})", v.package, v.ecosystem),
                    v.version,
                    v.license,
                    colored_approval(v.approval)
                )?;
                writeln!(w, "       {}", v.reason.dimmed())?;
            }
        }

        if !self.inconsistencies.is_empty() {
            writeln!(w)?;
            writeln!(w, "Version inconsistencies:")?;
            for i in &self.inconsistencies {
                let highest = i.highest.as_deref().unwrap_or("?");
                writeln!(w, "  {} (highest: {})", i.package.bold(), highest)?;
                for (repo, versions) in &i.repos {
                    writeln!(w, "    {:<24} {}", repo, versions.join(", "))?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sbom_file_name_replaces_unsafe_characters() {
        assert_eq!(sbom_file_name("web"), PathBuf::from("web.cdx.json"));
        assert_eq!(
            sbom_file_name("team/api service"),
            PathBuf::from("team_api_service.cdx.json")
        );
        assert_eq!(sbom_file_name(".."), PathBuf::from("repository.cdx.json"));
    }

    #[test]
    fn empty_report_renders_clean_summary() {
        colored::control::set_override(false);
        let result = FullScanResult::assemble(Vec::new(), vec!["docs".to_owned()], Vec::new(), 3);
        let report = build_scan_report(
            "platform".to_owned(),
            &result,
            BTreeMap::new(),
            &ApprovedPackagesRegistry::default(),
            &HashMap::new(),
        );
        assert_eq!(report.repos_total, 1);
        assert_eq!(report.blocked, 0);

        let mut buf = Vec::new();
        report.render_text(&mut buf).expect("render succeeds");
        let text = String::from_utf8(buf).expect("valid UTF-8");
        assert!(text.contains("Project: platform"));
        assert!(text.contains("No policy violations found."));
        assert!(!text.contains("Version inconsistencies"));
    }
}
