//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// LicenseHub -- dependency license compliance scanner.
///
/// Use `licensehub <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "licensehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to the licensehub.toml configuration file.
    #[arg(short, long, default_value = "licensehub.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan local repositories for dependency license compliance.
    Scan(ScanArgs),

    /// Manage the persisted license policy.
    Policy(PolicyArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Scan one or more repository directories.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Repository directories to scan (default: current directory).
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Project name reported for this scan (default: `scan.project` from config).
    #[arg(long)]
    pub project: Option<String>,

    /// Write one CycloneDX JSON document per repository into this directory.
    #[arg(long)]
    pub sbom_dir: Option<PathBuf>,
}

// ---- policy ----

/// Manage the license policy document.
#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub action: PolicyCommand,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// Show the effective policy (seeds the default on first use).
    Show,
    /// Restore the default policy.
    Reset,
}

// ---- config ----

/// Manage licensehub configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, scan, settings).
        #[arg(long)]
        section: Option<String>,
    },
}
