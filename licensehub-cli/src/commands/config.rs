//! `licensehub config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use licensehub_core::config::LicenseHubConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
pub const SECTIONS: &[&str] = &["general", "scan", "settings"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// Unlike other commands, a missing file is reported as invalid here.
///
/// # Errors
///
/// Returns `CliError::Config` if the file is missing, malformed or fails validation.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let errors = match LicenseHubConfig::load(config_path).await {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };
    let report = ConfigValidationReport {
        source: config_path.display().to_string(),
        valid: errors.is_empty(),
        errors,
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Config` if loading fails or `CliError::Command` if the section name is unknown.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = load_config(config_path).await?;
    let report = build_config_report(config_path.display().to_string(), &config, section)?;

    writer.render(&report)?;

    Ok(())
}

/// Build the report for the full configuration or a single section.
pub fn build_config_report(
    source: String,
    config: &LicenseHubConfig,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let (config_toml, values) = match section.as_deref() {
        None => section_values(config)?,
        Some("general") => section_values(&config.general)?,
        Some("scan") => section_values(&config.scan)?,
        Some("settings") => section_values(&config.settings)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source,
        section,
        values,
        config_toml,
    })
}

fn section_values<T: Serialize>(value: &T) -> Result<(String, serde_json::Value), CliError> {
    let config_toml = toml::to_string_pretty(value)
        .map_err(|e| CliError::Config(format!("failed to serialize configuration: {e}")))?;
    let values = serde_json::to_value(value)?;
    Ok((config_toml, values))
}

/// Configuration display report.
///
/// JSON output carries the structured values; text output prints TOML.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Effective values
    pub values: serde_json::Value,
    /// Serialized TOML, text output only
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match self.section {
            Some(ref section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{section}]").bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(report: &dyn Render) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_full_config_report_contains_every_section() {
        let config = LicenseHubConfig::default();
        let report = build_config_report("licensehub.toml".to_owned(), &config, None)
            .expect("report should build");

        let output = render(&report);
        assert!(output.contains("Configuration (source: licensehub.toml)"));
        for section in SECTIONS {
            assert!(output.contains(&format!("[{section}]")), "missing [{section}]");
        }
        assert_eq!(report.values["scan"]["project"], "local");
    }

    #[test]
    fn test_section_report_only_shows_section() {
        let config = LicenseHubConfig::default();
        let report =
            build_config_report("licensehub.toml".to_owned(), &config, Some("settings".to_owned()))
                .expect("report should build");

        let output = render(&report);
        assert!(output.contains("[settings]"));
        assert!(output.contains("store_dir"));
        assert!(!output.contains("max_file_size"));
        assert_eq!(report.values["collection"], "ComplianceScannerSettings");
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let config = LicenseHubConfig::default();
        let result = build_config_report("x.toml".to_owned(), &config, Some("ebpf".to_owned()));
        match result {
            Err(CliError::Command(msg)) => {
                assert!(msg.contains("unknown section: ebpf"));
                assert!(msg.contains("general, scan, settings"));
            }
            _ => panic!("expected Command error"),
        }
    }

    #[test]
    fn test_config_report_json_skips_toml_text() {
        let config = LicenseHubConfig::default();
        let report =
            build_config_report("x.toml".to_owned(), &config, Some("general".to_owned()))
                .expect("report should build");

        let parsed = serde_json::to_value(&report).expect("JSON serialization should succeed");
        assert_eq!(parsed["section"], "general");
        assert_eq!(parsed["values"]["log_format"], "pretty");
        assert!(parsed.get("config_toml").is_none());
    }

    #[test]
    fn test_validation_report_lists_errors() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["general.log_level: must be one of: trace, debug".to_owned()],
        };

        let output = render(&report);
        assert!(output.contains("INVALID"));
        assert!(output.contains("general.log_level"));
    }

    #[test]
    fn test_validation_report_valid() {
        let report = ConfigValidationReport {
            source: "licensehub.toml".to_owned(),
            valid: true,
            errors: Vec::new(),
        };

        let output = render(&report);
        assert!(output.contains("VALID"));
        assert!(!output.contains("Error:"));
    }
}
