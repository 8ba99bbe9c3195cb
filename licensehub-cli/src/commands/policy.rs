//! `licensehub policy` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use licensehub_scanner::settings::PolicyDocument;
use licensehub_scanner::{LicenseCategory, LicensePolicy, PolicySettingsService};

use crate::cli::{PolicyArgs, PolicyCommand};
use crate::commands::{load_config, open_store};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, colored_action};

/// Execute the `policy` command.
pub async fn execute(
    args: PolicyArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;
    let service =
        PolicySettingsService::with_collection(open_store(&config), &config.settings.collection);

    let (doc, reset) = match args.action {
        PolicyCommand::Show => (service.get_policy().await?, false),
        PolicyCommand::Reset => {
            info!(store = %config.settings.store_dir, "resetting license policy");
            (service.reset_policy().await?, true)
        }
    };

    writer.render(&PolicyReport::new(doc, reset))?;
    Ok(())
}

/// Effective license policy report.
#[derive(Serialize)]
pub struct PolicyReport {
    pub id: String,
    pub version: u32,
    /// Whether the policy was just restored to defaults.
    pub reset: bool,
    pub policy: LicensePolicy,
}

impl PolicyReport {
    pub fn new(doc: PolicyDocument, reset: bool) -> Self {
        Self {
            id: doc.id,
            version: doc.version,
            reset,
            policy: doc.policy,
        }
    }
}

impl Render for PolicyReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.reset {
            writeln!(w, "{}", "Policy restored to defaults.".green())?;
        }
        writeln!(w, "Policy: {} (version {})", self.id.bold(), self.version)?;
        writeln!(w)?;

        writeln!(w, "{:<18} Action", "Category")?;
        writeln!(w, "{}", "-".repeat(30))?;
        for category in [
            LicenseCategory::Permissive,
            LicenseCategory::WeakCopyleft,
            LicenseCategory::StrongCopyleft,
            LicenseCategory::Proprietary,
            LicenseCategory::Unknown,
        ] {
            let action = self.policy.category_defaults.action_for(category);
            writeln!(w, "{:<18} {}", category.label(), colored_action(action))?;
        }

        writeln!(w)?;
        if self.policy.specific_overrides.is_empty() {
            writeln!(w, "Overrides: none")?;
        } else {
            writeln!(w, "Overrides:")?;
            for o in &self.policy.specific_overrides {
                writeln!(w, "  {:<24} {}", o.license_id, colored_action(o.action))?;
            }
        }

        if self.policy.excluded_packages.is_empty() {
            writeln!(w, "Excluded packages: none")?;
        } else {
            writeln!(
                w,
                "Excluded packages: {}",
                self.policy.excluded_packages.join(", ")
            )?;
        }

        Ok(())
    }
}
