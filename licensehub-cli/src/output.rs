//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! This keeps format-specific logic out of command handlers entirely.

use std::io::Write;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use licensehub_scanner::{ApprovalStatus, PolicyAction};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use licensehub_cli::cli::OutputFormat;
    /// use licensehub_cli::output::OutputWriter;
    ///
    /// let writer = OutputWriter::new(OutputFormat::Json);
    /// ```
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to an arbitrary writer.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Colour a policy action for terminal output.
pub fn colored_action(action: PolicyAction) -> ColoredString {
    let label = action.to_string();
    match action {
        PolicyAction::Block => label.red().bold(),
        PolicyAction::Warn => label.yellow(),
        PolicyAction::Allow => label.green(),
    }
}

/// Colour an approval status for terminal output.
pub fn colored_approval(status: ApprovalStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        ApprovalStatus::Approved | ApprovalStatus::AutoApproved => label.green(),
        ApprovalStatus::Unapproved => label.dimmed(),
    }
}
