//! Output formatting utilities

use anyhow::{Context, Result};
use apex_diagnostics::ApexError;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    #[default]
    Table,
}

impl OutputFormat {
    /// Parse a format name; unknown names fall back to the table view
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "json-pretty" => Self::JsonPretty,
            _ => Self::Table,
        }
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
///
/// Engine errors are shown as diagnostics with their code and help text.
pub fn format_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ApexError>() {
        Some(apex) => {
            let mut out = apex.to_diagnostic().colored();
            for cause in error.chain().skip(1) {
                out.push_str(&format!("\n  {} {}", "caused by:".dimmed(), cause));
            }
            out
        }
        None => format!("{} {:#}", "Error:".red().bold(), error),
    }
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Render rows in the requested format
pub fn format_rows<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(rows).context("Failed to serialize JSON"),
        OutputFormat::JsonPretty => {
            serde_json::to_string_pretty(rows).context("Failed to serialize JSON")
        }
        OutputFormat::Table if rows.is_empty() => Ok("(no rows)".to_string()),
        OutputFormat::Table => Ok(Table::new(rows).with(Style::modern()).to_string()),
    }
}

/// Print rows in the specified format
pub fn print_rows<T: Serialize + Tabled>(
    rows: &[T],
    format: OutputFormat,
    output_file: Option<&Path>,
) -> Result<()> {
    let content = format_rows(rows, format)?;
    write_output(&content, output_file)
}
