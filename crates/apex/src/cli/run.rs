//! Run command implementation

use super::output::{self, OutputFormat};
use crate::config::RunConfig;
use crate::report::Reporter;
use anyhow::{Context, Result};
use apex_algo::DetectorRegistry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::Tabled;

/// Configuration for run command
pub struct RunCommandConfig {
    pub config: RunConfig,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// Accuracy of one detector over the run
#[derive(Debug, Serialize, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "Algorithm")]
    pub algorithm: String,
    #[tabled(rename = "Summary")]
    pub summary: String,
    #[tabled(rename = "TP")]
    pub tp: u32,
    #[tabled(rename = "FP")]
    pub fp: u32,
    #[tabled(rename = "Error")]
    pub error: u32,
    #[tabled(rename = "FN")]
    #[serde(rename = "fn")]
    pub fn_: u32,
    #[tabled(rename = "TN")]
    pub tn: u32,
}

impl ReportRow {
    fn new(algorithm: &str, reporter: &Reporter) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            summary: reporter.to_string(),
            tp: reporter.tp,
            fp: reporter.fp,
            error: reporter.error,
            fn_: reporter.fn_,
            tn: reporter.tn,
        }
    }
}

/// Load a run configuration file
pub fn load(path: &Path) -> Result<RunConfig> {
    RunConfig::load(path).with_context(|| format!("Failed to load configuration {}", path.display()))
}

/// Run a batch and print the per-detector report
pub fn execute(config: RunCommandConfig) -> Result<()> {
    let registry = DetectorRegistry::with_defaults()?;
    let summary = crate::run(&config.config, &registry)?;

    let rows: Vec<_> = summary
        .reporters
        .iter()
        .map(|(name, reporter)| ReportRow::new(name, reporter))
        .collect();
    let format = config
        .output_format
        .as_deref()
        .map(OutputFormat::parse)
        .unwrap_or_default();
    output::print_rows(&rows, format, config.output_file.as_deref())?;

    eprintln!(
        "{}",
        output::format_success(&format!(
            "{} documents processed, {} skipped",
            summary.documents, summary.skipped
        ))
    );
    if summary.errors > 0 {
        eprintln!(
            "{}",
            output::format_warning(&format!("{} documents had errors", summary.errors))
        );
    }
    if let Some(path) = &summary.audit_log {
        eprintln!("Audit log: {}", path.display());
    }
    Ok(())
}
