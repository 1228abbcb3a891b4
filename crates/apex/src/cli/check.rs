//! Check command implementation
//!
//! Runs detectors over a single note and reports every candidate finding,
//! marking the one that would be written by a batch run.

use super::output::{self, OutputFormat};
use anyhow::{Context, Result};
use apex_algo::{DetectorRef, DetectorRegistry};
use apex_core::{Document, Finding, TextEncoding, select_best};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for check command
pub struct CheckConfig {
    pub text: Option<String>,
    pub input: Option<PathBuf>,
    pub algorithms: Vec<String>,
    pub encoding: TextEncoding,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// One candidate finding as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct FindingReport {
    #[tabled(rename = "Algorithm")]
    pub algorithm: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Result")]
    pub result: i32,
    #[tabled(rename = "Confidence")]
    pub confidence: String,
    #[tabled(rename = "Chosen")]
    pub chosen: bool,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Text")]
    pub text: String,
}

impl FindingReport {
    fn new(algorithm: &str, finding: &Finding, chosen: bool) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            status: finding.status.name.to_string(),
            result: finding.result,
            confidence: finding.confidence.to_string(),
            chosen,
            date: finding.date.clone().unwrap_or_default(),
            text: finding.text.clone().unwrap_or_default(),
        }
    }
}

/// Every finding of every detector for one document
pub fn classify(doc: &Document, detectors: &[DetectorRef]) -> Result<Vec<FindingReport>> {
    let mut reports = Vec::new();
    for detector in detectors {
        let findings = detector
            .detect(doc, None)
            .with_context(|| format!("{} failed on {}", detector.name(), doc.name()))?;
        let chosen = select_best(findings.iter().cloned())
            .and_then(|best| findings.iter().position(|f| *f == best));
        reports.extend(
            findings
                .iter()
                .enumerate()
                .map(|(i, f)| FindingReport::new(detector.name(), f, chosen == Some(i))),
        );
    }
    Ok(reports)
}

/// Classify one note given inline or as a file
pub fn check(config: CheckConfig) -> Result<()> {
    let doc = match (config.text, config.input) {
        (Some(text), _) => Document::from_text("text", text)?,
        (None, Some(path)) => {
            let name = path
                .file_name()
                .map(|n| crate::corpus::document_name(&n.to_string_lossy()).to_string())
                .unwrap_or_else(|| "input".to_string());
            Document::from_file(name, &path, config.encoding)
                .with_context(|| format!("Failed to read {}", path.display()))?
        }
        (None, None) => anyhow::bail!("Provide a note with --text or --input"),
    };

    let registry = DetectorRegistry::with_defaults()?;
    let detectors = registry.select(&config.algorithms)?;
    let reports = classify(&doc, &detectors)?;

    let format = config
        .output_format
        .as_deref()
        .map(OutputFormat::parse)
        .unwrap_or_default();
    output::print_rows(&reports, format, config.output_file.as_deref())
}

/// Detector names, one per row
#[derive(Debug, Serialize, Tabled)]
struct DetectorRow {
    #[tabled(rename = "Algorithm")]
    name: String,
}

/// Print the available detectors
pub fn list(output_format: Option<&str>) -> Result<()> {
    let registry = DetectorRegistry::with_defaults()?;
    let rows: Vec<_> = registry
        .names()
        .map(|name| DetectorRow {
            name: name.to_string(),
        })
        .collect();
    let format = output_format.map(OutputFormat::parse).unwrap_or_default();
    output::print_rows(&rows, format, None)
}
