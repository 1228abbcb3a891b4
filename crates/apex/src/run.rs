//! Batch pipeline
//!
//! Every selected detector runs over every corpus entry. The best finding per
//! detector is scored and, when actionable, written to the sink; every
//! candidate finding goes to the audit log. A failing document is logged and
//! the run moves on.

use crate::config::{DATETIME_FORMAT, RunConfig};
use crate::corpus::{Corpus, CorpusEntry};
use crate::report::Reporter;
use crate::sink::{AuditLog, ResultRow, ResultSink, open_sink};
use crate::skip::Skipper;
use crate::truth::TruthTable;
use apex_algo::{DetectorRef, DetectorRegistry};
use apex_core::{ApexResult, Document, TextSpan, select_best};
use chrono::Local;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What a run did
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Documents that were read and classified
    pub documents: usize,
    /// Documents added to the skip list
    pub skipped: usize,
    pub errors: usize,
    pub reporters: IndexMap<String, Reporter>,
    pub audit_log: Option<PathBuf>,
}

/// Outcome of classifying one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    Classified,
    /// Every detector returned only SKIP findings
    Skipped,
    Failed,
}

/// Per-run state shared across documents
pub struct Pipeline {
    detectors: Vec<DetectorRef>,
    truth: TruthTable,
    sink: Box<dyn ResultSink>,
    audit: AuditLog,
    skipper: Skipper,
    summary: RunSummary,
}

impl Pipeline {
    pub fn new(
        detectors: Vec<DetectorRef>,
        truth: TruthTable,
        sink: Box<dyn ResultSink>,
        audit: AuditLog,
        skipper: Skipper,
    ) -> Self {
        let reporters = detectors
            .iter()
            .map(|d| (d.name().to_string(), Reporter::new()))
            .collect();
        let summary = RunSummary {
            reporters,
            audit_log: audit.path().map(PathBuf::from),
            ..RunSummary::default()
        };
        Self {
            detectors,
            truth,
            sink,
            audit,
            skipper,
            summary,
        }
    }

    /// Classify one entry with every detector
    ///
    /// Only sink, audit-log and skip-list write failures are returned;
    /// document and detector failures are recorded and counted.
    pub fn process(&mut self, entry: CorpusEntry) -> ApexResult<DocumentOutcome> {
        let doc = match Document::from_source(entry.name.as_str(), entry.source) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("{}: {}", entry.name, err);
                self.audit.record_error(&entry.name, "*", &err)?;
                self.summary.errors += 1;
                return Ok(DocumentOutcome::Failed);
            }
        };
        let expected = self.truth.get(doc.name());

        let mut all_skip = true;
        let mut failed = false;
        for detector in &self.detectors {
            let algorithm = detector.name();
            let recorded = doc.cask().len();
            let findings = match detector.detect(&doc, expected) {
                Ok(findings) => findings,
                Err(err) => {
                    warn!("{} [{}]: {}", doc.name(), algorithm, err);
                    self.audit.record_error(doc.name(), algorithm, &err)?;
                    all_skip = false;
                    failed = true;
                    continue;
                }
            };

            let matches: Vec<String> = doc
                .cask()
                .evidence()
                .into_iter()
                .skip(recorded)
                .map(|e| e.text.to_lowercase())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            for finding in &findings {
                self.audit.record(doc.name(), algorithm, finding, &matches)?;
            }
            all_skip &= findings.iter().all(|f| f.is_skip());

            let Some(best) = select_best(findings) else {
                continue;
            };
            debug!(
                "{}[{}]: {} {}::{:?}",
                doc.name(),
                algorithm,
                best.status,
                best,
                matches
            );
            if best.is_skip() {
                continue;
            }
            if let Some(reporter) = self.summary.reporters.get_mut(algorithm) {
                reporter.update(&best);
            }
            if best.is_actionable() {
                self.sink
                    .write_row(&ResultRow::from_finding(doc.name(), algorithm, &best))?;
            }
        }

        self.summary.documents += 1;
        if failed {
            self.summary.errors += 1;
            return Ok(DocumentOutcome::Failed);
        }
        if all_skip {
            self.skipper.add(doc.name())?;
            self.summary.skipped += 1;
            return Ok(DocumentOutcome::Skipped);
        }
        Ok(DocumentOutcome::Classified)
    }

    /// Flush the outputs and return the summary
    pub fn finish(mut self) -> ApexResult<RunSummary> {
        self.sink.finish()?;
        self.audit.finish()?;
        Ok(self.summary)
    }
}

/// Run the configured batch
pub fn run(config: &RunConfig, registry: &DetectorRegistry) -> ApexResult<RunSummary> {
    config.validate(registry)?;
    let detectors = registry.select(&config.algorithm.names)?;
    let timestamp = Local::now().format(DATETIME_FORMAT).to_string();

    let truth = TruthTable::load(&config.truth_files())?;
    let skipper = Skipper::open(config.skipinfo.as_ref())?;
    let corpus = Corpus::from_config(config, &skipper)?;
    let sink = open_sink(config.output.as_ref(), &timestamp)?;
    let audit = if config.loginfo.ignore {
        AuditLog::disabled()
    } else {
        AuditLog::create(&config.loginfo.directory, &timestamp)?
    };
    info!(
        "Running {} detectors over {} documents ({} gold labels)",
        detectors.len(),
        corpus.len(),
        truth.len()
    );

    let mut pipeline = Pipeline::new(detectors, truth, sink, audit, skipper);
    for (i, entry) in corpus.into_iter().enumerate() {
        debug!("{}: {}", i, entry.name);
        pipeline.process(entry)?;
    }
    let summary = pipeline.finish()?;

    info!(
        "Processed {} documents: {} skipped, {} errors",
        summary.documents, summary.skipped, summary.errors
    );
    for (name, reporter) in &summary.reporters {
        info!("{}: {}", name, reporter);
    }
    Ok(summary)
}
