//! APEX: rule-based classification of clinical notes
//!
//! This crate ties the text engine and the detectors into a batch runner:
//! - Reading notes from corpus directories and SQLite tables
//! - Skipping notes that no detector found anything in on an earlier run
//! - Writing the chosen finding per note and detector to CSV, TSV or SQLite
//! - Scoring findings against truth files
//!
//! # Example
//!
//! ```
//! use apex::{Document, DetectorRegistry, select_best};
//!
//! let registry = DetectorRegistry::with_defaults().unwrap();
//! let doc = Document::from_text("note-1", "Mirena inserted without difficulty.").unwrap();
//! let brand = registry.get("iud_brand").unwrap();
//! let best = select_best(brand.detect(&doc, None).unwrap()).unwrap();
//! assert_eq!(best.status.name, "MIRENA");
//! ```

pub mod config;
pub mod corpus;
pub mod report;
pub mod run;
pub mod sink;
pub mod skip;
pub mod truth;

// Re-export all public APIs from internal crates
pub use apex_algo as algo;
pub use apex_core as core;
pub use apex_diagnostics as diagnostics;

// Convenience re-exports
pub use apex_algo::{Detector, DetectorRef, DetectorRegistry};
pub use apex_core::{Document, DocumentSource, Finding, Pattern, TextSpan, select_best};
pub use apex_diagnostics::{ApexError, ApexResult};
pub use config::RunConfig;
pub use run::{RunSummary, run};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
