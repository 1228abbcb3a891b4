//! The detector contract

use apex_core::{ApexResult, Document, Finding};

/// A rule-based classifier for one clinical concept
///
/// Detectors own their compiled patterns and are immutable once built, so a
/// single instance can be shared across documents. `detect` returns every
/// candidate finding in the order it was produced; choosing between them is
/// left to [`apex_core::select_best`].
pub trait Detector: Send + Sync {
    /// Stable name used in configuration and output rows
    fn name(&self) -> &'static str;

    /// Classify a document
    ///
    /// `expected` is the gold label, when one is known; it is copied onto
    /// every finding.
    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>>;
}
