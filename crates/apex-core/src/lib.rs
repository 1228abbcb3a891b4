//! APEX text engine
//!
//! This crate provides the pattern-matching layer the condition detectors are
//! written against:
//!
//! - **Patterns**: a trigger regex with optional negation regexes. A match is
//!   defeated when any negation expression matches anywhere in the same span.
//! - **Spans**: [`Sentence`], [`Section`] and [`Document`] all implement
//!   [`TextSpan`], which evaluates patterns and records evidence.
//! - **Selection**: sentence selection with neighbour windows and header-based
//!   splitting of radiology-style reports.
//! - **Findings**: per-condition status enums, [`Finding`] and the
//!   [`select_best`] reducer.
//!
//! # Example
//!
//! ```
//! use apex_core::{Document, Pattern, TextSpan};
//!
//! let doc = Document::from_text("note-1", "IUD placed without difficulty.\nNo IUD in place.").unwrap();
//! let placed = Pattern::builder("iud placed").negate("without").build().unwrap();
//! assert!(!doc.has_pattern(&placed));
//! assert!(doc.has_pattern_with(&placed, true));
//! ```
//!
//! # Negation
//!
//! Negation is deliberately coarse: it is evaluated over the whole span the
//! pattern is matched against, not only around the trigger. Matching against a
//! single [`Sentence`] scopes negation to that sentence.

pub mod cask;
pub mod document;
pub mod finding;
pub mod pattern;
pub mod section;
pub mod select;
pub mod sentence;
pub mod span;

pub use cask::{Evidence, MatchCask};
pub use document::{Document, DocumentSource, TextEncoding};
pub use finding::{
    Confidence, Finding, SKIP_CODE, Status, StatusValue, normalize_whitespace, select_best,
};
pub use pattern::{DEFAULT_SPACE_REPLACEMENT, Pattern, PatternBuilder, PatternMatch, loosen};
pub use section::{Section, Sections};
pub use select::{SelectedSections, SentenceSelection};
pub use sentence::Sentence;
pub use span::{PatternQuery, TextSpan};

pub use apex_diagnostics::{ApexError, ApexResult};
