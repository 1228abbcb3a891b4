//! Match evidence accumulator

use crate::pattern::{Pattern, PatternMatch};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// One recorded match: which pattern fired and on what text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    /// Authored expression of the pattern that matched
    pub pattern: String,
    /// Matched substring
    pub text: String,
}

impl Evidence {
    pub fn new(pattern: &Pattern, m: &PatternMatch) -> Self {
        Self {
            pattern: pattern.as_str().to_string(),
            text: m.as_str().to_string(),
        }
    }
}

/// Append-only list of match evidence
///
/// Cloning a cask (or calling [`MatchCask::share`]) yields a handle onto the
/// same storage, so a document and every sentence and section cut from it
/// record into one list. [`MatchCask::snapshot`] makes an independent copy.
#[derive(Clone, Default)]
pub struct MatchCask {
    inner: Arc<Mutex<Vec<Evidence>>>,
}

impl MatchCask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another handle onto the same evidence list
    pub fn share(&self) -> Self {
        self.clone()
    }

    /// An independent copy of the current evidence
    pub fn snapshot(&self) -> Self {
        Self {
            inner: Arc::new(Mutex::new(self.inner.lock().clone())),
        }
    }

    /// Whether both handles refer to the same list
    pub fn is_shared_with(&self, other: &MatchCask) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn add(&self, evidence: Evidence) {
        self.inner.lock().push(evidence);
    }

    /// Record a match
    pub fn record(&self, pattern: &Pattern, m: &PatternMatch) {
        self.add(Evidence::new(pattern, m));
    }

    /// Append the evidence of `other`, unless both handles alias one list
    pub fn merge(&self, other: &MatchCask) {
        if self.is_shared_with(other) {
            return;
        }
        let theirs = other.inner.lock().clone();
        self.inner.lock().extend(theirs);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copy of all evidence in recording order
    pub fn evidence(&self) -> Vec<Evidence> {
        self.inner.lock().clone()
    }

    /// Distinct matched terms, lower-cased and sorted
    pub fn terms(&self) -> BTreeSet<String> {
        self.inner
            .lock()
            .iter()
            .map(|e| e.text.to_lowercase())
            .collect()
    }
}

impl fmt::Debug for MatchCask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchCask").field("len", &self.len()).finish()
    }
}

impl fmt::Display for MatchCask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<_> = self.terms().into_iter().collect();
        write!(f, "{{{}}}", terms.join(", "))
    }
}
