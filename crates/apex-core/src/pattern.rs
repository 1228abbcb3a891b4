//! Trigger/negation patterns
//!
//! A [`Pattern`] is a compiled trigger expression plus an ordered set of
//! negation expressions. A text span matches when the trigger matches and no
//! negation expression matches anywhere in the same span. Negation is
//! deliberately span-scoped rather than proximity-based: a negation phrase in
//! any part of a sentence (or window) suppresses the whole span.

use apex_diagnostics::{APX0101, APX0102, ApexError, ApexResult};
use regex::{Captures, Regex, RegexBuilder};
use std::fmt;
use std::ops::Range;

/// Replacement used for literal spaces when whitespace loosening is enabled
pub const DEFAULT_SPACE_REPLACEMENT: &str = r"\W*";

/// An immutable trigger expression with its negation set
#[derive(Clone)]
pub struct Pattern {
    source: String,
    trigger: Regex,
    negates: Vec<Regex>,
    group_stride: Option<usize>,
}

impl Pattern {
    /// Compile a case-insensitive, whitespace-loosened pattern without negations
    pub fn new(expr: &str) -> ApexResult<Self> {
        Self::builder(expr).build()
    }

    /// Start building a pattern
    pub fn builder(expr: impl Into<String>) -> PatternBuilder {
        PatternBuilder::new(expr)
    }

    /// The expression as authored (before whitespace loosening)
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled trigger
    pub fn trigger(&self) -> &Regex {
        &self.trigger
    }

    /// Number of negation expressions
    pub fn negation_count(&self) -> usize {
        self.negates.len()
    }

    /// Configured capture-group stride
    pub fn group_stride(&self) -> Option<usize> {
        self.group_stride
    }

    /// Match `text`, honoring negation
    pub fn matches(&self, text: &str) -> Option<PatternMatch> {
        self.matches_with(text, false)
    }

    /// Match `text`, optionally bypassing the negation set
    ///
    /// Returns `None` when the trigger does not match, or when any negation
    /// expression matches the same text and `ignore_negation` is false.
    pub fn matches_with(&self, text: &str, ignore_negation: bool) -> Option<PatternMatch> {
        let caps = self.trigger.captures(text)?;
        if !ignore_negation && self.is_negated(text) {
            return None;
        }
        Some(PatternMatch::from_captures(&caps, self.group_stride))
    }

    /// Whether the pattern matches `text` (honoring negation)
    pub fn is_match(&self, text: &str) -> bool {
        self.trigger.is_match(text) && !self.is_negated(text)
    }

    /// Whether any negation expression matches `text`
    pub fn is_negated(&self, text: &str) -> bool {
        self.negates.iter().any(|n| n.is_match(text))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("negates", &self.negates.len())
            .field("group_stride", &self.group_stride)
            .finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Builder for [`Pattern`]
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    expr: String,
    negates: Vec<String>,
    space_replacement: Option<String>,
    case_insensitive: bool,
    group_stride: Option<usize>,
}

impl PatternBuilder {
    fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            negates: Vec::new(),
            space_replacement: Some(DEFAULT_SPACE_REPLACEMENT.to_string()),
            case_insensitive: true,
            group_stride: None,
        }
    }

    /// Add a negation expression
    pub fn negate(mut self, expr: impl Into<String>) -> Self {
        self.negates.push(expr.into());
        self
    }

    /// Add several negation expressions, in order
    pub fn negates<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.negates.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Enable or disable replacing literal spaces with [`DEFAULT_SPACE_REPLACEMENT`]
    pub fn loosen_spaces(mut self, loosen: bool) -> Self {
        self.space_replacement = loosen.then(|| DEFAULT_SPACE_REPLACEMENT.to_string());
        self
    }

    /// Replace literal spaces with a custom expression
    pub fn space_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.space_replacement = Some(replacement.into());
        self
    }

    /// Case sensitivity (insensitive by default)
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Treat the trigger's groups as repeated alternatives of `stride` groups each
    pub fn group_stride(mut self, stride: usize) -> Self {
        self.group_stride = Some(stride);
        self
    }

    /// Compile the pattern
    pub fn build(self) -> ApexResult<Pattern> {
        let trigger = self.compile(&self.expr)?;

        if let Some(stride) = self.group_stride {
            let groups = trigger.captures_len() - 1;
            if stride == 0 || groups % stride != 0 {
                return Err(ApexError::pattern(
                    APX0102,
                    format!("{} capture groups cannot be split by stride {}", groups, stride),
                    self.expr,
                ));
            }
        }

        let negates = self
            .negates
            .iter()
            .map(|n| {
                self.compile(n).map_err(|e| match e {
                    ApexError::Pattern { message, pattern, .. } => {
                        ApexError::pattern(APX0101, message, pattern)
                    }
                    other => other,
                })
            })
            .collect::<ApexResult<Vec<_>>>()?;

        Ok(Pattern {
            source: self.expr,
            trigger,
            negates,
            group_stride: self.group_stride,
        })
    }

    fn compile(&self, expr: &str) -> ApexResult<Regex> {
        let loosened = match &self.space_replacement {
            Some(replacement) => loosen(expr, replacement),
            None => expr.to_string(),
        };
        RegexBuilder::new(&loosened)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|e| ApexError::invalid_regex(expr, e))
    }
}

/// Replace every literal space in `expr` with `replacement`
pub fn loosen(expr: &str, replacement: &str) -> String {
    expr.split(' ').collect::<Vec<_>>().join(replacement)
}

/// A successful trigger match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    text: String,
    range: Range<usize>,
    groups: Vec<Option<String>>,
    stride: Option<usize>,
}

impl PatternMatch {
    fn from_captures(caps: &Captures<'_>, stride: Option<usize>) -> Self {
        let whole = caps.get(0).map(|m| (m.as_str().to_string(), m.range()));
        let (text, range) = whole.unwrap_or_default();
        let groups = caps
            .iter()
            .skip(1)
            .map(|g| g.map(|m| m.as_str().to_string()))
            .collect();
        Self {
            text,
            range,
            groups,
            stride,
        }
    }

    /// The matched substring
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte range of the match within the evaluated span
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Access a captured group
    ///
    /// Index 0 is the whole match. With a group stride, index `i` resolves to
    /// the `i`-th group of the first alternative in which that group took part.
    pub fn group(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return Some(&self.text);
        }
        match self.stride {
            Some(stride) if index <= stride => self
                .groups
                .chunks(stride)
                .find_map(|alt| alt[index - 1].as_deref()),
            Some(_) => None,
            None => self.groups.get(index - 1).and_then(|g| g.as_deref()),
        }
    }

    /// All groups, compressed by the stride when one is configured
    pub fn groups(&self) -> Vec<Option<&str>> {
        match self.stride {
            Some(stride) => (1..=stride).map(|i| self.group(i)).collect(),
            None => self.groups.iter().map(|g| g.as_deref()).collect(),
        }
    }
}

impl fmt::Display for PatternMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_diagnostics::APX0100;

    #[test]
    fn test_negation_defeats_whole_span() {
        let p = Pattern::builder(r"(paragu?ard)")
            .negate(r"(risks?|benefits?)")
            .build()
            .unwrap();
        assert!(p.matches("risks of paragard").is_none());
        assert!(p.matches_with("risks of paragard", true).is_some());
        assert_eq!(p.matches("paragard placed today").unwrap().as_str(), "paragard");
    }

    #[test]
    fn test_case_insensitive_default() {
        let p = Pattern::new("mirena").unwrap();
        assert!(p.is_match("MIRENA in place"));

        let strict = Pattern::builder("IMPRESSION").case_insensitive(false).build().unwrap();
        assert!(!strict.is_match("impression"));
    }

    #[test]
    fn test_space_loosening() {
        let p = Pattern::new("breast milk").unwrap();
        assert!(p.is_match("breast\nmilk"));
        assert!(p.is_match("breast  milk"));
        assert!(p.is_match("breast-milk"));

        let literal = Pattern::builder("breast milk").loosen_spaces(false).build().unwrap();
        assert!(!literal.is_match("breast\nmilk"));
    }

    #[test]
    fn test_negations_are_loosened_too() {
        let p = Pattern::builder("strings?").negate("plan b").build().unwrap();
        assert!(!p.is_match("strings seen, plan  b discussed"));
    }

    #[test]
    fn test_group_stride() {
        let p = Pattern::builder(r"(?:\bg (\d{1,2}) p (\d)|gravida (\d{1,2}) para (\d))")
            .group_stride(2)
            .build()
            .unwrap();
        let m = p.matches("gravida 3 para 2").unwrap();
        assert_eq!(m.group(1), Some("3"));
        assert_eq!(m.group(2), Some("2"));
        assert_eq!(m.group(3), None);
        assert_eq!(m.groups(), vec![Some("3"), Some("2")]);
        assert_eq!(m.group(0), Some("gravida 3 para 2"));
    }

    #[test]
    fn test_groups_without_stride() {
        let p = Pattern::new(r"(a)|(b)").unwrap();
        let m = p.matches("b").unwrap();
        assert_eq!(m.groups(), vec![None, Some("b")]);
        assert_eq!(m.group(2), Some("b"));
    }

    #[test]
    fn test_bad_stride_fails_fast() {
        let err = Pattern::builder(r"(a)(b)|(c)").group_stride(2).build().unwrap_err();
        assert_eq!(err.code(), APX0102);

        let err = Pattern::builder(r"(a)").group_stride(0).build().unwrap_err();
        assert_eq!(err.code(), APX0102);
    }

    #[test]
    fn test_invalid_regex() {
        assert_eq!(Pattern::new("(unclosed").unwrap_err().code(), APX0100);
        let err = Pattern::builder("ok").negate("[").build().unwrap_err();
        assert_eq!(err.code(), APX0101);
    }
}
