//! The pattern-evaluation contract shared by sentences, sections and documents

use crate::cask::MatchCask;
use crate::pattern::{Pattern, PatternMatch};

/// How a list of patterns is combined by [`TextSpan::has_patterns`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternQuery {
    /// Require every pattern (AND) instead of any pattern (OR)
    pub has_all: bool,
    /// Report raw lexical presence, bypassing negation
    pub ignore_negation: bool,
}

impl PatternQuery {
    /// OR semantics, negation honored
    pub const ANY: Self = Self {
        has_all: false,
        ignore_negation: false,
    };

    /// AND semantics, negation honored
    pub const ALL: Self = Self {
        has_all: true,
        ignore_negation: false,
    };

    /// The same query with negation bypassed
    pub const fn ignoring_negation(mut self) -> Self {
        self.ignore_negation = true;
        self
    }
}

/// A unit of text that patterns can be evaluated against
///
/// Evaluation never changes the text; successful matches are recorded into
/// the span's [`MatchCask`].
pub trait TextSpan {
    /// The text patterns are evaluated over
    fn text(&self) -> &str;

    /// Where matches are recorded
    fn cask(&self) -> &MatchCask;

    /// Match a single pattern, recording the evidence on success
    fn find_pattern(&self, pattern: &Pattern, ignore_negation: bool) -> Option<PatternMatch> {
        let m = pattern.matches_with(self.text(), ignore_negation)?;
        self.cask().record(pattern, &m);
        Some(m)
    }

    fn has_pattern(&self, pattern: &Pattern) -> bool {
        self.find_pattern(pattern, false).is_some()
    }

    fn has_pattern_with(&self, pattern: &Pattern, ignore_negation: bool) -> bool {
        self.find_pattern(pattern, ignore_negation).is_some()
    }

    /// Combine several patterns
    ///
    /// OR short-circuits on the first hit, AND on the first miss. An empty
    /// pattern list yields `query.has_all`.
    fn has_patterns(&self, patterns: &[&Pattern], query: PatternQuery) -> bool {
        for pattern in patterns {
            let hit = self.has_pattern_with(pattern, query.ignore_negation);
            if query.has_all && !hit {
                return false;
            }
            if !query.has_all && hit {
                return true;
            }
        }
        query.has_all
    }

    /// True if any pattern matches
    fn has_any(&self, patterns: &[&Pattern]) -> bool {
        self.has_patterns(patterns, PatternQuery::ANY)
    }

    /// True if every pattern matches
    fn has_all(&self, patterns: &[&Pattern]) -> bool {
        self.has_patterns(patterns, PatternQuery::ALL)
    }

    /// Number of matching patterns; every pattern is evaluated
    fn count_patterns(&self, patterns: &[&Pattern], ignore_negation: bool) -> usize {
        patterns
            .iter()
            .filter(|p| self.has_pattern_with(p, ignore_negation))
            .count()
    }

    /// Captured value of group `index` (0 = whole match)
    fn get_pattern(&self, pattern: &Pattern, index: usize) -> Option<String> {
        self.find_pattern(pattern, false)
            .and_then(|m| m.group(index).map(str::to_string))
    }
}
