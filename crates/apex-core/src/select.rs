//! Sentence selection with neighbour windows

use crate::document::Document;
use crate::pattern::Pattern;
use crate::section::Section;
use crate::span::{PatternQuery, TextSpan};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// A query over a document's sentences
///
/// A sentence qualifies when it satisfies the primary patterns under the
/// query and none of the auxiliary negation patterns match it. Each
/// qualifying sentence `i` yields the window `i-k..=i+k` clipped to the
/// document.
#[derive(Debug, Clone, Copy)]
pub struct SentenceSelection<'a> {
    doc: &'a Document,
    patterns: &'a [&'a Pattern],
    negation: &'a [&'a Pattern],
    query: PatternQuery,
    neighbors: usize,
}

impl<'a> SentenceSelection<'a> {
    pub(crate) fn new(doc: &'a Document, patterns: &'a [&'a Pattern]) -> Self {
        Self {
            doc,
            patterns,
            negation: &[],
            query: PatternQuery::ANY,
            neighbors: 0,
        }
    }

    /// Auxiliary patterns that disqualify a sentence when any matches
    pub fn negation(mut self, negation: &'a [&'a Pattern]) -> Self {
        self.negation = negation;
        self
    }

    pub fn has_all(mut self, has_all: bool) -> Self {
        self.query.has_all = has_all;
        self
    }

    pub fn ignore_negation(mut self, ignore: bool) -> Self {
        self.query.ignore_negation = ignore;
        self
    }

    /// Include `k` sentences on each side of every qualifying sentence
    pub fn neighboring_sentences(mut self, k: usize) -> Self {
        self.neighbors = k;
        self
    }

    fn qualifies(&self, index: usize) -> bool {
        let sentence = &self.doc.sentences()[index];
        sentence.has_patterns(self.patterns, self.query)
            && !sentence.has_patterns(self.negation, PatternQuery::ANY)
    }

    fn window(&self, index: usize) -> RangeInclusive<usize> {
        let last = self.doc.sentences().len().saturating_sub(1);
        index.saturating_sub(self.neighbors)..=index.saturating_add(self.neighbors).min(last)
    }

    /// Indices of qualifying sentences, ascending
    pub fn indices(&self) -> Vec<usize> {
        (0..self.doc.sentences().len())
            .filter(|&i| self.qualifies(i))
            .collect()
    }

    /// One section per qualifying sentence, lazily
    pub fn sections(self) -> SelectedSections<'a> {
        SelectedSections {
            selection: self,
            next: 0,
        }
    }

    /// Union of all windows as one section, in document order
    pub fn merged(&self) -> Section {
        let indices: BTreeSet<usize> = self
            .indices()
            .into_iter()
            .flat_map(|i| self.window(i))
            .collect();
        self.doc.section_from_indices(indices)
    }

    /// Contiguous span from the first to the last selected sentence, windows included
    pub fn range(&self) -> Section {
        let indices = self.indices();
        match (indices.first(), indices.last()) {
            (Some(&first), Some(&last)) => {
                let start = *self.window(first).start();
                let end = *self.window(last).end();
                self.doc.section_from_indices(start..=end)
            }
            _ => self.doc.section_from_indices(std::iter::empty::<usize>()),
        }
    }
}

/// Lazy iterator over the windows of a [`SentenceSelection`]
#[derive(Debug, Clone)]
pub struct SelectedSections<'a> {
    selection: SentenceSelection<'a>,
    next: usize,
}

impl Iterator for SelectedSections<'_> {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        let total = self.selection.doc.sentences().len();
        while self.next < total {
            let i = self.next;
            self.next += 1;
            if self.selection.qualifies(i) {
                return Some(self.selection.doc.section_from_indices(self.selection.window(i)));
            }
        }
        None
    }
}
