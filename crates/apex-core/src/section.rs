//! Sections: ordered groups of sentences evaluated as one span

use crate::cask::MatchCask;
use crate::sentence::Sentence;
use crate::span::TextSpan;
use indexmap::IndexMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// An ordered, possibly non-contiguous selection of sentences
///
/// Patterns are evaluated over the newline-joined text of all sentences, so a
/// negation expression anywhere in the section defeats a trigger anywhere in
/// it.
#[derive(Debug, Clone)]
pub struct Section {
    sentences: Vec<Sentence>,
    text: String,
    cask: MatchCask,
}

impl Section {
    /// Build a section that records into `cask`
    pub fn new(sentences: Vec<Sentence>, cask: MatchCask) -> Self {
        let text = join(&sentences);
        Self {
            sentences,
            text,
            cask,
        }
    }

    /// Build a section whose evidence starts as a copy of `cask` and does not
    /// alias it afterwards
    pub fn snapshot(sentences: Vec<Sentence>, cask: &MatchCask) -> Self {
        Self::new(sentences, cask.snapshot())
    }

    /// A section without sentences
    pub fn empty(cask: MatchCask) -> Self {
        Self::new(Vec::new(), cask)
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// False-like: no sentences, or nothing but whitespace
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty() || self.text.trim().is_empty()
    }
}

fn join(sentences: &[Sentence]) -> String {
    sentences
        .iter()
        .map(|s| s.text())
        .collect::<Vec<_>>()
        .join("\n")
}

impl TextSpan for Section {
    fn text(&self) -> &str {
        &self.text
    }

    fn cask(&self) -> &MatchCask {
        &self.cask
    }
}

impl AddAssign for Section {
    fn add_assign(&mut self, rhs: Section) {
        self.cask.merge(&rhs.cask);
        self.sentences.extend(rhs.sentences);
        self.text = join(&self.sentences);
    }
}

impl Add for Section {
    type Output = Section;

    fn add(mut self, rhs: Section) -> Section {
        self += rhs;
        self
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Named sections produced by [`crate::Document::split`], in header order
#[derive(Debug, Clone)]
pub struct Sections {
    sections: IndexMap<String, Section>,
    cask: MatchCask,
}

impl Sections {
    pub(crate) fn new(cask: MatchCask) -> Self {
        Self {
            sections: IndexMap::new(),
            cask,
        }
    }

    /// Add content under `name`, merging with an existing bucket of that name
    pub(crate) fn push(&mut self, name: String, section: Section) {
        match self.sections.get_mut(&name) {
            Some(existing) => *existing += section,
            None => {
                self.sections.insert(name, section);
            }
        }
    }

    /// A single bucket by (upper-case) name
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(&name.to_uppercase())
    }

    /// Union of the named buckets, in the order given; empty if none exist
    pub fn get_sections(&self, names: &[&str]) -> Section {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .cloned()
            .fold(Section::empty(self.cask.share()), |acc, s| acc + s)
    }

    /// Bucket names in header order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn section(lines: &[&str], cask: &MatchCask) -> Section {
        Section::new(
            lines.iter().map(|l| Sentence::new(*l, cask.share())).collect(),
            cask.share(),
        )
    }

    #[test]
    fn test_text_is_newline_joined() {
        let cask = MatchCask::new();
        let s = section(&["iud placed", "strings trimmed"], &cask);
        assert_eq!(s.text(), "iud placed\nstrings trimmed");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_truthiness() {
        let cask = MatchCask::new();
        assert!(Section::empty(cask.share()).is_empty());
        assert!(section(&["   "], &cask).is_empty());
        assert!(!section(&["iud"], &cask).is_empty());
    }

    #[test]
    fn test_add_unions_sentences_and_evidence() {
        let left_cask = MatchCask::new();
        let right_cask = MatchCask::new();
        let left = section(&["mirena"], &left_cask);
        let right = section(&["paragard"], &right_cask);
        let p = Pattern::new("paragard").unwrap();
        assert!(right.has_pattern(&p));

        let both = left + right;
        assert_eq!(both.text(), "mirena\nparagard");
        assert_eq!(both.cask().len(), 1);
        assert!(both.cask().is_shared_with(&left_cask));
    }

    #[test]
    fn test_snapshot_section_does_not_alias() {
        let cask = MatchCask::new();
        let sentences = vec![Sentence::new("iud removed", cask.share())];
        let s = Section::snapshot(sentences, &cask);
        assert!(s.has_pattern(&Pattern::new("removed").unwrap()));
        assert_eq!(s.cask().len(), 1);
        assert!(cask.is_empty());
    }
}
