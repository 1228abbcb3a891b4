//! Sentences: the smallest addressable unit of a document

use crate::cask::MatchCask;
use crate::span::TextSpan;
use std::fmt;
use std::sync::Arc;

/// One non-blank line of a document's cleaned text
#[derive(Debug, Clone)]
pub struct Sentence {
    text: Arc<str>,
    cask: MatchCask,
}

impl Sentence {
    pub fn new(text: impl Into<Arc<str>>, cask: MatchCask) -> Self {
        Self {
            text: text.into(),
            cask,
        }
    }

    /// Split text into sentences by line, dropping blank lines
    pub fn split_lines(text: &str, cask: &MatchCask) -> Vec<Sentence> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Sentence::new(line, cask.share()))
            .collect()
    }
}

impl TextSpan for Sentence {
    fn text(&self) -> &str {
        &self.text
    }

    fn cask(&self) -> &MatchCask {
        &self.cask
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
