//! Documents: a clinical note split into sentences

use crate::cask::MatchCask;
use crate::pattern::Pattern;
use crate::section::{Section, Sections};
use crate::select::SentenceSelection;
use crate::sentence::Sentence;
use crate::span::TextSpan;
use apex_diagnostics::{APX0004, ApexError, ApexResult};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

static HISTORY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s*HISTORY:").expect("history block regex is valid"));

static NEXT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]+(?: [A-Z]+)?:").expect("header regex is valid"));

static QUESTION_ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\?[ \t]*\r?\n[ \t]*(yes|no)\b").expect("question/answer regex is valid")
});

/// Text encodings accepted for document files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    /// Strict UTF-8; invalid bytes are an input error
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced
    Utf8Lossy,
    /// ISO-8859-1: every byte is one code point
    Latin1,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Utf8Lossy => "utf8-lossy",
            Self::Latin1 => "latin1",
        }
    }

    /// Decode raw bytes, or `None` if they are not valid in this encoding
    pub fn decode(&self, bytes: Vec<u8>) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes).ok(),
            Self::Utf8Lossy => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = ApexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "utf8-lossy" | "utf-8-lossy" => Ok(Self::Utf8Lossy),
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Ok(Self::Latin1),
            other => Err(ApexError::input(
                APX0004,
                format!("unsupported text encoding `{}`", other),
            )),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = ApexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a document's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Text(String),
    File { path: PathBuf, encoding: TextEncoding },
}

/// A clinical note
///
/// The cleaned text has two fixed normalizations applied: a leading
/// `HISTORY:` block is cut up to the next all-caps header, and the
/// `Label?` / `Yes` two-line idiom is folded onto one line. Sentences are the
/// non-blank lines of the cleaned text, in order.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    original: String,
    text: String,
    sentences: Vec<Sentence>,
    cask: MatchCask,
    derived: bool,
}

impl Document {
    /// Build a document from literal text
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> ApexResult<Self> {
        let name = name.into();
        let original = text.into();
        if original.trim().is_empty() {
            return Err(ApexError::empty_document(name));
        }
        let text = clean(&original);
        if text.is_empty() {
            return Err(ApexError::empty_document(name));
        }
        let cask = MatchCask::new();
        let sentences = Sentence::split_lines(&text, &cask);
        Ok(Self {
            name,
            original,
            text,
            sentences,
            cask,
            derived: false,
        })
    }

    /// Read and build a document from a file
    pub fn from_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        encoding: TextEncoding,
    ) -> ApexResult<Self> {
        let name = name.into();
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ApexError::unreadable(&name, e))?;
        let text = encoding
            .decode(bytes)
            .ok_or_else(|| ApexError::undecodable(&name, encoding.as_str()))?;
        debug!("Loaded {} ({} bytes) from {}", name, text.len(), path.display());
        Self::from_text(name, text)
    }

    /// Build a document from either source
    pub fn from_source(name: impl Into<String>, source: DocumentSource) -> ApexResult<Self> {
        match source {
            DocumentSource::Text(text) => Self::from_text(name, text),
            DocumentSource::File { path, encoding } => Self::from_file(name, path, encoding),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text as supplied, before cleaning
    pub fn original_text(&self) -> &str {
        &self.original
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Whether this document was produced by [`Document::remove_patterns`]
    pub fn is_derived(&self) -> bool {
        self.derived
    }

    /// Evaluate a list of patterns in order; the first match wins
    pub fn get_patterns(&self, patterns: &[&Pattern], index: usize) -> Option<String> {
        patterns.iter().find_map(|p| self.get_pattern(p, index))
    }

    /// Like [`Document::get_patterns`], also returning the label of the
    /// pattern that produced the value
    pub fn get_patterns_named<N: Copy>(
        &self,
        patterns: &[(&Pattern, N)],
        index: usize,
    ) -> Option<(String, N)> {
        patterns
            .iter()
            .find_map(|(p, label)| self.get_pattern(p, index).map(|v| (v, *label)))
    }

    /// Several captured groups of one pattern
    pub fn get_pattern_groups(
        &self,
        pattern: &Pattern,
        indices: &[usize],
    ) -> Option<Vec<Option<String>>> {
        let m = self.find_pattern(pattern, false)?;
        Some(
            indices
                .iter()
                .map(|&i| m.group(i).map(str::to_string))
                .collect(),
        )
    }

    /// Select sentences that satisfy `patterns`
    ///
    /// See [`SentenceSelection`] for the available refinements.
    pub fn select_sentences<'a>(&'a self, patterns: &'a [&'a Pattern]) -> SentenceSelection<'a> {
        SentenceSelection::new(self, patterns)
    }

    /// Build a section from sentence indices (ascending, deduplicated by the caller)
    pub fn section_from_indices(&self, indices: impl IntoIterator<Item = usize>) -> Section {
        let sentences = indices
            .into_iter()
            .filter_map(|i| self.sentences.get(i).cloned())
            .collect();
        Section::new(sentences, self.cask.share())
    }

    /// Split the original text into named sections at header matches
    ///
    /// Buckets are keyed by the upper-cased, trimmed text of capture `group`
    /// and hold everything up to the next header. Text before the first
    /// header is discarded. The original text is scanned so that a leading
    /// `HISTORY:` block still gets its own bucket.
    pub fn split(&self, headers: &Regex, group: usize) -> Sections {
        let raw = self.original.as_str();
        let mut sections = Sections::new(self.cask.share());
        let found: Vec<_> = headers
            .captures_iter(raw)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(group).unwrap_or(whole).as_str().trim().to_uppercase();
                Some((name, whole.start(), whole.end()))
            })
            .collect();

        for (i, (name, _, content_start)) in found.iter().enumerate() {
            let content_end = found.get(i + 1).map_or(raw.len(), |next| next.1);
            let content = &raw[*content_start..content_end];
            let section = Section::new(Sentence::split_lines(content, &self.cask), self.cask.share());
            sections.push(name.clone(), section);
        }
        sections
    }

    /// A new document with every trigger match of `patterns` erased
    pub fn remove_patterns(&self, patterns: &[&Pattern]) -> ApexResult<Document> {
        let text = patterns.iter().fold(self.original.clone(), |text, p| {
            p.trigger().replace_all(&text, "").into_owned()
        });
        let mut doc = Document::from_text(self.name.clone(), text)?;
        doc.derived = true;
        Ok(doc)
    }
}

impl TextSpan for Document {
    fn text(&self) -> &str {
        &self.text
    }

    fn cask(&self) -> &MatchCask {
        &self.cask
    }
}

/// Apply the fixed preprocessing steps and trim
fn clean(text: &str) -> String {
    let text = strip_history(text);
    let text = QUESTION_ANSWER.replace_all(&text, ": $1");
    text.trim().to_string()
}

/// Cut a leading `HISTORY:` block up to the next all-caps header
fn strip_history(text: &str) -> String {
    let Some(history) = HISTORY_BLOCK.find(text) else {
        return text.to_string();
    };
    match NEXT_HEADER.find_at(text, history.end()) {
        Some(next) => text[next.start()..].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_breastfeeding_question_is_folded() {
        let doc = Document::from_text("bf", "Breastfeeding?\nYes").unwrap();
        assert_eq!(doc.text(), "Breastfeeding: Yes");
        assert_eq!(doc.sentences().len(), 1);
    }

    #[test]
    fn test_history_block_is_cut() {
        let text = "HISTORY: prior IUD perforation in 2010\nwith laparoscopy\nFINDINGS: IUD in place";
        let doc = Document::from_text("rad", text).unwrap();
        assert_eq!(doc.text(), "FINDINGS: IUD in place");
        assert_eq!(doc.original_text(), text);
    }

    #[test]
    fn test_history_two_word_header() {
        let text = "HISTORY: missing strings. CLINICAL INFORMATION: pelvic pain";
        let doc = Document::from_text("rad", text).unwrap();
        assert_eq!(doc.text(), "CLINICAL INFORMATION: pelvic pain");
    }

    #[test]
    fn test_history_without_following_header_is_kept() {
        let doc = Document::from_text("rad", "HISTORY: iud check").unwrap();
        assert_eq!(doc.text(), "HISTORY: iud check");
    }

    #[test]
    fn test_clean_input_is_unchanged() {
        let text = "  Patient seen today.\nIUD strings visible.\n";
        let doc = Document::from_text("clean", text).unwrap();
        assert_eq!(doc.text(), text.trim());
    }

    #[test]
    fn test_blank_lines_are_not_sentences() {
        let doc = Document::from_text("d", "one\n\n   \ntwo\n").unwrap();
        let texts: Vec<_> = doc.sentences().iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_empty_text_is_an_input_error() {
        let err = Document::from_text("blank", " \n\t").unwrap_err();
        assert!(matches!(err, ApexError::Input { .. }));
        assert_eq!(err.document(), Some("blank"));
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("iso_8859_1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert!("ebcdic".parse::<TextEncoding>().is_err());
        assert_eq!(TextEncoding::Latin1.decode(vec![0x63, 0xe9]).unwrap(), "cé");
        assert!(TextEncoding::Utf8.decode(vec![0xff]).is_none());
    }

    #[test]
    fn test_remove_patterns_makes_derived_document() {
        let doc = Document::from_text("d", "call your doctor if you have breast pain\nbreast pain today").unwrap();
        let boilerplate = Pattern::new("call your doctor if you have breast pain").unwrap();
        let stripped = doc.remove_patterns(&[&boilerplate]).unwrap();
        assert!(stripped.is_derived());
        assert_eq!(stripped.text(), "breast pain today");
        assert_eq!(stripped.name(), "d");
    }

    #[test]
    fn test_remove_everything_is_an_error() {
        let doc = Document::from_text("d", "boilerplate").unwrap();
        let p = Pattern::new("boilerplate").unwrap();
        assert!(doc.remove_patterns(&[&p]).is_err());
    }
}
