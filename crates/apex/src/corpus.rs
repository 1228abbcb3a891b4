//! Corpus ingestion
//!
//! Notes are read from directories (one file per note) and from SQLite
//! tables (one row per note). Entries are collected up front so the run
//! window can be applied to a stable list.

use crate::config::{ConnectionConfig, RunConfig, sql_identifier};
use crate::skip::Skipper;
use apex_core::{ApexError, ApexResult, DocumentSource, TextEncoding};
use apex_diagnostics::APX0402;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::Path;

/// One note to be classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub name: String,
    pub source: DocumentSource,
}

impl CorpusEntry {
    pub fn new(name: impl Into<String>, source: DocumentSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Document name for a corpus file: the file name up to its first `.`
pub fn document_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// The ordered notes of one run
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Collect every configured source, then apply the name filter, the skip
    /// list and the `start`/`end` window in that order
    pub fn from_config(config: &RunConfig, skipper: &Skipper) -> ApexResult<Self> {
        let mut entries = Vec::new();
        for dir in config.corpus.all_directories() {
            entries.extend(read_directory(&dir, config.select.encoding)?);
        }
        for connection in &config.corpus.connections {
            entries.extend(read_connection(connection)?);
        }
        let total = entries.len();

        let filenames = &config.select.filenames;
        let end = config.select.end.unwrap_or(usize::MAX);
        let entries: Vec<_> = entries
            .into_iter()
            .filter(|e| filenames.is_empty() || filenames.contains(&e.name))
            .filter(|e| !skipper.contains(&e.name))
            .enumerate()
            .filter(|(i, _)| *i >= config.select.start && *i < end)
            .map(|(_, e)| e)
            .collect();
        debug!("Selected {} of {} corpus entries", entries.len(), total);
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Corpus {
    type Item = CorpusEntry;
    type IntoIter = std::vec::IntoIter<CorpusEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Files of one corpus directory, sorted by file name
pub fn read_directory(dir: &Path, encoding: TextEncoding) -> ApexResult<Vec<CorpusEntry>> {
    let context = || format!("reading corpus directory {}", dir.display());
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ApexError::io(context(), &e))? {
        let entry = entry.map_err(|e| ApexError::io(context(), &e))?;
        let is_file = entry
            .file_type()
            .map_err(|e| ApexError::io(context(), &e))?
            .is_file();
        if is_file {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} files in {}", files.len(), dir.display());

    Ok(files
        .into_iter()
        .map(|path| {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            CorpusEntry::new(
                document_name(&file_name),
                DocumentSource::File { path, encoding },
            )
        })
        .collect())
}

/// Rows of one SQLite table
pub fn read_connection(connection: &ConnectionConfig) -> ApexResult<Vec<CorpusEntry>> {
    let db_error = |e: rusqlite::Error| {
        ApexError::system(APX0402, e.to_string())
            .with_context(format!("reading {}", connection.path.display()))
    };
    let sql = format!(
        "SELECT {}, {} FROM {}",
        sql_identifier(&connection.name_col)?,
        sql_identifier(&connection.text_col)?,
        sql_identifier(&connection.table)?
    );
    let conn = Connection::open_with_flags(&connection.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(db_error)?;
    let mut stmt = conn.prepare(&sql).map_err(db_error)?;
    let rows = stmt
        .query_map([], |row| {
            let name: Value = row.get(0)?;
            let text: Option<String> = row.get(1)?;
            Ok((name, text))
        })
        .map_err(db_error)?;

    let mut entries = Vec::new();
    for row in rows {
        let (name, text) = row.map_err(db_error)?;
        entries.push(CorpusEntry::new(
            value_to_name(name),
            DocumentSource::Text(text.unwrap_or_default()),
        ));
    }
    debug!("Read {} rows from {}", entries.len(), connection.table);
    Ok(entries)
}

fn value_to_name(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("1234.txt", "1234")]
    #[case("1234.note.txt", "1234")]
    #[case("plain", "plain")]
    fn test_document_name(#[case] file_name: &str, #[case] expected: &str) {
        assert_eq!(document_name(file_name), expected);
    }

    #[test]
    fn test_value_to_name() {
        assert_eq!(value_to_name(Value::Integer(42)), "42");
        assert_eq!(value_to_name(Value::Text("n-1".to_string())), "n-1");
    }
}
