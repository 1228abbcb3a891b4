//! Run configuration
//!
//! A run is described by one JSON file. Every section is optional and unknown
//! sections are rejected when the file is parsed.

use apex_algo::DetectorRegistry;
use apex_core::{ApexError, ApexResult, TextEncoding};
use apex_diagnostics::{APX0302, APX0303, APX0304};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Timestamp format substituted for `{datetime}`
pub const DATETIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Top-level configuration of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub corpus: CorpusConfig,
    /// Single truth file
    pub annotation: Option<AnnotationConfig>,
    /// Additional truth files
    pub annotations: Vec<PathBuf>,
    pub output: Option<OutputConfig>,
    pub select: SelectConfig,
    pub algorithm: AlgorithmConfig,
    pub loginfo: LogInfoConfig,
    pub skipinfo: Option<SkipInfoConfig>,
    pub logger: LoggerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    pub directory: Option<PathBuf>,
    pub directories: Vec<PathBuf>,
    /// Subdirectory read inside each corpus directory
    pub version: Option<String>,
    pub connections: Vec<ConnectionConfig>,
}

impl CorpusConfig {
    /// Corpus directories in reading order
    pub fn all_directories(&self) -> Vec<PathBuf> {
        self.directory
            .iter()
            .chain(self.directories.iter())
            .map(|dir| match &self.version {
                Some(version) => dir.join(version),
                None => dir.clone(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_none() && self.directories.is_empty() && self.connections.is_empty()
    }
}

/// A SQLite table holding one note per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Database file
    pub path: PathBuf,
    pub table: String,
    #[serde(default = "default_name_col")]
    pub name_col: String,
    #[serde(default = "default_text_col")]
    pub text_col: String,
}

fn default_name_col() -> String {
    "name".to_string()
}

fn default_text_col() -> String {
    "text".to_string()
}

/// Check that a configured table or column name is a plain SQL identifier
pub(crate) fn sql_identifier(value: &str) -> ApexResult<&str> {
    let mut chars = value.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(value)
    } else {
        Err(ApexError::invalid_config(format!(
            "`{}` is not a valid SQL identifier",
            value
        )))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationConfig {
    pub file: Option<PathBuf>,
}

/// Output sink kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Csv,
    Tsv,
    Sqlite,
}

impl FromStr for OutputKind {
    type Err = ApexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "sqlite" | "sql" => Ok(Self::Sqlite),
            other => Err(ApexError::config(
                APX0302,
                format!("unknown output kind `{}`", other),
            )),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Sqlite => "sqlite",
        };
        f.write_str(s)
    }
}

/// Where the chosen findings go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// File name, or table name for SQLite; `{datetime}` is expanded
    pub name: String,
    pub kind: String,
    /// Output directory, or the database file for SQLite
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl OutputConfig {
    pub fn kind(&self) -> ApexResult<OutputKind> {
        self.kind.parse()
    }

    /// The name with `{datetime}` replaced by the run timestamp
    pub fn expanded_name(&self, timestamp: &str) -> String {
        self.name.replace("{datetime}", timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectConfig {
    /// First entry to process, counting only entries that are not skipped
    pub start: usize,
    /// Entry to stop before
    pub end: Option<usize>,
    pub encoding: TextEncoding,
    /// Only process these document names
    pub filenames: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlgorithmConfig {
    /// Detector names; empty means every detector
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogInfoConfig {
    pub directory: PathBuf,
    pub ignore: bool,
}

impl Default for LogInfoConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            ignore: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkipInfoConfig {
    pub path: Option<PathBuf>,
    /// Truncate the skip list instead of appending to it
    pub rebuild: bool,
    /// Neither read nor consult the existing skip list
    pub ignore: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    pub verbose: bool,
}

impl RunConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> ApexResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ApexError::invalid_config(format!("invalid configuration: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> ApexResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ApexError::io(format!("reading {}", path.display()), &e))?;
        Self::from_json(&text).map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Truth files in reading order
    pub fn truth_files(&self) -> Vec<PathBuf> {
        self.annotation
            .iter()
            .filter_map(|a| a.file.clone())
            .chain(self.annotations.iter().cloned())
            .collect()
    }

    /// Check the configuration against the available detectors
    pub fn validate(&self, registry: &DetectorRegistry) -> ApexResult<()> {
        if self.corpus.is_empty() {
            return Err(ApexError::config(
                APX0304,
                "no corpus directory or connection configured",
            ));
        }
        if let Some(output) = &self.output {
            output.kind()?;
        }
        if let Some(end) = self.select.end {
            if self.select.start > end {
                return Err(ApexError::config(
                    APX0303,
                    format!("select.start ({}) is after select.end ({})", self.select.start, end),
                ));
            }
        }
        for connection in &self.corpus.connections {
            sql_identifier(&connection.table)?;
            sql_identifier(&connection.name_col)?;
            sql_identifier(&connection.text_col)?;
        }
        registry.select(&self.algorithm.names)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_diagnostics::{APX0300, APX0301};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn registry() -> DetectorRegistry {
        DetectorRegistry::with_defaults().unwrap()
    }

    #[test]
    fn test_full_config() {
        let config = RunConfig::from_json(
            r#"{
                "corpus": {"directories": ["notes"], "version": "text"},
                "annotation": {"file": "truth.txt"},
                "output": {"name": "out_{datetime}.csv", "kind": "csv", "path": "results"},
                "select": {"start": 10, "end": 20, "encoding": "latin1"},
                "algorithm": {"names": ["parity"]},
                "loginfo": {"ignore": true},
                "skipinfo": {"path": "skip.txt", "rebuild": true},
                "logger": {"verbose": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.corpus.all_directories(), vec![PathBuf::from("notes/text")]);
        assert_eq!(config.select.encoding, TextEncoding::Latin1);
        assert_eq!(config.truth_files(), vec![PathBuf::from("truth.txt")]);
        let output = config.output.as_ref().unwrap();
        assert_eq!(output.kind().unwrap(), OutputKind::Csv);
        assert_eq!(output.expanded_name("20240101_120000"), "out_20240101_120000.csv");
        assert!(config.logger.verbose);
        assert!(config.validate(&registry()).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_json(r#"{"corpus": {"directory": "notes"}}"#).unwrap();
        assert_eq!(config.select.start, 0);
        assert_eq!(config.select.end, None);
        assert_eq!(config.loginfo.directory, PathBuf::from("."));
        assert!(config.algorithm.names.is_empty());
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let err = RunConfig::from_json(r#"{"corpus": {}, "outputs": {}}"#).unwrap_err();
        assert_eq!(err.code(), APX0300);
    }

    #[rstest]
    #[case("notes", true)]
    #[case("_notes_2024", true)]
    #[case("notes; drop table x", false)]
    #[case("2024notes", false)]
    #[case("", false)]
    fn test_sql_identifier(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(sql_identifier(value).is_ok(), valid);
    }

    #[rstest]
    #[case(r#"{}"#, APX0304)]
    #[case(r#"{"corpus": {"directory": "d"}, "output": {"name": "x", "kind": "xlsx"}}"#, APX0302)]
    #[case(r#"{"corpus": {"directory": "d"}, "select": {"start": 5, "end": 2}}"#, APX0303)]
    #[case(r#"{"corpus": {"directory": "d"}, "algorithm": {"names": ["tonsils"]}}"#, APX0301)]
    fn test_validation(#[case] json: &str, #[case] code: apex_diagnostics::ErrorCode) {
        let config = RunConfig::from_json(json).unwrap();
        assert_eq!(config.validate(&registry()).unwrap_err().code(), code);
    }
}
