//! Output sinks and the audit log
//!
//! A sink receives one [`ResultRow`] per document and detector. The audit log
//! records every candidate finding together with the evidence that produced
//! it.

use crate::config::{OutputConfig, OutputKind, sql_identifier};
use apex_core::{ApexError, ApexResult, Finding};
use apex_diagnostics::{APX0402, APX0403};
use rusqlite::{Connection, params};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const RESULT_HEADER: [&str; 6] = ["name", "algorithm", "value", "category", "date", "extras"];
pub const AUDIT_HEADER: [&str; 6] = ["name", "algorithm", "status", "result", "matches", "text"];

/// One output row: the chosen finding of one detector for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub name: String,
    pub algorithm: String,
    pub value: i32,
    pub category: String,
    pub date: String,
    pub extras: String,
}

impl ResultRow {
    pub fn from_finding(name: &str, algorithm: &str, finding: &Finding) -> Self {
        Self {
            name: name.to_string(),
            algorithm: algorithm.to_string(),
            value: finding.result,
            category: finding.status.name.to_string(),
            date: finding.date.clone().unwrap_or_default(),
            extras: finding.extras.join(";"),
        }
    }

    fn fields(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.algorithm.clone(),
            self.value.to_string(),
            self.category.clone(),
            self.date.clone(),
            self.extras.clone(),
        ]
    }
}

/// Destination for result rows
pub trait ResultSink {
    fn write_row(&mut self, row: &ResultRow) -> ApexResult<()>;

    /// Flush buffered rows; called once after the last row
    fn finish(&mut self) -> ApexResult<()>;
}

/// Discards every row
#[derive(Debug, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn write_row(&mut self, _row: &ResultRow) -> ApexResult<()> {
        Ok(())
    }

    fn finish(&mut self) -> ApexResult<()> {
        Ok(())
    }
}

/// Newlines inside a value would break the line-oriented outputs
pub fn clean(value: &str) -> String {
    value.replace('\n', " ~~")
}

fn sink_error(path: &Path, err: impl std::fmt::Display) -> ApexError {
    ApexError::system(APX0403, err.to_string()).with_context(format!("writing {}", path.display()))
}

fn create_file(path: &Path) -> ApexResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ApexError::io(format!("creating {}", parent.display()), &e))?;
    }
    File::create(path).map_err(|e| ApexError::io(format!("creating {}", path.display()), &e))
}

/// Comma-separated rows with a header
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub fn create(path: impl Into<PathBuf>) -> ApexResult<Self> {
        let path = path.into();
        let file = create_file(&path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(RESULT_HEADER)
            .map_err(|e| sink_error(&path, e))?;
        Ok(Self { path, writer })
    }
}

impl ResultSink for CsvSink {
    fn write_row(&mut self, row: &ResultRow) -> ApexResult<()> {
        let fields = row.fields().map(|f| clean(&f));
        self.writer
            .write_record(&fields)
            .map_err(|e| sink_error(&self.path, e))
    }

    fn finish(&mut self) -> ApexResult<()> {
        self.writer.flush().map_err(|e| sink_error(&self.path, e))
    }
}

/// Tab-separated lines with a header
pub struct TsvWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl TsvWriter {
    pub fn create<S: AsRef<str>>(path: impl Into<PathBuf>, header: &[S]) -> ApexResult<Self> {
        let path = path.into();
        let out = BufWriter::new(create_file(&path)?);
        let mut writer = Self { path, out };
        writer.write_line(header)?;
        Ok(writer)
    }

    pub fn write_line<S: AsRef<str>>(&mut self, fields: &[S]) -> ApexResult<()> {
        let line = fields
            .iter()
            .map(|f| clean(f.as_ref()).replace('\t', " "))
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(self.out, "{}", line).map_err(|e| sink_error(&self.path, e))
    }

    pub fn flush(&mut self) -> ApexResult<()> {
        self.out.flush().map_err(|e| sink_error(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub struct TsvSink {
    writer: TsvWriter,
}

impl TsvSink {
    pub fn create(path: impl Into<PathBuf>) -> ApexResult<Self> {
        Ok(Self {
            writer: TsvWriter::create(path, &RESULT_HEADER)?,
        })
    }
}

impl ResultSink for TsvSink {
    fn write_row(&mut self, row: &ResultRow) -> ApexResult<()> {
        self.writer.write_line(&row.fields())
    }

    fn finish(&mut self) -> ApexResult<()> {
        self.writer.flush()
    }
}

/// Rows inserted into a new SQLite table
pub struct SqliteSink {
    conn: Connection,
    insert: String,
}

impl SqliteSink {
    pub fn create(path: impl AsRef<Path>, table: &str) -> ApexResult<Self> {
        let path = path.as_ref();
        let table = sql_identifier(table)?;
        let db_error = |e: rusqlite::Error| {
            ApexError::system(APX0402, e.to_string())
                .with_context(format!("writing table {} in {}", table, path.display()))
        };
        let conn = Connection::open(path).map_err(db_error)?;
        conn.execute(
            &format!(
                "CREATE TABLE {} (name TEXT, algorithm TEXT, value INTEGER, \
                 category TEXT, date TEXT, extras TEXT)",
                table
            ),
            [],
        )
        .map_err(db_error)?;
        Ok(Self {
            conn,
            insert: format!(
                "INSERT INTO {} (name, algorithm, value, category, date, extras) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                table
            ),
        })
    }
}

impl ResultSink for SqliteSink {
    fn write_row(&mut self, row: &ResultRow) -> ApexResult<()> {
        self.conn
            .execute(
                &self.insert,
                params![row.name, row.algorithm, row.value, row.category, row.date, row.extras],
            )
            .map_err(|e| ApexError::system(APX0402, e.to_string()))?;
        Ok(())
    }

    fn finish(&mut self) -> ApexResult<()> {
        Ok(())
    }
}

/// Open the configured sink; no output section means rows are discarded
pub fn open_sink(output: Option<&OutputConfig>, timestamp: &str) -> ApexResult<Box<dyn ResultSink>> {
    let Some(output) = output else {
        return Ok(Box::new(NullSink));
    };
    let name = output.expanded_name(timestamp);
    let sink: Box<dyn ResultSink> = match output.kind()? {
        OutputKind::Csv => Box::new(CsvSink::create(output_path(output, &name))?),
        OutputKind::Tsv => Box::new(TsvSink::create(output_path(output, &name))?),
        OutputKind::Sqlite => {
            let db = output
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from("apex.db"));
            Box::new(SqliteSink::create(db, &name)?)
        }
    };
    Ok(sink)
}

fn output_path(output: &OutputConfig, name: &str) -> PathBuf {
    match &output.path {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Per-finding log of what every detector concluded and why
pub struct AuditLog {
    writer: Option<TsvWriter>,
}

impl AuditLog {
    /// An audit log that records nothing
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    /// Create `text_{timestamp}.out` in `directory`
    pub fn create(directory: &Path, timestamp: &str) -> ApexResult<Self> {
        let path = directory.join(format!("text_{}.out", timestamp));
        Ok(Self {
            writer: Some(TsvWriter::create(path, &AUDIT_HEADER)?),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.writer.as_ref().map(TsvWriter::path)
    }

    pub fn record(
        &mut self,
        name: &str,
        algorithm: &str,
        finding: &Finding,
        matches: &[String],
    ) -> ApexResult<()> {
        let Some(writer) = &mut self.writer else {
            return Ok(());
        };
        writer.write_line(&[
            name,
            algorithm,
            finding.status.name,
            finding.result.to_string().as_str(),
            matches.join("; ").as_str(),
            finding.text.as_deref().unwrap_or_default(),
        ])
    }

    /// Record a failure in place of a finding
    pub fn record_error(&mut self, name: &str, algorithm: &str, err: &ApexError) -> ApexResult<()> {
        let Some(writer) = &mut self.writer else {
            return Ok(());
        };
        writer.write_line(&[name, algorithm, "ERROR", "", "", err.to_string().as_str()])
    }

    pub fn finish(&mut self) -> ApexResult<()> {
        match &mut self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_core::{Confidence, StatusValue};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn finding() -> Finding {
        Finding::new(StatusValue { name: "MIRENA", code: 2 }, 2)
            .with_text("Mirena placed")
            .with_extra("lng")
            .with_extra("52mg")
            .with_confidence(Confidence::High)
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("a\nb"), "a ~~b");
    }

    #[test]
    fn test_row_from_finding() {
        let row = ResultRow::from_finding("n1", "iud_brand", &finding());
        assert_eq!(row.value, 2);
        assert_eq!(row.category, "MIRENA");
        assert_eq!(row.date, "");
        assert_eq!(row.extras, "lng;52mg");
    }

    #[test]
    fn test_csv_sink() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("results.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        sink.write_row(&ResultRow::from_finding("n1", "iud_brand", &finding()))
            .unwrap();
        sink.finish().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name,algorithm,value,category,date,extras\nn1,iud_brand,2,MIRENA,,lng;52mg\n"
        );
    }

    #[test]
    fn test_tsv_sink_escapes_newlines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.tsv");
        let mut sink = TsvSink::create(&path).unwrap();
        let mut row = ResultRow::from_finding("n1", "iud_brand", &finding());
        row.date = "2020-01-01\n2020-02-02".to_string();
        sink.write_row(&row).unwrap();
        sink.finish().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "n1\tiud_brand\t2\tMIRENA\t2020-01-01 ~~2020-02-02\tlng;52mg");
    }

    #[test]
    fn test_sqlite_sink() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("out.db");
        let mut sink = SqliteSink::create(&db, "results_20240101").unwrap();
        sink.write_row(&ResultRow::from_finding("o'brien", "iud_brand", &finding()))
            .unwrap();
        sink.finish().unwrap();
        drop(sink);

        let conn = Connection::open(&db).unwrap();
        let (name, value): (String, i32) = conn
            .query_row("SELECT name, value FROM results_20240101", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!((name.as_str(), value), ("o'brien", 2));
    }

    #[test]
    fn test_sqlite_sink_rejects_bad_table() {
        let dir = TempDir::new().unwrap();
        assert!(SqliteSink::create(dir.path().join("x.db"), "a b").is_err());
    }

    #[test]
    fn test_audit_log() {
        let dir = TempDir::new().unwrap();
        let mut log = AuditLog::create(dir.path(), "20240101_000000").unwrap();
        log.record("n1", "iud_brand", &finding(), &["mirena".to_string()])
            .unwrap();
        log.record_error("n2", "*", &ApexError::empty_document("n2"))
            .unwrap();
        log.finish().unwrap();

        let text = fs::read_to_string(dir.path().join("text_20240101_000000.out")).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "name\talgorithm\tstatus\tresult\tmatches\ttext");
        assert_eq!(lines[1], "n1\tiud_brand\tMIRENA\t2\tmirena\tMirena placed");
        assert!(lines[2].starts_with("n2\t*\tERROR\t\t\t"));
    }

    #[test]
    fn test_disabled_audit_log() {
        let mut log = AuditLog::disabled();
        assert!(log.path().is_none());
        log.record("n1", "iud_brand", &finding(), &[]).unwrap();
    }
}
