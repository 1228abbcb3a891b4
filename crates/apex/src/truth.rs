//! Gold labels
//!
//! A truth file has one `name result [comments...]` line per document.
//! Later files override earlier ones.

use apex_core::{ApexError, ApexResult};
use apex_diagnostics::APX0300;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TruthTable {
    labels: HashMap<String, i32>,
}

impl TruthTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every truth file in order
    pub fn load<P: AsRef<Path>>(files: &[P]) -> ApexResult<Self> {
        let mut table = Self::new();
        for file in files {
            let file = file.as_ref();
            let text = fs::read_to_string(file)
                .map_err(|e| ApexError::io(format!("reading truth file {}", file.display()), &e))?;
            table
                .extend_from_str(&text)
                .map_err(|e| e.with_context(file.display().to_string()))?;
        }
        Ok(table)
    }

    /// Add the labels in `text`; blank lines are ignored
    pub fn extend_from_str(&mut self, text: &str) -> ApexResult<()> {
        for (lineno, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(name) = fields.next() else {
                continue;
            };
            let result = fields
                .next()
                .and_then(|r| r.parse::<i32>().ok())
                .ok_or_else(|| {
                    ApexError::config(
                        APX0300,
                        format!("line {}: expected `name result`, got {:?}", lineno + 1, line),
                    )
                })?;
            self.labels.insert(name.to_string(), result);
        }
        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, result: i32) {
        self.labels.insert(name.into(), result);
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
