//! Skip list of notes with nothing to classify
//!
//! The list is a text file with one document name per line. Names are
//! written as soon as they are added so an interrupted run keeps its
//! progress.

use crate::config::SkipInfoConfig;
use apex_core::{ApexError, ApexResult};
use log::debug;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct Skipper {
    path: Option<PathBuf>,
    names: HashSet<String>,
    file: Option<File>,
}

impl Skipper {
    /// A skip list that neither reads nor records anything
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open the configured skip list
    ///
    /// Existing names are consulted unless `ignore` or `rebuild` is set;
    /// `rebuild` also truncates the file.
    pub fn open(config: Option<&SkipInfoConfig>) -> ApexResult<Self> {
        let Some(config) = config else {
            return Ok(Self::disabled());
        };
        let Some(path) = &config.path else {
            return Ok(Self::disabled());
        };
        let names = if config.ignore || config.rebuild {
            HashSet::new()
        } else {
            read_names(path)?
        };
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!config.rebuild)
            .truncate(config.rebuild)
            .open(path)
            .map_err(|e| ApexError::io(format!("opening skip list {}", path.display()), &e))?;
        debug!("Loaded {} names from skip list {}", names.len(), path.display());
        Ok(Self {
            path: Some(path.clone()),
            names,
            file: Some(file),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Record a name; names already on the list are not written again
    pub fn add(&mut self, name: &str) -> ApexResult<()> {
        if !self.names.insert(name.to_string()) {
            return Ok(());
        }
        if let Some(file) = &mut self.file {
            let context = || {
                let path = self.path.as_deref().unwrap_or(Path::new(""));
                format!("writing skip list {}", path.display())
            };
            writeln!(file, "{}", name)
                .and_then(|()| file.flush())
                .map_err(|e| ApexError::io(context(), &e))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn read_names(path: &Path) -> ApexResult<HashSet<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(ApexError::io(format!("reading skip list {}", path.display()), &e)),
    }
}
