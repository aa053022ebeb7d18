//! FILENAME: app/cli/src/source.rs
//! PURPOSE: Fact Source collaborators - where exported rows come from.
//! CONTEXT: The warehouse query itself lives outside this tool; the source
//! reads an extract of the fact view that the warehouse job leaves behind.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use model::FactTable;
use persistence::{read_table, PersistenceError};
use thiserror::Error;

use crate::config::{ConfigError, SourceConfig};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no fact source configured (set source.path or pass --source)")]
    NotConfigured,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read fact source {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PersistenceError,
    },
}

/// Yields the full current contents of the fact view.
pub trait FactSource {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<FactTable, SourceError>;
}

/// Reads a delimited extract of the fact view.
#[derive(Debug, Clone)]
pub struct CsvFactSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvFactSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        CsvFactSource {
            path: path.into(),
            delimiter,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        let path = config.path.clone().ok_or(SourceError::NotConfigured)?;
        Ok(Self::new(path, config.delimiter_byte()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<FactTable, PersistenceError> {
        let file = File::open(&self.path)?;
        read_table(BufReader::new(file), self.delimiter)
    }
}

impl FactSource for CsvFactSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn fetch(&self) -> Result<FactTable, SourceError> {
        self.read().map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory source, used by tests and by callers that already hold rows.
#[derive(Debug, Clone, Default)]
pub struct StaticFactSource {
    table: FactTable,
}

impl StaticFactSource {
    pub fn new(table: FactTable) -> Self {
        StaticFactSource { table }
    }
}

impl FactSource for StaticFactSource {
    fn describe(&self) -> String {
        format!("static:{} rows", self.table.len())
    }

    fn fetch(&self) -> Result<FactTable, SourceError> {
        Ok(self.table.clone())
    }
}
