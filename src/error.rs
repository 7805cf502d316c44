use std::path::PathBuf;

use thiserror::Error;

/// Structural failures while reading one save document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("section '{role}' expected at position {index}, but the document only has {found} section(s)")]
    MissingSection {
        role: &'static str,
        index: usize,
        found: usize,
    },

    #[error("no '{key}' line found in the metadata section")]
    MissingDate { key: String },

    #[error("invalid game date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("line {line}: cannot read '{key}' value '{value}' as {expected}")]
    InvalidValue {
        line: usize,
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Failures in the table stages (sink, aggregation, sampling).
#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table '{path}' has no header row")]
    EmptyTable { path: String },

    #[error("table '{path}' row {row} has no workforce column")]
    MalformedRow { path: String, row: usize },

    #[error("please provide a valid CSV file, got '{}'", path.display())]
    InvalidExtension { path: PathBuf },

    #[error("cannot sample {requested} rows without replacement from {available} available")]
    SampleTooLarge { requested: usize, available: usize },
}

/// A document-level failure inside a batch, tagged with the offending file.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to write table for '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("section marker must not be empty")]
    EmptyMarker,

    #[error("metadata and pops sections must be different positions (both {0})")]
    SectionClash(usize),
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type TableResult<T> = Result<T, TableError>;
