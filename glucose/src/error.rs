//! Error types for the glucose readings store.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for all glucose operations.
///
/// Queries never fail; every variant here originates from loading a
/// readings source or its configuration.
#[derive(Error, Debug)]
pub enum GlucoseError {
    /// The readings source could not be opened or read.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// The readings source was readable but its content is malformed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The source configuration is invalid or could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur when opening a readings source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The readings file does not exist.
    #[error("readings file '{}' not found", path.display())]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The readings file exists but could not be opened or read.
    #[error("failed to read readings file '{}': {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while parsing readings.
///
/// Line numbers are 1-based and count the header row as line 1.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The source contains no header row at all.
    #[error("source is empty: expected a header row")]
    MissingHeader,

    /// The header row does not fit the configured column layout.
    #[error("malformed header: {reason}")]
    MalformedHeader {
        /// Description of what was wrong with the header.
        reason: String,
    },

    /// A data row has fewer fields than the layout requires.
    #[error("line {line}: missing '{column}' column")]
    MissingColumn {
        /// The offending line.
        line: u64,
        /// Name of the missing column.
        column: &'static str,
    },

    /// A date field did not match the configured date format.
    #[error("line {line}: invalid date '{value}' (expected format '{format}')")]
    InvalidDate {
        /// The offending line.
        line: u64,
        /// The raw field text.
        value: String,
        /// The configured date format.
        format: String,
    },

    /// A level field is not a number.
    #[error("line {line}: invalid glucose level '{value}'")]
    InvalidLevel {
        /// The offending line.
        line: u64,
        /// The raw field text.
        value: String,
    },

    /// A level parsed as a number but is negative, infinite or NaN.
    #[error("line {line}: glucose level {level} is out of range")]
    LevelOutOfRange {
        /// The offending line.
        line: u64,
        /// The parsed level.
        level: f64,
    },

    /// The underlying CSV reader rejected the input.
    #[error("line {}: {source}", line.map_or_else(|| "?".to_string(), |l| l.to_string()))]
    Csv {
        /// The line where the reader failed, when known.
        line: Option<u64>,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

/// Errors that can occur when validating or loading a source configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The date format cannot format and re-parse a calendar date.
    #[error("invalid date format '{format}': {reason}")]
    InvalidDateFormat {
        /// The rejected format string.
        format: String,
        /// Why the format was rejected.
        reason: String,
    },

    /// The delimiter is not usable for delimited text.
    #[error("invalid delimiter {delimiter:?}: must be a single ASCII character other than quote or newline")]
    InvalidDelimiter {
        /// The rejected delimiter.
        delimiter: char,
    },

    /// A configuration file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON for a source configuration.
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Type alias for `Result<T, GlucoseError>`.
pub type Result<T> = std::result::Result<T, GlucoseError>;
