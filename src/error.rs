use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while evaluating a sequence.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InputFormat(#[from] InputFormatError),

    /// The tracker failed while updating `frame`. Tracker state is cumulative,
    /// so the run cannot continue past this point.
    #[error("tracker update failed at frame {frame}: {source}")]
    Tracker {
        frame: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed or missing sequence metadata.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read sequence file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("section [{section}] not found in {origin}")]
    MissingSection { section: String, origin: String },

    #[error("couldn't find '{key}' in section [{section}] of {origin}")]
    MissingKey {
        key: String,
        section: String,
        origin: String,
    },

    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("line {line} of {origin} is not a section, key/value pair or comment")]
    Syntax { line: usize, origin: String },
}

/// A detection row that cannot be read as ten numeric fields.
#[derive(Error, Debug)]
pub enum InputFormatError {
    #[error("failed to open detection file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("detection row at line {line} has {found} fields, expected {expected}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("detection row at line {line} is not numeric: {reason}")]
    InvalidField { line: u64, reason: String },

    #[error("detection row at line {line} has non-integral frame {value}")]
    NonIntegralFrame { line: u64, value: f64 },

    #[error("failed to read detection rows: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures of the bundled ByteTrack implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("expected at least 5 detection columns (x1, y1, x2, y2, score), got {0}")]
    InvalidDetectionShape(usize),

    #[error("image size must be non-zero, got {height}x{width}")]
    InvalidImageSize { height: u32, width: u32 },

    #[error("innovation covariance of track {track_id} is singular")]
    SingularCovariance { track_id: u64 },

    #[error("linear assignment failed: {0}")]
    Assignment(String),
}

/// The results file could not be created or written.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write results to '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
