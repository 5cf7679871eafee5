use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the caller. Per-record problems never end up here.
#[derive(Debug, Error)]
pub enum GazetteError {
    #[error("unsupported input {path:?}: expected a .txt gazette")]
    UnsupportedInput { path: PathBuf },

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} is not valid UTF-8 text")]
    Decode { path: PathBuf },

    #[error("minimum percentage {min} is greater than maximum {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),
}

/// Why a single student entry was dropped from the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("no marks row at position {ordinal}")]
    MissingMarksRow { ordinal: usize },

    #[error("mark token {token:?} is not an integer")]
    BadMark { token: String },

    #[error("header: {reason}")]
    BadHeader { reason: &'static str },
}
