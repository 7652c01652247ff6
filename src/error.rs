//! Error type for the aggregation core.
//!
//! Aggregation is all-or-nothing: every failure is either a [`QualityError::Parse`]
//! (input text does not match the expected format) or a [`QualityError::Io`]
//! (a file could not be read or written).

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QualityError {
    #[error("parse error{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse { line: Option<u64>, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl QualityError {
    pub fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        QualityError::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        QualityError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classifies a `csv` error: I/O-backed failures stay I/O, anything else
    /// (bad UTF-8, ragged rows, field deserialization) is a parse failure.
    pub fn from_csv(path: &Path, err: csv::Error) -> Self {
        if err.is_io_error() {
            return match err.into_kind() {
                csv::ErrorKind::Io(source) => QualityError::io(path, source),
                other => QualityError::parse(None, format!("{other:?}")),
            };
        }
        let line = err.position().map(|p| p.line());
        QualityError::parse(line, err.to_string())
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, QualityError::Parse { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, QualityError::Io { .. })
    }
}

pub type Result<T, E = QualityError> = std::result::Result<T, E>;
