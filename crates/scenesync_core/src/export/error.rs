//! Export error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::CurveViolation;

/// Errors raised while writing artifacts or running the stretch plan.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A time map was requested from a non-sample curve.
    #[error("time map needs an audio-sample curve, got a {0} curve")]
    WrongUnit(&'static str),

    /// The curve failed validation.
    #[error("curve rejected for export: {0}")]
    InvalidCurve(#[from] CurveViolation),

    /// Rounding to whole samples made two anchors collide.
    #[error("anchor {line} and the one after it both round to source sample {value}")]
    RoundingCollision { line: usize, value: i64 },

    /// The source has no audio stream to stretch.
    #[error("source has no audio stream")]
    NoAudio,

    /// Writing a file failed.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
