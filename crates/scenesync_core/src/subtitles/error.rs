//! Subtitle error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing a subtitle file.
#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("cannot read subtitles '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write subtitles '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The file was read but its cues could not be understood.
    #[error("'{}' is not a usable subtitle file: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },
}

/// Problems found in subtitle content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A cue timestamp that does not parse.
    #[error("line {line}: bad timestamp '{value}'")]
    InvalidTime { line: usize, value: String },

    /// A `Dialogue:`/`Comment:` line with too few fields.
    #[error("line {line}: {message}")]
    InvalidEvent { line: usize, message: String },

    #[error("no {0} section")]
    MissingSection(&'static str),
}

impl SubtitleError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

impl ParseError {
    pub fn invalid_time(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            line,
            value: value.into(),
        }
    }

    pub fn invalid_event(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            line,
            message: message.into(),
        }
    }
}
