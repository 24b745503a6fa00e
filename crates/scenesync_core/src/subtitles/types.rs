//! Subtitle data types.
//!
//! Cue times are integer milliseconds. Only `start_ms` and `end_ms` are
//! rewritten by a sync; everything else passes through untouched.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Supported subtitle formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// Advanced SubStation Alpha (.ass/.ssa). Read only.
    Ass,
    /// SubRip (.srt).
    #[default]
    Srt,
}

impl SubtitleFormat {
    /// Detect the format from a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ass" | "ssa" => Some(SubtitleFormat::Ass),
            "srt" => Some(SubtitleFormat::Srt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Ass => "ass",
            SubtitleFormat::Srt => "srt",
        }
    }
}

/// A single cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEvent {
    pub start_ms: i64,
    pub end_ms: i64,
    /// Text, with ASS override tags kept as read.
    pub text: String,
    /// ASS `Comment:` lines are kept but never written to SRT.
    pub is_comment: bool,
}

impl SubtitleEvent {
    pub fn new(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
            is_comment: false,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// A parsed subtitle file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtitleData {
    pub events: Vec<SubtitleEvent>,
    /// Format the data was read from.
    pub format: SubtitleFormat,
    /// File the data was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl SubtitleData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: SubtitleFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Number of non-comment events.
    pub fn dialogue_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_comment).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            SubtitleFormat::from_extension(Path::new("a/Movie.ASS")),
            Some(SubtitleFormat::Ass)
        );
        assert_eq!(
            SubtitleFormat::from_extension(Path::new("movie.srt")),
            Some(SubtitleFormat::Srt)
        );
        assert_eq!(SubtitleFormat::from_extension(Path::new("movie.vtt")), None);
    }

    #[test]
    fn dialogue_count_skips_comments() {
        let mut data = SubtitleData::new();
        data.events.push(SubtitleEvent::new(0, 1000, "a"));
        let mut comment = SubtitleEvent::new(0, 1000, "b");
        comment.is_comment = true;
        data.events.push(comment);
        assert_eq!(data.dialogue_count(), 1);
        assert_eq!(data.events[0].duration_ms(), 1000);
    }
}
