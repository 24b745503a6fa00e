//! Subtitle parsers.
//!
//! Each parser is a pure function that takes content and returns `SubtitleData`.

mod ass;
mod srt;

pub use ass::{parse_ass, parse_ass_time};
pub use srt::{parse_srt, parse_srt_time};

use crate::subtitles::error::ParseError;
use crate::subtitles::types::{SubtitleData, SubtitleFormat};

/// Parse subtitle content, detecting the format when not given.
pub fn parse_content(
    content: &str,
    format: Option<SubtitleFormat>,
) -> Result<SubtitleData, ParseError> {
    match format.unwrap_or_else(|| detect_format(content)) {
        SubtitleFormat::Ass => parse_ass(content),
        SubtitleFormat::Srt => parse_srt(content),
    }
}

/// Detect subtitle format from content.
fn detect_format(content: &str) -> SubtitleFormat {
    let lower = content.to_lowercase();
    if lower.contains("[script info]") || lower.contains("[events]") {
        SubtitleFormat::Ass
    } else {
        SubtitleFormat::Srt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_ass() {
        assert_eq!(detect_format("[Script Info]\nTitle: Test\n"), SubtitleFormat::Ass);
    }

    #[test]
    fn defaults_to_srt() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nHello\n";
        assert_eq!(detect_format(content), SubtitleFormat::Srt);
        assert_eq!(parse_content(content, None).unwrap().events.len(), 1);
    }
}
