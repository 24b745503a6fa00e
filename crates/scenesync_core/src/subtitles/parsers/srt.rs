//! SRT subtitle parser.
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! Hello, world!
//!
//! 2
//! 00:00:05,000 --> 00:00:08,000
//! This is a test.
//! ```
//!
//! The index line is optional and ignored; it is regenerated on write.

use crate::subtitles::error::ParseError;
use crate::subtitles::types::{SubtitleData, SubtitleEvent, SubtitleFormat};

/// Parse SRT content.
pub fn parse_srt(content: &str) -> Result<SubtitleData, ParseError> {
    let mut data = SubtitleData::with_format(SubtitleFormat::Srt);

    let content = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut line_offset = 0;
    for block in content.split("\n\n") {
        let lines: Vec<&str> = block.lines().collect();
        let block_len = lines.len() + 1;

        let Some(timing_idx) = lines.iter().position(|l| l.contains("-->")) else {
            line_offset += block_len;
            continue;
        };

        let timing_line = lines[timing_idx];
        let (start_ms, end_ms) = parse_srt_timing(timing_line)
            .ok_or_else(|| ParseError::invalid_time(line_offset + timing_idx + 1, timing_line))?;

        let text = lines[timing_idx + 1..].join("\n");
        let text = text.trim_end();
        if !text.is_empty() {
            data.events.push(SubtitleEvent::new(start_ms, end_ms, text));
        }

        line_offset += block_len;
    }

    Ok(data)
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm`. Trailing position hints are ignored.
fn parse_srt_timing(line: &str) -> Option<(i64, i64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_srt_time(start)?, parse_srt_time(end)?))
}

/// Parse an SRT timestamp (`HH:MM:SS,mmm`, `.` also accepted) to milliseconds.
pub fn parse_srt_time(s: &str) -> Option<i64> {
    let s = s.trim().replace(',', ".");

    let mut parts = s.split(':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (seconds, fraction) = match seconds_part.split_once('.') {
        Some((s, f)) => (s, f),
        None => (seconds_part, ""),
    };
    let seconds: i64 = seconds.parse().ok()?;
    let millis = fraction_to_millis(fraction)?;

    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + millis)
}

/// Digits after the decimal point, as rounded milliseconds.
pub(crate) fn fraction_to_millis(fraction: &str) -> Option<i64> {
    if fraction.is_empty() {
        return Some(0);
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: f64 = format!("0.{}", fraction).parse().ok()?;
    Some((value * 1000.0).round() as i64)
}
