//! ASS/SSA subtitle parser.
//!
//! Only the `[Events]` section is read: timing and text of every
//! `Dialogue:` and `Comment:` line. Styles and script info are not carried,
//! since output is always SRT.
//!
//! All timing is in the format `H:MM:SS.cc` (centiseconds).

use super::srt::fraction_to_millis;
use crate::subtitles::error::ParseError;
use crate::subtitles::types::{SubtitleData, SubtitleEvent, SubtitleFormat};

/// Field layout used when the file has no `Format:` line.
const DEFAULT_EVENT_FORMAT: [&str; 10] = [
    "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
];

/// Parse ASS/SSA content.
pub fn parse_ass(content: &str) -> Result<SubtitleData, ParseError> {
    let mut data = SubtitleData::with_format(SubtitleFormat::Ass);
    let mut in_events = false;
    let mut saw_events = false;
    let mut format: Vec<String> = DEFAULT_EVENT_FORMAT.iter().map(|s| s.to_string()).collect();

    for (idx, line) in content.lines().enumerate() {
        let line_num = idx + 1;
        let line = line.trim().trim_start_matches('\u{feff}');

        if line.starts_with('[') && line.ends_with(']') {
            in_events = line.eq_ignore_ascii_case("[events]");
            saw_events |= in_events;
            continue;
        }
        if !in_events || line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Format:") {
            format = rest
                .split(',')
                .map(|f| f.trim().to_ascii_lowercase())
                .collect();
        } else if let Some(rest) = line.strip_prefix("Dialogue:") {
            data.events.push(parse_event(rest, &format, false, line_num)?);
        } else if let Some(rest) = line.strip_prefix("Comment:") {
            data.events.push(parse_event(rest, &format, true, line_num)?);
        }
    }

    if !saw_events {
        return Err(ParseError::MissingSection("[Events]"));
    }

    Ok(data)
}

fn parse_event(
    fields: &str,
    format: &[String],
    is_comment: bool,
    line_num: usize,
) -> Result<SubtitleEvent, ParseError> {
    let text_index = format
        .iter()
        .position(|f| f == "text")
        .unwrap_or(format.len().saturating_sub(1));

    // the text field may itself contain commas
    let parts: Vec<&str> = fields.trim_start().splitn(text_index + 1, ',').collect();
    if parts.len() <= text_index {
        return Err(ParseError::invalid_event(
            line_num,
            format!("expected {} fields, found {}", text_index + 1, parts.len()),
        ));
    }

    let field = |name: &str| {
        format
            .iter()
            .position(|f| f == name)
            .and_then(|i| parts.get(i))
            .map(|v| v.trim())
    };

    let start = field("start").unwrap_or("");
    let end = field("end").unwrap_or("");
    let start_ms = parse_ass_time(start).ok_or_else(|| ParseError::invalid_time(line_num, start))?;
    let end_ms = parse_ass_time(end).ok_or_else(|| ParseError::invalid_time(line_num, end))?;

    let mut event = SubtitleEvent::new(start_ms, end_ms, parts[text_index]);
    event.is_comment = is_comment;
    Ok(event)
}

/// Parse an ASS timestamp (`H:MM:SS.cc`) to milliseconds.
pub fn parse_ass_time(s: &str) -> Option<i64> {
    let mut parts = s.trim().split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (seconds, fraction) = seconds_part.split_once('.').unwrap_or((seconds_part, ""));
    let seconds: i64 = seconds.parse().ok()?;

    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + fraction_to_millis(fraction)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "[Script Info]\nTitle: Test\n\n\
        [V4+ Styles]\nFormat: Name, Fontname\nStyle: Default,Arial\n\n\
        [Events]\n\
        Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
        Dialogue: 0,0:00:01.00,0:00:04.50,Default,,0,0,0,,Hello, world!\n\
        Comment: 0,0:00:05.00,0:00:06.00,Default,,0,0,0,,note to self\n\
        Dialogue: 0,1:02:03.04,1:02:05.00,Default,,0,0,0,,{\\i1}Later{\\i0}\n";

    #[test]
    fn parses_times() {
        assert_eq!(parse_ass_time("0:00:01.00"), Some(1000));
        assert_eq!(parse_ass_time("0:00:01.5"), Some(1500));
        assert_eq!(parse_ass_time("1:02:03.04"), Some(3_723_040));
        assert_eq!(parse_ass_time("bad"), None);
    }

    #[test]
    fn parses_events_section() {
        let data = parse_ass(SAMPLE).unwrap();
        assert_eq!(data.format, SubtitleFormat::Ass);
        assert_eq!(data.events.len(), 3);

        assert_eq!(data.events[0].start_ms, 1000);
        assert_eq!(data.events[0].end_ms, 4500);
        assert_eq!(data.events[0].text, "Hello, world!");
        assert!(data.events[1].is_comment);
        assert_eq!(data.events[2].text, "{\\i1}Later{\\i0}");
    }

    #[test]
    fn custom_format_order() {
        let content = "[Events]\nFormat: Start, End, Text\nDialogue: 0:00:02.00,0:00:03.00,Hi\n";
        let data = parse_ass(content).unwrap();
        assert_eq!(data.events[0], SubtitleEvent::new(2000, 3000, "Hi"));
    }

    #[test]
    fn missing_events_section() {
        assert!(matches!(
            parse_ass("[Script Info]\nTitle: x\n"),
            Err(ParseError::MissingSection(_))
        ));
    }

    #[test]
    fn short_event_line_is_rejected() {
        let content = "[Events]\nDialogue: 0,0:00:01.00\n";
        assert!(matches!(
            parse_ass(content),
            Err(ParseError::InvalidEvent { line: 2, .. })
        ));
    }
}
