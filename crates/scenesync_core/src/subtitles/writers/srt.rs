//! SRT subtitle writer.

use crate::subtitles::types::{SubtitleData, SubtitleEvent};

/// Write subtitle data as SRT.
///
/// Comments are skipped, indices are regenerated from 1 and ASS override
/// tags are stripped.
pub fn write_srt(data: &SubtitleData) -> String {
    let mut output = String::new();

    let dialogue: Vec<&SubtitleEvent> = data.events.iter().filter(|e| !e.is_comment).collect();

    for (i, event) in dialogue.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(event.start_ms),
            format_srt_time(event.end_ms)
        ));
        output.push_str(&strip_ass_tags(&event.text));
        output.push('\n');
    }

    output
}

/// Format milliseconds as `HH:MM:SS,mmm`. Negative times clamp to zero.
pub fn format_srt_time(ms: i64) -> String {
    let ms = ms.max(0);

    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Strip ASS override blocks like `{\i1}` and convert `\N` line breaks.
pub(crate) fn strip_ass_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'\\') {
            in_tag = true;
            continue;
        }
        if c == '}' && in_tag {
            in_tag = false;
            continue;
        }
        if !in_tag {
            result.push(c);
        }
    }

    result.replace("\\N", "\n").replace("\\n", "\n").replace("\\h", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_times() {
        assert_eq!(format_srt_time(0), "00:00:00,000");
        assert_eq!(format_srt_time(1500), "00:00:01,500");
        assert_eq!(format_srt_time(3_723_004), "01:02:03,004");
        assert_eq!(format_srt_time(-40), "00:00:00,000");
    }

    #[test]
    fn strips_tags() {
        assert_eq!(strip_ass_tags(r"{\i1}italic{\i0}"), "italic");
        assert_eq!(strip_ass_tags(r"{\pos(100,200)}positioned"), "positioned");
        assert_eq!(strip_ass_tags(r"Line 1\NLine 2"), "Line 1\nLine 2");
        assert_eq!(strip_ass_tags("{plain braces}"), "{plain braces}");
    }

    #[test]
    fn writes_dialogue_only() {
        let mut data = SubtitleData::new();
        data.events.push(SubtitleEvent::new(1000, 4000, "Hello, world!"));
        let mut comment = SubtitleEvent::new(2000, 3000, "Comment");
        comment.is_comment = true;
        data.events.push(comment);
        data.events.push(SubtitleEvent::new(5000, 8000, "Test subtitle."));

        assert_eq!(
            write_srt(&data),
            "1\n00:00:01,000 --> 00:00:04,000\nHello, world!\n\n\
             2\n00:00:05,000 --> 00:00:08,000\nTest subtitle.\n"
        );
    }
}
