//! Media probing using ffprobe.
//!
//! Reads frame rate, time base and duration from the first video stream
//! and sample rate and codec from the first audio stream.

use std::path::Path;

use serde_json::Value;

use super::FingerprintError;
use crate::models::MediaInfo;
use crate::process::ExternalCommand;

/// Build the ffprobe command for a file.
pub fn probe_command(ffprobe: &str, path: &Path) -> ExternalCommand {
    ExternalCommand::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .path_arg(path)
}

/// Probe a media file.
pub fn probe_media(ffprobe: &str, path: &Path) -> Result<MediaInfo, FingerprintError> {
    if !path.exists() {
        return Err(FingerprintError::NotFound(path.to_path_buf()));
    }

    tracing::debug!("Probing file: {}", path.display());

    let output = probe_command(ffprobe, path).run()?;
    let json: Value = serde_json::from_str(&output.stdout)?;

    parse_probe_json(&json)
}

/// Parse `r_frame_rate` style fractions, rounded to three decimals.
pub fn parse_frame_rate(value: &str) -> Option<f64> {
    let fps = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.trim().parse().ok()?,
    };

    if fps > 0.0 {
        Some((fps * 1000.0).round() / 1000.0)
    } else {
        None
    }
}

/// Parse a `1/1000` style time base into ticks per second.
pub fn parse_time_base(value: &str) -> Option<u32> {
    let (_, den) = value.split_once('/')?;
    den.trim().parse().ok().filter(|&d: &u32| d > 0)
}

fn stream_of_type<'a>(json: &'a Value, codec_type: &str) -> Option<&'a Value> {
    json.get("streams")?
        .as_array()?
        .iter()
        .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some(codec_type))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}

/// Parse the JSON output from ffprobe.
pub fn parse_probe_json(json: &Value) -> Result<MediaInfo, FingerprintError> {
    let video = stream_of_type(json, "video").ok_or(FingerprintError::NoVideoStream)?;

    let fps = str_field(video, "r_frame_rate")
        .and_then(parse_frame_rate)
        .ok_or_else(|| FingerprintError::Probe("video stream has no usable r_frame_rate".into()))?;

    let time_base = str_field(video, "time_base")
        .and_then(parse_time_base)
        .ok_or_else(|| FingerprintError::Probe("video stream has no usable time_base".into()))?;

    // Container duration first, stream duration as a fallback
    let duration_secs = json
        .get("format")
        .and_then(|f| str_field(f, "duration"))
        .or_else(|| str_field(video, "duration"))
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| FingerprintError::Probe("no duration reported".into()))?;

    let audio = stream_of_type(json, "audio");
    let audio_sample_rate = audio
        .and_then(|a| str_field(a, "sample_rate"))
        .and_then(|r| r.parse().ok());
    let audio_codec = audio
        .and_then(|a| str_field(a, "codec_name"))
        .map(|c| c.to_string());

    Ok(MediaInfo {
        fps,
        time_base,
        duration_secs,
        audio_sample_rate,
        audio_codec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264",
             "r_frame_rate": "24000/1001", "time_base": "1/1000"},
            {"index": 1, "codec_type": "audio", "codec_name": "ac3",
             "sample_rate": "48000", "time_base": "1/48000"}
        ],
        "format": {"duration": "1425.402000"}
    }"#;

    #[test]
    fn frame_rate_is_rounded() {
        assert_eq!(parse_frame_rate("24000/1001"), Some(23.976));
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn time_base_denominator() {
        assert_eq!(parse_time_base("1/1000"), Some(1000));
        assert_eq!(parse_time_base("1/90000"), Some(90000));
        assert_eq!(parse_time_base("1/0"), None);
        assert_eq!(parse_time_base("1000"), None);
    }

    #[test]
    fn parses_video_and_audio() {
        let json: Value = serde_json::from_str(SAMPLE).unwrap();
        let info = parse_probe_json(&json).unwrap();

        assert_eq!(info.fps, 23.976);
        assert_eq!(info.time_base, 1000);
        assert!((info.duration_secs - 1425.402).abs() < 1e-9);
        assert_eq!(info.audio_sample_rate, Some(48000));
        assert_eq!(info.audio_codec.as_deref(), Some("ac3"));
    }

    #[test]
    fn video_stream_is_required() {
        let json: Value =
            serde_json::from_str(r#"{"streams": [{"codec_type": "audio"}], "format": {}}"#).unwrap();
        assert!(matches!(
            parse_probe_json(&json),
            Err(FingerprintError::NoVideoStream)
        ));
    }

    #[test]
    fn missing_file_is_reported_before_running() {
        let result = probe_media("ffprobe", Path::new("/definitely/not/here.mkv"));
        assert!(matches!(result, Err(FingerprintError::NotFound(_))));
    }
}
