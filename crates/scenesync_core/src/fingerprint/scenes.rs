//! Scene-cut extraction with ffmpeg.
//!
//! ffmpeg's `select` filter keeps frames whose scene score exceeds the
//! threshold, writes each one as `img%05d.jpg` and prints its timing to
//! `time.txt` through the `metadata` filter. Both land in the frames folder.

use std::path::{Path, PathBuf};

use crate::process::ExternalCommand;

/// Metadata file written next to the stills.
pub const SCENE_METADATA_FILE: &str = "time.txt";

/// One line of scene metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCut {
    /// Position among the selected frames (0-based).
    pub frame: usize,
    /// Presentation timestamp in time-base ticks.
    pub pts: i64,
    /// Presentation timestamp in seconds, as printed by ffmpeg.
    pub pts_time: f64,
}

/// Build the scene extraction command. It must run inside `frames_dir`.
pub fn scene_command(ffmpeg: &str, video: &Path, threshold_pct: f64) -> ExternalCommand {
    let filter = format!(
        "select='gt(scene,{})',metadata=print:file={}",
        threshold_pct / 100.0,
        SCENE_METADATA_FILE
    );

    ExternalCommand::new(ffmpeg)
        .args(["-y", "-loglevel", "error", "-i"])
        .path_arg(video)
        .args(["-filter_complex".to_string(), filter])
        .args(["-vsync", "vfr", "img%05d.jpg"])
}

/// Still image of the scene cut at `frame` (files are numbered from 1).
pub fn scene_image_path(frames_dir: &Path, frame: usize) -> PathBuf {
    frames_dir.join(format!("img{:05}.jpg", frame + 1))
}

/// Parse `frame:N pts:P pts_time:T` lines. Other lines are ignored.
pub fn parse_scene_metadata(text: &str) -> Vec<SceneCut> {
    text.lines().filter_map(parse_scene_line).collect()
}

fn parse_scene_line(line: &str) -> Option<SceneCut> {
    let mut frame = None;
    let mut pts = None;
    let mut pts_time = None;

    for token in line.split_whitespace() {
        if let Some(v) = token.strip_prefix("frame:") {
            frame = v.parse().ok();
        } else if let Some(v) = token.strip_prefix("pts_time:") {
            pts_time = v.parse().ok();
        } else if let Some(v) = token.strip_prefix("pts:") {
            pts = v.parse().ok();
        }
    }

    Some(SceneCut {
        frame: frame?,
        pts: pts?,
        pts_time: pts_time?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_metadata_print_output() {
        let text = "frame:0    pts:4004    pts_time:4.004\n\
                    lavfi.scene_score=0.512000\n\
                    frame:1    pts:61686   pts_time:61.686\n\
                    lavfi.scene_score=0.330000\n";
        let cuts = parse_scene_metadata(text);

        assert_eq!(cuts.len(), 2);
        assert_eq!(
            cuts[1],
            SceneCut {
                frame: 1,
                pts: 61686,
                pts_time: 61.686
            }
        );
    }

    #[test]
    fn incomplete_lines_are_skipped() {
        assert!(parse_scene_metadata("frame:3 pts:x pts_time:1.0\nframe:4").is_empty());
    }

    #[test]
    fn image_names_start_at_one() {
        let path = scene_image_path(Path::new("/frames"), 0);
        assert_eq!(path, PathBuf::from("/frames/img00001.jpg"));
    }

    #[test]
    fn command_uses_threshold_fraction() {
        let cmd = scene_command("ffmpeg", Path::new("/v/movie.mkv"), 30.0);
        let args = cmd.get_args();
        assert!(args.contains(&"select='gt(scene,0.3)',metadata=print:file=time.txt".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("img%05d.jpg"));
    }
}
