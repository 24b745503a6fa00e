//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Re-sync audio or subtitles from one release of a video to another by
/// matching scene cuts.
#[derive(Parser, Debug)]
#[command(name = "scene-sync", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (created with defaults when missing)
    #[arg(long, global = true, default_value = "scene-sync.toml")]
    pub config: PathBuf,

    /// Log debug detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stretch the source's audio onto the target's timeline
    Audio {
        #[command(flatten)]
        common: CommonArgs,

        /// Only write the time map, do not run ffmpeg/rubberband
        #[arg(long)]
        no_stretch: bool,
    },

    /// Re-time a subtitle file from the source's timeline to the target's
    Subs {
        #[command(flatten)]
        common: CommonArgs,

        /// SRT or ASS file timed for the source video
        #[arg(long)]
        subtitle_path: PathBuf,
    },
}

/// Options shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Video whose audio/subtitles have the wrong timing
    #[arg(long)]
    pub source_path: PathBuf,

    /// Video with the right timing
    #[arg(long)]
    pub target_path: PathBuf,

    /// Trim black borders from source stills before hashing
    #[arg(long)]
    pub source_cut_borders: bool,

    /// Trim black borders from target stills before hashing
    #[arg(long)]
    pub target_cut_borders: bool,

    /// Scene change threshold in percent
    #[arg(long, value_name = "PCT")]
    pub frame_diff_percentage: Option<f64>,

    /// ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// ffprobe executable
    #[arg(long)]
    pub ffprobe: Option<String>,

    /// rubberband executable
    #[arg(long)]
    pub rubberband: Option<String>,

    /// ImageMagick executable
    #[arg(long)]
    pub imagemagick: Option<String>,

    /// Matching stills near the start, e.g. 3:5 (1-based still numbers)
    #[arg(long, value_name = "SRC:TGT", value_parser = parse_still_pair)]
    pub safe_start: Option<(usize, usize)>,

    /// Matching stills near the end, e.g. 412:431 (1-based still numbers)
    #[arg(long, value_name = "SRC:TGT", value_parser = parse_still_pair)]
    pub safe_end: Option<(usize, usize)>,

    /// Association indices to drop without prompting, e.g. 5,20
    #[arg(long, value_name = "LIST", conflicts_with = "no_curation")]
    pub remove: Option<String>,

    /// Keep every association without prompting
    #[arg(long)]
    pub no_curation: bool,

    /// Use one constant speed between the safe frames
    #[arg(long)]
    pub fixed_speed: bool,

    /// Delete extracted stills when done
    #[arg(long)]
    pub clean_frames: bool,
}

/// Parse `SRC:TGT` 1-based still numbers into 0-based scene indices.
pub fn parse_still_pair(value: &str) -> Result<(usize, usize), String> {
    let (source, target) = value
        .split_once(':')
        .ok_or_else(|| format!("expected SRC:TGT, got '{}'", value))?;

    let number = |text: &str| -> Result<usize, String> {
        match text.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("'{}' is not a still number (1 or more)", text)),
        }
    };

    Ok((number(source)?, number(target)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn still_pairs_are_one_based() {
        assert_eq!(parse_still_pair("1:1"), Ok((0, 0)));
        assert_eq!(parse_still_pair("12: 40"), Ok((11, 39)));
        assert!(parse_still_pair("0:3").is_err());
        assert!(parse_still_pair("12").is_err());
        assert!(parse_still_pair("a:b").is_err());
    }

    #[test]
    fn parses_audio_command() {
        let cli = Cli::try_parse_from([
            "scene-sync",
            "audio",
            "--source-path",
            "dvd.mkv",
            "--target-path",
            "bd.mkv",
            "--safe-start",
            "2:3",
            "--remove",
            "5,20",
            "--no-stretch",
        ])
        .unwrap();

        match cli.command {
            Command::Audio { common, no_stretch } => {
                assert!(no_stretch);
                assert_eq!(common.safe_start, Some((1, 2)));
                assert_eq!(common.safe_end, None);
                assert_eq!(common.remove.as_deref(), Some("5,20"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn subs_requires_subtitle_path() {
        assert!(Cli::try_parse_from([
            "scene-sync",
            "subs",
            "--source-path",
            "a.mkv",
            "--target-path",
            "b.mkv",
        ])
        .is_err());
    }
}
