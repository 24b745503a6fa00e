//! Subtitle reading, retiming and writing.
//!
//! # Components
//!
//! - **types**: `SubtitleData` and `SubtitleEvent` with integer-ms cues
//! - **parsers**: SRT and ASS (`[Events]` only)
//! - **writers**: SRT
//! - **remap**: cue retiming through a millisecond `TimingCurve`
//!
//! # Usage
//!
//! ```ignore
//! use scenesync_core::subtitles::{parse_file, remap_subtitles, synced_output_path, write_file};
//!
//! let mut data = parse_file("movie.ass")?;
//! remap_subtitles(&mut data, &curve);
//! write_file(&data, synced_output_path(Path::new("movie.ass")))?;
//! ```

mod error;
pub mod parsers;
mod remap;
mod types;
pub mod writers;

use std::fs;
use std::path::Path;

pub use error::{ParseError, SubtitleError};
pub use parsers::{parse_ass, parse_ass_time, parse_content, parse_srt, parse_srt_time};
pub use remap::{remap_subtitles, synced_output_path, RemapStats};
pub use types::{SubtitleData, SubtitleEvent, SubtitleFormat};
pub use writers::{format_srt_time, write_srt};

/// Parse a subtitle file, detecting the format from the extension first
/// and the content second.
pub fn parse_file(path: impl AsRef<Path>) -> Result<SubtitleData, SubtitleError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|e| SubtitleError::read(path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    let mut data = parse_content(&content, SubtitleFormat::from_extension(path))
        .map_err(|e| SubtitleError::parse(path, e))?;
    data.source_path = Some(path.to_path_buf());

    tracing::debug!(
        "[Subtitles] read {} events ({:?}) from {}",
        data.events.len(),
        data.format,
        path.display()
    );
    Ok(data)
}

/// Write subtitle data to a file as SRT.
pub fn write_file(data: &SubtitleData, path: impl AsRef<Path>) -> Result<(), SubtitleError> {
    let path = path.as_ref();
    fs::write(path, write_srt(data)).map_err(|e| SubtitleError::write(path, e))?;
    Ok(())
}
