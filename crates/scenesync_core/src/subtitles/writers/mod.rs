//! Subtitle writers.
//!
//! Synced subtitles are always written as SRT.

mod srt;

pub use srt::{format_srt_time, write_srt};
