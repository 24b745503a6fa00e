//! Subtitle retiming through a timing curve.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::types::SubtitleData;
use crate::models::TimingCurve;

/// Counts from one remap pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapStats {
    /// Events seen, comments included.
    pub events: usize,
    /// Start times moved by the curve.
    pub starts_remapped: usize,
    /// End times moved by the curve.
    pub ends_remapped: usize,
    /// Timestamps outside the curve, left as they were.
    pub out_of_range: usize,
}

fn remap_ms(curve: &TimingCurve, ms: i64) -> Option<i64> {
    curve
        .interpolate(ms as f64)
        .map(|target| target.round() as i64)
}

/// Rewrite every cue's start and end through a millisecond curve.
///
/// Times outside the curve's coverage are left unchanged.
pub fn remap_subtitles(data: &mut SubtitleData, curve: &TimingCurve) -> RemapStats {
    let mut stats = RemapStats {
        events: data.events.len(),
        ..RemapStats::default()
    };

    for event in &mut data.events {
        match remap_ms(curve, event.start_ms) {
            Some(start) => {
                event.start_ms = start;
                stats.starts_remapped += 1;
            }
            None => stats.out_of_range += 1,
        }
        match remap_ms(curve, event.end_ms) {
            Some(end) => {
                event.end_ms = end;
                stats.ends_remapped += 1;
            }
            None => stats.out_of_range += 1,
        }
    }

    if stats.out_of_range > 0 {
        tracing::warn!(
            "[Subtitles] {} timestamps fall outside the curve and were kept as is",
            stats.out_of_range
        );
    }

    stats
}

/// Output path for synced subtitles: the input path with `.srt` appended.
pub fn synced_output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".srt");
    PathBuf::from(name)
}
