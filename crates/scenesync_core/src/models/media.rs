//! Probed media properties and user-confirmed safe frames.

use serde::{Deserialize, Serialize};

/// Stream properties needed for alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Video frame rate, rounded to three decimals.
    pub fps: f64,
    /// Video stream time base (ticks per second).
    pub time_base: u32,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Sample rate of the first audio stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_sample_rate: Option<u32>,
    /// Codec name of the first audio stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}

impl MediaInfo {
    /// Audio samples per video frame, if the file has audio.
    pub fn samples_per_frame(&self) -> Option<f64> {
        match self.audio_sample_rate {
            Some(rate) if self.fps > 0.0 => Some(f64::from(rate) / self.fps),
            _ => None,
        }
    }
}

/// The four scene positions the user visually confirmed as matching.
///
/// `source_start` matches `target_start`, and `source_end` matches
/// `target_end`. Everything outside these bounds is extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeFrames {
    pub source_start: usize,
    pub target_start: usize,
    pub source_end: usize,
    pub target_end: usize,
}

impl SafeFrames {
    /// Build from `(source, target)` start and end points.
    pub fn new(start: (usize, usize), end: (usize, usize)) -> Self {
        Self {
            source_start: start.0,
            target_start: start.1,
            source_end: end.0,
            target_end: end.1,
        }
    }

    /// Scene cuts inside the source safe range.
    pub fn source_span(&self) -> usize {
        self.source_end.saturating_sub(self.source_start) + 1
    }

    /// Scene cuts inside the target safe range.
    pub fn target_span(&self) -> usize {
        self.target_end.saturating_sub(self.target_start) + 1
    }

    /// Whether both ranges run forward.
    pub fn is_ordered(&self) -> bool {
        self.source_start < self.source_end && self.target_start < self.target_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_per_frame_needs_audio() {
        let mut info = MediaInfo {
            fps: 25.0,
            time_base: 1000,
            duration_secs: 60.0,
            audio_sample_rate: Some(48000),
            audio_codec: Some("aac".to_string()),
        };
        assert_eq!(info.samples_per_frame(), Some(1920.0));

        info.audio_sample_rate = None;
        assert_eq!(info.samples_per_frame(), None);
    }

    #[test]
    fn safe_frame_spans() {
        let safe = SafeFrames::new((2, 3), (10, 30));
        assert_eq!(safe.source_span(), 9);
        assert_eq!(safe.target_span(), 28);
        assert!(safe.is_ordered());
        assert!(!SafeFrames::new((5, 5), (5, 9)).is_ordered());
    }
}
