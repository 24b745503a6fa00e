//! Scene-cut fingerprints.
//!
//! One `Fingerprint` is produced per detected scene cut. The set of all
//! fingerprints for a video is held in a `FingerprintSet`, where a
//! fingerprint's position always equals its `scene_index`.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scene lookups that `FingerprintSet::check_integrity` rejects.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneLookupError {
    #[error("position {position} is outside the {available} detected scene cuts")]
    OutOfRange { position: usize, available: usize },

    #[error("position {position} reports scene index {reported}")]
    IndexMismatch { position: usize, reported: usize },
}

/// Fixed-width perceptual hash stored as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerceptualHash(Vec<u8>);

impl PerceptualHash {
    /// Wrap raw hash bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Width of the hash in bits.
    pub fn bit_len(&self) -> usize {
        self.0.len() * 8
    }

    /// Hamming distance to another hash.
    ///
    /// Returns `None` when the widths differ, which callers treat the same
    /// as an absent hash.
    pub fn distance(&self, other: &PerceptualHash) -> Option<u32> {
        if self.0.len() != other.0.len() {
            return None;
        }
        Some(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }

    /// Lowercase hex rendering for logs.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Fingerprint of a single scene-cut frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Position of this cut in the video's fingerprint set.
    pub scene_index: usize,
    /// Frame number in the whole video.
    pub global_frame_index: u64,
    /// Presentation timestamp in stream time-base ticks.
    pub pts_ticks: i64,
    /// Presentation timestamp in seconds.
    pub pts_seconds: f64,
    /// Presentation timestamp in milliseconds.
    pub pts_millis: f64,
    /// Frame number within its second (diagnostics only).
    pub second_index: u32,
    /// Perceptual hash of the still, absent if the image could not be read.
    pub hash: Option<PerceptualHash>,
    /// Still image the hash was computed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

impl Fingerprint {
    /// Build a fingerprint from a raw pts and the stream's timing.
    ///
    /// `time_base` is the number of ticks per second.
    pub fn from_pts(scene_index: usize, pts_ticks: i64, fps: f64, time_base: u32) -> Self {
        let ticks_per_second = f64::from(time_base.max(1));
        let pts_seconds = pts_ticks as f64 / ticks_per_second;
        let global_frame_index = (pts_seconds * fps).round().max(0.0) as u64;
        let second_index = if fps > 0.0 {
            (global_frame_index as f64 % fps).round() as u32
        } else {
            0
        };

        Self {
            scene_index,
            global_frame_index,
            pts_ticks,
            pts_seconds,
            pts_millis: pts_seconds * 1000.0,
            second_index,
            hash: None,
            image_path: None,
        }
    }

    /// Attach a hash.
    pub fn with_hash(mut self, hash: PerceptualHash) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Attach the still image path.
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Hamming distance to another fingerprint.
    ///
    /// `None` when either side has no hash or the widths differ.
    pub fn distance_to(&self, other: &Fingerprint) -> Option<u32> {
        match (&self.hash, &other.hash) {
            (Some(a), Some(b)) => a.distance(b),
            _ => None,
        }
    }
}

/// All fingerprints of one video, ordered by time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FingerprintSet {
    /// Video the fingerprints were extracted from.
    pub video: PathBuf,
    /// Video frame rate.
    pub fps: f64,
    /// Stream time base (ticks per second).
    pub time_base: u32,
    /// Fingerprints in ascending time order.
    pub fingerprints: Vec<Fingerprint>,
}

impl FingerprintSet {
    /// Create a set from already-ordered fingerprints.
    pub fn new(
        video: impl Into<PathBuf>,
        fps: f64,
        time_base: u32,
        fingerprints: Vec<Fingerprint>,
    ) -> Self {
        Self {
            video: video.into(),
            fps,
            time_base,
            fingerprints,
        }
    }

    /// Number of scene cuts.
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Whether no scene cut was detected.
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Fingerprint at a scene position.
    pub fn get(&self, position: usize) -> Option<&Fingerprint> {
        self.fingerprints.get(position)
    }

    /// Fingerprint at `position`, checking that its recorded scene index
    /// equals the position.
    pub fn check_integrity(&self, position: usize) -> Result<&Fingerprint, SceneLookupError> {
        let fingerprint = self.get(position).ok_or(SceneLookupError::OutOfRange {
            position,
            available: self.len(),
        })?;
        if fingerprint.scene_index != position {
            return Err(SceneLookupError::IndexMismatch {
                position,
                reported: fingerprint.scene_index,
            });
        }
        Ok(fingerprint)
    }

    /// Fingerprints between two positions, both inclusive.
    pub fn range(&self, range: RangeInclusive<usize>) -> Option<&[Fingerprint]> {
        self.fingerprints.get(range)
    }

    /// Number of fingerprints that carry a hash.
    pub fn hashed_count(&self) -> usize {
        self.fingerprints.iter().filter(|f| f.hash.is_some()).count()
    }
}
