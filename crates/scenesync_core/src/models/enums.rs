//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Which track of the source video is being re-timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTarget {
    Audio,
    Subtitles,
}

impl std::fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncTarget::Audio => write!(f, "audio"),
            SyncTarget::Subtitles => write!(f, "subtitles"),
        }
    }
}

/// How the timing curve is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    /// Match every scene cut between the safe frames and build a piecewise curve.
    #[default]
    Dynamic,
    /// Use only the two safe frames: one constant speed for the whole track.
    Fixed,
}

impl std::fmt::Display for SpeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedMode::Dynamic => write!(f, "dynamic"),
            SpeedMode::Fixed => write!(f, "fixed"),
        }
    }
}

/// Perceptual hash algorithm used for scene stills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// DCT-based perceptual hash.
    PHash,
    /// Gradient (difference) hash.
    DHash,
    /// Mean (average) hash.
    #[default]
    AHash,
    /// Block mean hash.
    BlockHash,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::PHash => write!(f, "phash"),
            HashAlgorithm::DHash => write!(f, "dhash"),
            HashAlgorithm::AHash => write!(f, "ahash"),
            HashAlgorithm::BlockHash => write!(f, "blockhash"),
        }
    }
}
