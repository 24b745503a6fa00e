//! Data models shared across the alignment pipeline.
//!
//! - `fingerprint`: per-scene-cut fingerprints and the per-video set
//! - `pair`: frame correspondences produced by the matcher
//! - `anchor`: timing curve control points and lookups
//! - `media`: probed media properties and user-confirmed safe frames
//! - `enums`: small configuration enums

mod anchor;
mod enums;
mod fingerprint;
mod media;
mod pair;

pub use anchor::{Anchor, CurveUnit, CurveViolation, TimingCurve};
pub use enums::{HashAlgorithm, SpeedMode, SyncTarget};
pub use fingerprint::{Fingerprint, FingerprintSet, PerceptualHash, SceneLookupError};
pub use media::{MediaInfo, SafeFrames};
pub use pair::{CorrespondencePair, UNMATCHED_DISTANCE};
