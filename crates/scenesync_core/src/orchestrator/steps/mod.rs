//! Pipeline step implementations.
//!
//! Each step handles a specific phase of the sync pipeline.

mod curate;
mod curve;
mod export;
mod fingerprint;
mod matching;
mod probe;
mod safe_frames;

pub use curate::CurateStep;
pub use curve::CurveStep;
pub use export::ExportStep;
pub use fingerprint::FingerprintStep;
pub use matching::MatchStep;
pub use probe::ProbeStep;
pub use safe_frames::SafeFramesStep;
