//! Alignment error types.

use thiserror::Error;

use crate::models::CurveViolation;

/// Fatal conditions raised by the alignment engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    /// Filtering could not produce a monotonic correspondence sequence.
    #[error(
        "unhandled case: too many unordered groups of frames \
         (pair {position} reads scene {value} after scene {previous})"
    )]
    UnresolvableOrdering {
        position: usize,
        previous: usize,
        value: usize,
    },

    /// A safe frame's scene index disagrees with its position in the set.
    #[error("{side} safe frame at position {position} reports scene index {reported}")]
    IndexIntegrityMismatch {
        side: &'static str,
        position: usize,
        reported: usize,
    },

    /// A safe frame points past the detected scene cuts.
    #[error("{side} safe frame {position} is outside the {available} detected scene cuts")]
    SafeFrameOutOfRange {
        side: &'static str,
        position: usize,
        available: usize,
    },

    /// Safe start is not before safe end.
    #[error("safe start must come before safe end ({0})")]
    SafeFramesUnordered(String),

    /// Not enough correspondences to build a curve.
    #[error("not enough safe correspondences: {found} anchor(s), need at least 2")]
    InsufficientAnchors { found: usize },

    /// A pair refers to a scene index with no fingerprint.
    #[error("{side} scene index {index} has no fingerprint")]
    UnknownScene { side: &'static str, index: usize },

    /// An unmatched pair reached curve building.
    #[error("pair for source scene {main_index} has no target scene")]
    UnmatchedPair { main_index: usize },

    /// An audio-sample curve was requested for media without audio.
    #[error("source media has no audio stream to derive sample positions from")]
    MissingAudio,

    /// The finished curve broke an ordering invariant.
    #[error("timing curve is not monotonic: {0}")]
    NonMonotonicCurve(#[from] CurveViolation),

    /// The safe-frame selector failed.
    #[error("safe frame selection failed: {0}")]
    Selection(String),

    /// The curation collaborator failed.
    #[error("curation failed: {0}")]
    Curation(String),
}

impl AlignError {
    /// Create a selection error.
    pub fn selection(message: impl Into<String>) -> Self {
        Self::Selection(message.into())
    }

    /// Create a curation error.
    pub fn curation(message: impl Into<String>) -> Self {
        Self::Curation(message.into())
    }
}

/// Result type for alignment operations.
pub type AlignResult<T> = Result<T, AlignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_error_uses_fixed_wording() {
        let err = AlignError::UnresolvableOrdering {
            position: 4,
            previous: 9,
            value: 3,
        };
        assert!(err
            .to_string()
            .starts_with("unhandled case: too many unordered groups of frames"));
    }

    #[test]
    fn curve_violation_converts() {
        let err: AlignError = CurveViolation::TooFewAnchors(1).into();
        assert!(matches!(err, AlignError::NonMonotonicCurve(_)));
    }
}
