//! User-confirmed safe frames.
//!
//! The user picks one scene cut near the start and one near the end of each
//! video that visibly match. Matching only runs between these bounds, and
//! the bounds themselves are always part of the curve.

use super::error::{AlignError, AlignResult};
use crate::models::{CorrespondencePair, FingerprintSet, SafeFrames, SceneLookupError};

/// Synchronous collaborator that picks the safe frames.
pub trait SafeFrameSelector {
    fn select(&self, source: &FingerprintSet, target: &FingerprintSet) -> AlignResult<SafeFrames>;
}

/// Safe frames supplied up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedSafeFrames(pub SafeFrames);

impl SafeFrameSelector for FixedSafeFrames {
    fn select(&self, _source: &FingerprintSet, _target: &FingerprintSet) -> AlignResult<SafeFrames> {
        Ok(self.0)
    }
}

/// Check that the safe frames exist, run forward, and that each one's
/// recorded scene index equals its position in the set.
pub fn validate_safe_frames(
    safe: &SafeFrames,
    source: &FingerprintSet,
    target: &FingerprintSet,
) -> AlignResult<()> {
    if !safe.is_ordered() {
        return Err(AlignError::SafeFramesUnordered(format!(
            "source {}..{}, target {}..{}",
            safe.source_start, safe.source_end, safe.target_start, safe.target_end
        )));
    }

    let checks = [
        ("source", source, safe.source_start),
        ("source", source, safe.source_end),
        ("target", target, safe.target_start),
        ("target", target, safe.target_end),
    ];

    for (side, set, position) in checks {
        set.check_integrity(position).map_err(|e| match e {
            SceneLookupError::OutOfRange {
                position,
                available,
            } => AlignError::SafeFrameOutOfRange {
                side,
                position,
                available,
            },
            SceneLookupError::IndexMismatch { position, reported } => {
                AlignError::IndexIntegrityMismatch {
                    side,
                    position,
                    reported,
                }
            }
        })?;
    }

    Ok(())
}

/// Make sure the safe bounds open and close the pair list.
///
/// Prepends the safe start if the first pair is later (or there are no
/// pairs) and appends the safe end if the last pair is earlier. Both carry
/// distance 0. Calling this twice is a no-op the second time.
pub fn reinsert_safe_bounds(
    pairs: &[CorrespondencePair],
    safe: &SafeFrames,
) -> Vec<CorrespondencePair> {
    let mut out = Vec::with_capacity(pairs.len() + 2);

    if pairs
        .first()
        .map_or(true, |first| first.main_index > safe.source_start)
    {
        out.push(CorrespondencePair::confirmed(
            safe.source_start,
            safe.target_start,
        ));
    }
    out.extend_from_slice(pairs);

    if out
        .last()
        .map_or(true, |last| last.main_index < safe.source_end)
    {
        out.push(CorrespondencePair::confirmed(safe.source_end, safe.target_end));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fingerprint;

    fn set(count: usize) -> FingerprintSet {
        let fingerprints = (0..count)
            .map(|i| Fingerprint::from_pts(i, i as i64 * 2000, 24.0, 1000))
            .collect();
        FingerprintSet::new("video.mkv", 24.0, 1000, fingerprints)
    }

    #[test]
    fn valid_safe_frames_pass() {
        let safe = SafeFrames::new((1, 0), (8, 9));
        assert!(validate_safe_frames(&safe, &set(10), &set(10)).is_ok());
    }

    #[test]
    fn stale_scene_index_is_rejected() {
        let source = set(10);
        let mut target = set(10);
        target.fingerprints[9].scene_index = 4;

        let safe = SafeFrames::new((1, 0), (8, 9));
        let err = validate_safe_frames(&safe, &source, &target).unwrap_err();
        assert_eq!(
            err,
            AlignError::IndexIntegrityMismatch {
                side: "target",
                position: 9,
                reported: 4
            }
        );
    }

    #[test]
    fn out_of_range_and_unordered_are_rejected() {
        let safe = SafeFrames::new((1, 0), (12, 3));
        assert!(matches!(
            validate_safe_frames(&safe, &set(10), &set(10)),
            Err(AlignError::SafeFrameOutOfRange { side: "source", .. })
        ));

        let backwards = SafeFrames::new((5, 0), (2, 3));
        assert!(matches!(
            validate_safe_frames(&backwards, &set(10), &set(10)),
            Err(AlignError::SafeFramesUnordered(_))
        ));
    }

    #[test]
    fn bounds_are_added_once() {
        let safe = SafeFrames::new((1, 2), (9, 8));
        let pairs = vec![CorrespondencePair::new(3, 4, 6), CorrespondencePair::new(6, 5, 2)];

        let once = reinsert_safe_bounds(&pairs, &safe);
        assert_eq!(once.len(), 4);
        assert_eq!(once[0], CorrespondencePair::confirmed(1, 2));
        assert_eq!(once[3], CorrespondencePair::confirmed(9, 8));

        let twice = reinsert_safe_bounds(&once, &safe);
        assert_eq!(twice, once);
    }

    #[test]
    fn empty_pairs_get_both_bounds() {
        let safe = SafeFrames::new((0, 0), (4, 6));
        let pairs = reinsert_safe_bounds(&[], &safe);
        assert_eq!(
            pairs,
            vec![
                CorrespondencePair::confirmed(0, 0),
                CorrespondencePair::confirmed(4, 6)
            ]
        );
    }
}
