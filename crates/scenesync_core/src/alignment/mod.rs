//! Temporal alignment engine.
//!
//! Pure, single-threaded building blocks that turn two fingerprint sets
//! into a timing curve:
//!
//! ```text
//! FingerprintSet (source) ─┐
//!                          ├─ matcher ─ filter ─ curation ─ curve ─ retime ─ TimingCurve
//! FingerprintSet (target) ─┘
//! ```
//!
//! Nothing here touches the filesystem or spawns processes. Collaborators
//! that need a human (safe-frame selection, curation) are injected through
//! the `SafeFrameSelector` and `CurationGate` traits.

mod curation;
mod curve;
mod error;
mod filter;
mod matcher;
mod retime;
mod safe_frames;

pub use curation::{
    curate_pairs, insert_pair, parse_index_list, remove_pairs, AcceptAll, CurationGate,
    FixedRemovals,
};
pub use curve::{
    build_curve, extend_end, extend_start, fingerprint_anchor, pairs_to_anchors, CurveParams,
};
pub use error::{AlignError, AlignResult};
pub use filter::{filter_pairs, filter_pairs_with_stats, FilterStats};
pub use matcher::{match_twins, roles_reversed};
pub use retime::{apply_retiming, RetimingPolicy, DEFAULT_MAX_SPEED_RATIO};
pub use safe_frames::{
    reinsert_safe_bounds, validate_safe_frames, FixedSafeFrames, SafeFrameSelector,
};

use serde::{Deserialize, Serialize};

use crate::models::{CorrespondencePair, FingerprintSet, SafeFrames};

/// Result of matching and filtering the safe ranges of both videos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    /// Filtered pairs, `main` = source scene, `twin` = target scene.
    pub pairs: Vec<CorrespondencePair>,
    /// Whether the target was matched as main.
    pub reversed_roles: bool,
    /// Number of raw matcher pairs.
    pub candidates: usize,
    /// What the filter removed.
    pub stats: FilterStats,
}

/// Match and filter the scene cuts between the safe frames.
///
/// Validates the safe frames first, then matches from the denser range to
/// the sparser one and filters the result.
pub fn correspond(
    source: &FingerprintSet,
    target: &FingerprintSet,
    safe: &SafeFrames,
) -> AlignResult<Correspondence> {
    validate_safe_frames(safe, source, target)?;

    let source_range = source
        .range(safe.source_start..=safe.source_end)
        .ok_or(AlignError::SafeFrameOutOfRange {
            side: "source",
            position: safe.source_end,
            available: source.len(),
        })?;
    let target_range = target
        .range(safe.target_start..=safe.target_end)
        .ok_or(AlignError::SafeFrameOutOfRange {
            side: "target",
            position: safe.target_end,
            available: target.len(),
        })?;

    let reversed = roles_reversed(source_range.len(), target_range.len());
    let candidates = if reversed {
        match_twins(target_range, source_range)
    } else {
        match_twins(source_range, target_range)
    };

    tracing::info!(
        "[Align] matched {} {} cuts against {} {} cuts",
        candidates.len(),
        if reversed { "target" } else { "source" },
        if reversed { source_range.len() } else { target_range.len() },
        if reversed { "source" } else { "target" },
    );

    let (pairs, stats) = filter_pairs_with_stats(&candidates, reversed)?;

    Ok(Correspondence {
        pairs,
        reversed_roles: reversed,
        candidates: candidates.len(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fingerprint, PerceptualHash};

    fn hashed_set(hashes: &[u8]) -> FingerprintSet {
        let fingerprints = hashes
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                Fingerprint::from_pts(i, i as i64 * 1000, 25.0, 1000)
                    .with_hash(PerceptualHash::from_bytes(vec![h]))
            })
            .collect();
        FingerprintSet::new("video.mkv", 25.0, 1000, fingerprints)
    }

    #[test]
    fn correspond_orients_pairs_source_first() {
        // target has an extra cut, so it is matched as main
        let source = hashed_set(&[0x01, 0x0f, 0xf0, 0x3c, 0xff]);
        let target = hashed_set(&[0x01, 0x0f, 0x55, 0xf0, 0x3c, 0xff]);
        let safe = SafeFrames::new((0, 0), (4, 5));

        let result = correspond(&source, &target, &safe).unwrap();
        assert!(result.reversed_roles);
        assert_eq!(result.candidates, 6);
        for pair in &result.pairs {
            let source_hash = &source.get(pair.main_index).unwrap().hash;
            let target_hash = &target.get(pair.twin_index.unwrap()).unwrap().hash;
            assert_eq!(source_hash, target_hash);
        }
        assert!(result.pairs.windows(2).all(|w| w[0].main_index < w[1].main_index));
    }

    #[test]
    fn correspond_rejects_bad_safe_frames() {
        let source = hashed_set(&[1, 2, 3]);
        let target = hashed_set(&[1, 2, 3]);
        let safe = SafeFrames::new((0, 0), (5, 2));
        assert!(correspond(&source, &target, &safe).is_err());
    }
}
