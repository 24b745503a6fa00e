//! Correspondence matcher.
//!
//! For every main fingerprint, scans all twin fingerprints and keeps the one
//! with the smallest Hamming distance. Ties keep the earliest twin (strict
//! `<`). O(|main| * |twin|), bounded by scene cuts in the safe range.

use crate::models::{CorrespondencePair, Fingerprint};

/// Match each main fingerprint to its nearest twin.
///
/// Returns one pair per main fingerprint, in input order. A main fingerprint
/// with no comparable twin (missing hash on either side) yields an unmatched
/// pair carrying the maximal distance.
pub fn match_twins(main: &[Fingerprint], twin: &[Fingerprint]) -> Vec<CorrespondencePair> {
    main.iter()
        .map(|m| {
            let mut best: Option<(usize, u32)> = None;
            for t in twin {
                let Some(distance) = m.distance_to(t) else {
                    continue;
                };
                if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                    best = Some((t.scene_index, distance));
                }
            }

            match best {
                Some((twin_index, distance)) => {
                    tracing::trace!(
                        "[Matcher] scene {} -> {} (distance {})",
                        m.scene_index,
                        twin_index,
                        distance
                    );
                    CorrespondencePair::new(m.scene_index, twin_index, distance)
                }
                None => {
                    tracing::debug!("[Matcher] scene {} has no comparable twin", m.scene_index);
                    CorrespondencePair::unmatched(m.scene_index)
                }
            }
        })
        .collect()
}

/// Decide which side is matched as main.
///
/// The side with more scene cuts is main, so each of its cuts looks up a
/// counterpart on the sparser side. Returns `true` when the target is the
/// denser side and roles are therefore reversed.
pub fn roles_reversed(source_cuts: usize, target_cuts: usize) -> bool {
    target_cuts > source_cuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerceptualHash;

    fn fp(scene_index: usize, hash: Option<u8>) -> Fingerprint {
        let f = Fingerprint::from_pts(scene_index, scene_index as i64 * 1000, 25.0, 1000);
        match hash {
            Some(h) => f.with_hash(PerceptualHash::from_bytes(vec![h])),
            None => f,
        }
    }

    #[test]
    fn selects_exact_match_over_near_match() {
        let main = vec![fp(0, Some(0b0000))];
        let twin = vec![fp(0, Some(0b0001)), fp(1, Some(0b0000))];

        let pairs = match_twins(&main, &twin);
        assert_eq!(pairs, vec![CorrespondencePair::new(0, 1, 0)]);
    }

    #[test]
    fn ties_keep_earliest_twin() {
        let main = vec![fp(0, Some(0b0000))];
        let twin = vec![
            fp(0, Some(0b1000)),
            fp(1, Some(0b0001)),
            fp(2, Some(0b0010)),
        ];

        for _ in 0..10 {
            let pairs = match_twins(&main, &twin);
            assert_eq!(pairs[0].twin_index, Some(0));
            assert_eq!(pairs[0].distance, 1);
        }
    }

    #[test]
    fn one_pair_per_main_in_order() {
        let main = vec![fp(4, Some(1)), fp(5, Some(2)), fp(6, Some(3))];
        let twin = vec![fp(0, Some(3)), fp(1, Some(2)), fp(2, Some(1))];

        let pairs = match_twins(&main, &twin);
        let mains: Vec<usize> = pairs.iter().map(|p| p.main_index).collect();
        assert_eq!(mains, vec![4, 5, 6]);
        assert_eq!(pairs[0].twin_index, Some(2));
        assert_eq!(pairs[2].twin_index, Some(0));
    }

    #[test]
    fn missing_hashes_yield_unmatched() {
        let main = vec![fp(0, None), fp(1, Some(0))];
        let twin = vec![fp(0, None), fp(1, Some(0))];

        let pairs = match_twins(&main, &twin);
        assert!(!pairs[0].is_matched());
        assert_eq!(pairs[1], CorrespondencePair::new(1, 1, 0));
    }

    #[test]
    fn denser_side_is_main() {
        assert!(!roles_reversed(10, 8));
        assert!(!roles_reversed(8, 8));
        assert!(roles_reversed(8, 10));
    }
}
