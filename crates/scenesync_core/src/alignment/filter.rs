//! Consistency filter.
//!
//! Matching is done from the denser timeline to the sparser one, so the
//! sparser side (the twin side as matched) can be claimed more than once or
//! out of order. The filter removes those pairs and returns the survivors
//! oriented as `main = source scene`, `twin = target scene`.
//!
//! 1. Unmatched pairs are dropped.
//! 2. Duplicate pass: every pair sharing its twin-side value with another
//!    pair is removed.
//! 3. Order pass (on the de-duplicated snapshot): a pair is removed if its
//!    value is smaller than the previous pair's or larger than the next's.
//!
//! Anything still out of order afterwards is fatal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{AlignError, AlignResult};
use crate::models::CorrespondencePair;

/// Counts of removed pairs, for logging and session reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub unmatched: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
}

impl FilterStats {
    pub fn total_removed(&self) -> usize {
        self.unmatched + self.duplicates + self.out_of_order
    }
}

/// Filter matcher output down to a strictly monotonic sequence.
///
/// `reversed_roles` is `true` when the target was matched as main; the
/// output is swapped back so it always reads source → target.
pub fn filter_pairs(
    pairs: &[CorrespondencePair],
    reversed_roles: bool,
) -> AlignResult<Vec<CorrespondencePair>> {
    filter_pairs_with_stats(pairs, reversed_roles).map(|(kept, _)| kept)
}

/// Same as `filter_pairs`, also reporting what was removed.
pub fn filter_pairs_with_stats(
    pairs: &[CorrespondencePair],
    reversed_roles: bool,
) -> AlignResult<(Vec<CorrespondencePair>, FilterStats)> {
    let mut stats = FilterStats::default();

    // (oriented pair, value on the unreliable side)
    let matched: Vec<(CorrespondencePair, usize)> = pairs
        .iter()
        .filter_map(|pair| {
            let twin = pair.twin_index?;
            let oriented = if reversed_roles {
                CorrespondencePair::new(twin, pair.main_index, pair.distance)
            } else {
                *pair
            };
            Some((oriented, twin))
        })
        .collect();
    stats.unmatched = pairs.len() - matched.len();

    let mut claims: HashMap<usize, usize> = HashMap::new();
    for (_, value) in &matched {
        *claims.entry(*value).or_insert(0) += 1;
    }
    let unique: Vec<(CorrespondencePair, usize)> = matched
        .into_iter()
        .filter(|(_, value)| claims.get(value).copied() == Some(1))
        .collect();
    stats.duplicates = pairs.len() - stats.unmatched - unique.len();

    let keep: Vec<bool> = (0..unique.len())
        .map(|i| {
            let value = unique[i].1;
            let after_previous = i == 0 || unique[i - 1].1 <= value;
            let before_next = i + 1 == unique.len() || value <= unique[i + 1].1;
            after_previous && before_next
        })
        .collect();

    let ordered: Vec<(CorrespondencePair, usize)> = unique
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect();
    stats.out_of_order = pairs.len() - stats.unmatched - stats.duplicates - ordered.len();

    for (position, window) in ordered.windows(2).enumerate() {
        let (previous, value) = (window[0].1, window[1].1);
        if value < previous {
            return Err(AlignError::UnresolvableOrdering {
                position: position + 1,
                previous,
                value,
            });
        }
    }

    tracing::info!(
        "[Filter] kept {} of {} pairs ({} unmatched, {} duplicate, {} out of order)",
        ordered.len(),
        pairs.len(),
        stats.unmatched,
        stats.duplicates,
        stats.out_of_order
    );

    Ok((ordered.into_iter().map(|(pair, _)| pair).collect(), stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(points: &[(usize, usize)]) -> Vec<CorrespondencePair> {
        points
            .iter()
            .map(|&(m, t)| CorrespondencePair::new(m, t, 1))
            .collect()
    }

    fn indices(pairs: &[CorrespondencePair]) -> Vec<(usize, usize)> {
        pairs
            .iter()
            .map(|p| (p.main_index, p.twin_index.unwrap()))
            .collect()
    }

    #[test]
    fn clean_sequence_passes_through() {
        let input = pairs(&[(0, 0), (1, 2), (2, 3), (3, 5)]);
        let kept = filter_pairs(&input, false).unwrap();
        assert_eq!(kept, input);
    }

    #[test]
    fn duplicates_remove_every_claimant() {
        let input = pairs(&[(0, 0), (1, 2), (2, 2), (3, 4)]);
        let (kept, stats) = filter_pairs_with_stats(&input, false).unwrap();
        assert_eq!(indices(&kept), vec![(0, 0), (3, 4)]);
        assert_eq!(stats.duplicates, 2);
    }

    #[test]
    fn single_inversion_is_removed() {
        let input = pairs(&[(0, 1), (1, 2), (2, 9), (3, 4), (4, 5)]);
        let (kept, stats) = filter_pairs_with_stats(&input, false).unwrap();
        // both sides of the inversion are dropped
        assert_eq!(indices(&kept), vec![(0, 1), (1, 2), (4, 5)]);
        assert_eq!(stats.out_of_order, 2);
    }

    #[test]
    fn reversed_roles_swap_back_to_source_first() {
        // matched as target -> source
        let input = pairs(&[(0, 1), (1, 2), (2, 4)]);
        let kept = filter_pairs(&input, true).unwrap();
        assert_eq!(indices(&kept), vec![(1, 0), (2, 1), (4, 2)]);
    }

    #[test]
    fn unmatched_pairs_are_dropped() {
        let mut input = pairs(&[(0, 0), (2, 3)]);
        input.insert(1, CorrespondencePair::unmatched(1));
        let (kept, stats) = filter_pairs_with_stats(&input, false).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.total_removed(), 1);
    }

    #[test]
    fn large_inversion_cluster_is_fatal() {
        // only the two pairs at the block boundary are flagged,
        // so a descent between the blocks remains
        let input = pairs(&[(0, 10), (1, 11), (2, 12), (3, 13), (4, 1), (5, 2), (6, 3), (7, 4)]);
        let err = filter_pairs(&input, false).unwrap_err();
        assert!(matches!(err, AlignError::UnresolvableOrdering { .. }));
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(filter_pairs(&[], false).unwrap().is_empty());
    }
}
