//! Frame correspondence records.

use serde::{Deserialize, Serialize};

/// Distance recorded for a main fingerprint that found no comparable twin.
pub const UNMATCHED_DISTANCE: u32 = u32::MAX;

/// A proposed correspondence between a scene cut of one video and a scene
/// cut of the other.
///
/// Indices are scene positions in their respective fingerprint sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrespondencePair {
    /// Scene index on the main side.
    pub main_index: usize,
    /// Scene index on the twin side, `None` when nothing was comparable.
    pub twin_index: Option<usize>,
    /// Hamming distance between the two hashes (0 for user-confirmed pairs).
    pub distance: u32,
}

impl CorrespondencePair {
    /// Create a matched pair.
    pub fn new(main_index: usize, twin_index: usize, distance: u32) -> Self {
        Self {
            main_index,
            twin_index: Some(twin_index),
            distance,
        }
    }

    /// Create a pair for a main fingerprint with no comparable twin.
    pub fn unmatched(main_index: usize) -> Self {
        Self {
            main_index,
            twin_index: None,
            distance: UNMATCHED_DISTANCE,
        }
    }

    /// Create a fully trusted pair (distance 0) from a user-confirmed frame.
    pub fn confirmed(main_index: usize, twin_index: usize) -> Self {
        Self::new(main_index, twin_index, 0)
    }

    /// Whether a twin was found.
    pub fn is_matched(&self) -> bool {
        self.twin_index.is_some()
    }

    /// Swap the main and twin sides. Unmatched pairs cannot be swapped.
    pub fn swapped(&self) -> Option<Self> {
        self.twin_index
            .map(|twin| Self::new(twin, self.main_index, self.distance))
    }
}

impl std::fmt::Display for CorrespondencePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.twin_index {
            Some(twin) => write!(f, "{} -> {} (d={})", self.main_index, twin, self.distance),
            None => write!(f, "{} -> none", self.main_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_pair_has_maximal_distance() {
        let pair = CorrespondencePair::unmatched(4);
        assert!(!pair.is_matched());
        assert_eq!(pair.distance, UNMATCHED_DISTANCE);
        assert!(pair.swapped().is_none());
    }

    #[test]
    fn swapping_exchanges_sides() {
        let pair = CorrespondencePair::new(2, 7, 5);
        let swapped = pair.swapped().unwrap();
        assert_eq!(swapped.main_index, 7);
        assert_eq!(swapped.twin_index, Some(2));
        assert_eq!(swapped.distance, 5);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(CorrespondencePair::confirmed(1, 3).to_string(), "1 -> 3 (d=0)");
        assert_eq!(CorrespondencePair::unmatched(9).to_string(), "9 -> none");
    }
}
