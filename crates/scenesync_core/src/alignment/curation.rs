//! Curation gate.
//!
//! After filtering, a collaborator may veto individual correspondences
//! before the curve is built. The engine only asks for a list of pair
//! indices to drop; how those are chosen (terminal prompt, fixed list,
//! nothing at all) is up to the implementation.

use std::collections::BTreeSet;

use super::error::AlignResult;
use crate::models::CorrespondencePair;

/// Synchronous collaborator that picks pairs to discard.
pub trait CurationGate {
    /// Return indices into `pairs` that should be removed.
    ///
    /// Duplicates and out-of-range indices are tolerated.
    fn curate(&self, pairs: &[CorrespondencePair]) -> AlignResult<Vec<usize>>;
}

/// Keeps every pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl CurationGate for AcceptAll {
    fn curate(&self, _pairs: &[CorrespondencePair]) -> AlignResult<Vec<usize>> {
        Ok(Vec::new())
    }
}

/// Removes a list of indices chosen up front.
#[derive(Debug, Clone, Default)]
pub struct FixedRemovals {
    indices: Vec<usize>,
}

impl FixedRemovals {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Build from a comma separated list such as `"5,20"`.
    pub fn parse(input: &str) -> Self {
        Self::new(parse_index_list(input))
    }
}

impl CurationGate for FixedRemovals {
    fn curate(&self, _pairs: &[CorrespondencePair]) -> AlignResult<Vec<usize>> {
        Ok(self.indices.clone())
    }
}

/// Parse a comma separated index list. Tokens that are not non-negative
/// integers are ignored.
pub fn parse_index_list(input: &str) -> Vec<usize> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<usize>() {
            Ok(index) => Some(index),
            Err(_) => {
                tracing::debug!("[Curation] ignoring '{}'", token);
                None
            }
        })
        .collect()
}

/// Remove the pairs at `indices`, returning the survivors in order.
///
/// Indices past the end are logged and skipped.
pub fn remove_pairs(pairs: &[CorrespondencePair], indices: &[usize]) -> Vec<CorrespondencePair> {
    let mut drop = BTreeSet::new();
    for &index in indices {
        if index < pairs.len() {
            drop.insert(index);
        } else {
            tracing::warn!(
                "[Curation] index {} is out of range ({} pairs), skipped",
                index,
                pairs.len()
            );
        }
    }

    for &index in &drop {
        tracing::info!("[Curation] removing pair {}: {}", index, pairs[index]);
    }

    pairs
        .iter()
        .enumerate()
        .filter(|(i, _)| !drop.contains(i))
        .map(|(_, pair)| *pair)
        .collect()
}

/// Insert a pair at its position by source scene, replacing any pair that
/// already uses the same source scene.
pub fn insert_pair(pairs: &mut Vec<CorrespondencePair>, pair: CorrespondencePair) {
    let position = pairs.partition_point(|p| p.main_index < pair.main_index);
    match pairs.get(position) {
        Some(existing) if existing.main_index == pair.main_index => pairs[position] = pair,
        _ => pairs.insert(position, pair),
    }
}

/// Ask the gate and apply its answer.
pub fn curate_pairs(
    gate: &dyn CurationGate,
    pairs: &[CorrespondencePair],
) -> AlignResult<Vec<CorrespondencePair>> {
    let indices = gate.curate(pairs)?;
    if indices.is_empty() {
        return Ok(pairs.to_vec());
    }
    Ok(remove_pairs(pairs, &indices))
}
