//! Overlap resolution
//!
//! Neighbouring centers often describe the same formation. Resolution keeps
//! the highest-confidence candidate of every cluster whose centers lie closer
//! than `min_distance` bars.

use crate::PatternCandidate;

/// Default minimum distance between kept center indices
pub const MIN_CENTER_DISTANCE: usize = 10;

/// Greedy deduplication by confidence.
///
/// Candidates are ordered by confidence, highest first; equal confidences keep
/// the smaller `center_index` first. Walking that order, a candidate is kept
/// only if its center is at least `min_distance` away from every center kept
/// so far.
///
/// The result is in that confidence-descending order, not in scan order.
pub fn resolve_overlaps(
    mut candidates: Vec<PatternCandidate>,
    min_distance: usize,
) -> Vec<PatternCandidate> {
    if candidates.len() <= 1 {
        return candidates;
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then(a.center_index.cmp(&b.center_index))
    });

    let mut kept: Vec<PatternCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let clear = kept
            .iter()
            .all(|k| k.center_index.abs_diff(candidate.center_index) >= min_distance);
        if clear {
            kept.push(candidate);
        }
    }
    kept
}
