//! Common helper functions for head-and-shoulders detection
//!
//! Local peak search over a window of close prices, and the two ratios shared
//! by the confidence scorer and the signal classifier.

use crate::Peak;

/// Default number of positions searched on either side of a window maximum
/// that turns out not to be a strict local peak.
pub const PEAK_SEARCH_RADIUS: usize = 2;

// ============================================================
// PEAK FINDING
// ============================================================

/// Find the local maximum of `prices[start..end]`.
///
/// Bounds are clamped to the series, so windows hanging off either end are
/// fine. Returns `None` only when the clamped window is empty.
///
/// See [`find_peak_with_radius`] for the peak verification step.
#[inline]
pub fn find_peak(prices: &[f64], start: isize, end: isize) -> Option<Peak> {
    find_peak_with_radius(prices, start, end, PEAK_SEARCH_RADIUS)
}

/// Like [`find_peak`] but with a custom re-search radius.
///
/// The window maximum (first occurrence) is verified against its neighbours in
/// the whole series. If it sits in the interior and is not strictly above both
/// neighbours, the first strict local peak within `radius` positions is
/// returned instead; if there is none, the unverified maximum is kept.
pub fn find_peak_with_radius(
    prices: &[f64],
    start: isize,
    end: isize,
    radius: usize,
) -> Option<Peak> {
    let start = start.max(0) as usize;
    let end = end.min(prices.len() as isize);
    if end <= 0 || start >= end as usize {
        return None;
    }
    let end = end as usize;

    let max = window_max(prices, start, end);
    if is_interior(prices, max.index) && !is_local_peak(prices, max.index) {
        if let Some(corrected) = nearest_local_peak(prices, max.index, radius) {
            return Some(corrected);
        }
        // Tolerated: a flat or monotonic neighbourhood keeps the raw maximum.
    }
    Some(max)
}

/// Maximum of a non-empty window and the index of its first occurrence.
#[inline]
fn window_max(prices: &[f64], start: usize, end: usize) -> Peak {
    let mut best = Peak {
        price: prices[start],
        index: start,
    };
    for (offset, &price) in prices[start + 1..end].iter().enumerate() {
        if price > best.price {
            best = Peak {
                price,
                index: start + 1 + offset,
            };
        }
    }
    best
}

/// True when `index` has a neighbour on both sides.
#[inline]
pub fn is_interior(prices: &[f64], index: usize) -> bool {
    index > 0 && index + 1 < prices.len()
}

/// True when `prices[index]` is strictly above both neighbours.
/// Endpoints are never local peaks.
#[inline]
pub fn is_local_peak(prices: &[f64], index: usize) -> bool {
    is_interior(prices, index)
        && prices[index] > prices[index - 1]
        && prices[index] > prices[index + 1]
}

/// First strict local peak in `[index - radius, index + radius]`, scanning
/// left to right and clamped to the series.
pub fn nearest_local_peak(prices: &[f64], index: usize, radius: usize) -> Option<Peak> {
    let lo = index.saturating_sub(radius);
    let hi = index.saturating_add(radius).saturating_add(1).min(prices.len());
    (lo..hi).find(|&i| is_local_peak(prices, i)).map(|i| Peak {
        price: prices[i],
        index: i,
    })
}

// ============================================================
// SHAPE RATIOS
// ============================================================

/// Relative height difference of the two shoulders: `|l - r| / max(l, r)`.
#[inline]
pub fn shoulder_asymmetry(left: f64, right: f64) -> f64 {
    (left - right).abs() / left.max(right)
}

/// How far the head rises above the higher shoulder, relative to the head:
/// `(head - max(l, r)) / head`.
#[inline]
pub fn head_prominence(head: f64, left: f64, right: f64) -> f64 {
    (head - left.max(right)) / head
}
