//! Confidence scoring and signal classification
//!
//! Both are pure functions of the three peak prices (plus the center bar's
//! volume, or the recent closes for the trend) and the configured thresholds.

use super::helpers::{head_prominence, shoulder_asymmetry};
use crate::params::{ClassifierParams, ConfidenceParams};
use crate::{PatternType, Signal, Strength, OHLCV};

// ============================================================
// CONFIDENCE
// ============================================================

/// Additive confidence heuristic.
///
/// Starts from `params.base` and adds:
/// - a shoulder symmetry bonus (tight or loose tier),
/// - a head prominence bonus (high or low tier),
/// - a volume bonus when the center bar's volume exceeds the threshold.
///
/// The sum is clamped to `params.max`. No lower clamp is applied; the minimum
/// confidence gate belongs to the scanner.
pub fn score_confidence(
    left: f64,
    head: f64,
    right: f64,
    center_volume: f64,
    params: &ConfidenceParams,
) -> u32 {
    let mut confidence = params.base;

    let asymmetry = shoulder_asymmetry(left, right);
    if asymmetry < params.symmetry_tight.get() {
        confidence = confidence.saturating_add(params.symmetry_tight_bonus);
    } else if asymmetry < params.symmetry_loose.get() {
        confidence = confidence.saturating_add(params.symmetry_loose_bonus);
    }

    let prominence = head_prominence(head, left, right);
    if prominence > params.prominence_high.get() {
        confidence = confidence.saturating_add(params.prominence_high_bonus);
    } else if prominence > params.prominence_low.get() {
        confidence = confidence.saturating_add(params.prominence_low_bonus);
    }

    if center_volume > params.volume_threshold {
        confidence = confidence.saturating_add(params.volume_bonus);
    }

    confidence.min(params.max)
}

// ============================================================
// CLASSIFICATION
// ============================================================

/// Pattern type, trading signal and strength tier of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub pattern_type: PatternType,
    pub signal: Signal,
    pub strength: Strength,
}

/// Close-to-close change over the `lookback` bars ending at (and including)
/// `center`. Zero when fewer than two bars are available.
pub fn recent_trend<T: OHLCV>(bars: &[T], center: usize, lookback: usize) -> f64 {
    let Some(last) = bars.get(center) else {
        return 0.0;
    };
    let first = center.saturating_sub(lookback.saturating_sub(1));
    if center == first {
        return 0.0;
    }
    last.close() - bars[first].close()
}

/// Strength tier from the head/shoulder ratio.
#[inline]
pub fn classify_strength(head: f64, left: f64, right: f64, params: &ClassifierParams) -> Strength {
    match head_prominence(head, left, right) {
        r if r > params.strong_ratio.get() => Strength::Strong,
        r if r > params.moderate_ratio.get() => Strength::Moderate,
        _ => Strength::Weak,
    }
}

/// Label a candidate centered at `center`.
///
/// A rising recent trend makes it a top (bearish reversal); a flat or falling
/// one makes it an inverse formation (bullish reversal).
pub fn classify_signal<T: OHLCV>(
    bars: &[T],
    center: usize,
    head: f64,
    left: f64,
    right: f64,
    params: &ClassifierParams,
) -> Classification {
    let trend = recent_trend(bars, center, params.trend_lookback.get());
    let (pattern_type, signal) = if trend > 0.0 {
        (PatternType::HeadAndShouldersTop, Signal::BearishReversal)
    } else {
        (PatternType::InverseHeadAndShoulders, Signal::BullishReversal)
    };

    Classification {
        pattern_type,
        signal,
        strength: classify_strength(head, left, right, params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close("TEST", i as i64 * 86_400_000, c, 1000.0))
            .collect()
    }

    fn score(left: f64, head: f64, right: f64, volume: f64) -> u32 {
        score_confidence(left, head, right, volume, &ConfidenceParams::default())
    }

    #[test]
    fn test_base_confidence_without_bonuses() {
        // Asymmetry 10%, prominence ~1.8%, low volume
        assert_eq!(score(100.0, 112.0, 110.0, 0.0), 60);
    }

    #[test]
    fn test_symmetry_tiers() {
        // Prominence (130 - 101) / 130 > 5% in all three: +15
        assert_eq!(score(100.0, 130.0, 101.0, 0.0), 95); // 60 + 20 + 15
        assert_eq!(score(100.0, 130.0, 104.0, 0.0), 85); // 60 + 10 + 15
        assert_eq!(score(100.0, 130.0, 110.0, 0.0), 75); // 60 + 0 + 15
    }

    #[test]
    fn test_prominence_tiers() {
        // Equal shoulders: +20
        assert_eq!(score(100.0, 110.0, 100.0, 0.0), 95); // ~9.1% -> +15
        assert_eq!(score(100.0, 104.0, 100.0, 0.0), 90); // ~3.8% -> +10
        assert_eq!(score(100.0, 102.0, 100.0, 0.0), 80); // ~2.0% -> +0
    }

    #[test]
    fn test_volume_bonus_and_clamp() {
        assert_eq!(score(100.0, 102.0, 100.0, 1_000_000.0), 80);
        assert_eq!(score(100.0, 102.0, 100.0, 1_000_001.0), 85);
        // 60 + 20 + 15 + 5 = 100, clamped
        assert_eq!(score(100.0, 115.0, 101.0, 2_000_000.0), 95);
    }

    #[test]
    fn test_degenerate_prices_score_base() {
        assert_eq!(score(0.0, 0.0, 0.0, 0.0), 60);
    }

    #[test]
    fn test_recent_trend() {
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 9.0]);
        // bars 2..=7 -> 9 - 12
        assert_eq!(recent_trend(&bars, 7, 6), -3.0);
        // bars 1..=6 -> 16 - 11
        assert_eq!(recent_trend(&bars, 6, 6), 5.0);
        // clipped at index 0
        assert_eq!(recent_trend(&bars, 2, 6), 2.0);
        // single bar
        assert_eq!(recent_trend(&bars, 0, 6), 0.0);
        assert_eq!(recent_trend(&bars, 5, 1), 0.0);
        // out of range
        assert_eq!(recent_trend(&bars, 42, 6), 0.0);
    }

    #[test]
    fn test_classify_rising_trend_is_top() {
        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let c = classify_signal(&bars, 5, 115.0, 100.0, 101.0, &ClassifierParams::default());
        assert_eq!(c.pattern_type, PatternType::HeadAndShouldersTop);
        assert_eq!(c.signal, Signal::BearishReversal);
        assert_eq!(c.strength, Strength::Strong);
    }

    #[test]
    fn test_classify_flat_trend_is_inverse() {
        let bars = bars_from_closes(&[100.0; 6]);
        let c = classify_signal(&bars, 5, 107.0, 100.0, 101.0, &ClassifierParams::default());
        assert_eq!(c.pattern_type, PatternType::InverseHeadAndShoulders);
        assert_eq!(c.signal, Signal::BullishReversal);
        assert_eq!(c.strength, Strength::Moderate);
    }

    #[test]
    fn test_strength_tiers() {
        let p = ClassifierParams::default();
        assert_eq!(classify_strength(110.0, 100.0, 100.0, &p), Strength::Strong); // ~9.1%
        assert_eq!(classify_strength(107.0, 100.0, 100.0, &p), Strength::Moderate); // ~6.5%
        assert_eq!(classify_strength(105.0, 100.0, 100.0, &p), Strength::Weak); // ~4.8%
    }
}
