//! Head-and-shoulders scanner
//!
//! Slides a candidate center across the series. At each center three peaks
//! are searched (left shoulder, head, right shoulder), the triplet is gated on
//! shape and confidence, then labelled by the classifier.

use std::collections::HashMap;
use std::ops::Range;

use tracing::trace;

use super::helpers::find_peak_with_radius;
use super::scoring::{classify_signal, score_confidence};
use crate::params::{
    HeadShouldersParams, ParamMeta, ParameterizedDetector, PeakWindow, HEAD_SHOULDERS_PARAMS,
};
use crate::{PatternCandidate, Peak, Result, OHLCV};

/// Identifier reported by [`ParameterizedDetector::pattern_id_str`]
pub const HEAD_AND_SHOULDERS_ID: &str = "HEAD_AND_SHOULDERS";

/// Reason a center index produced no candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// One of the three windows clamped to an empty range
    NoPeak,
    /// Head not strictly above both shoulders
    Shape,
    /// Scored below the minimum confidence
    LowConfidence(u32),
}

/// Head-and-shoulders detector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadAndShouldersDetector {
    pub params: HeadShouldersParams,
}

impl HeadAndShouldersDetector {
    pub fn new(params: HeadShouldersParams) -> Self {
        Self { params }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    #[inline]
    pub fn min_bars(&self) -> usize {
        self.params.min_bars.get()
    }

    /// Center indices visited for a series of `len` bars.
    #[inline]
    pub fn center_range(&self, len: usize) -> Range<usize> {
        let margin = self.params.center_margin;
        margin..len.saturating_sub(margin)
    }

    pub fn validate_config(&self) -> Result<()> {
        self.params.validate()
    }

    #[inline]
    fn peak_in(&self, closes: &[f64], window: PeakWindow, center: usize) -> Option<Peak> {
        let (start, end) = window.around(center);
        find_peak_with_radius(closes, start, end, self.params.windows.peak_search_radius)
    }

    /// Left shoulder, head and right shoulder around `center`.
    pub fn find_peaks(&self, closes: &[f64], center: usize) -> Option<(Peak, Peak, Peak)> {
        let w = &self.params.windows;
        let left = self.peak_in(closes, w.left_shoulder, center)?;
        let head = self.peak_in(closes, w.head, center)?;
        let right = self.peak_in(closes, w.right_shoulder, center)?;
        Some((left, head, right))
    }

    /// Evaluate a single center index. `closes` must be the close series of
    /// `bars`.
    pub fn evaluate<T: OHLCV>(
        &self,
        bars: &[T],
        closes: &[f64],
        center: usize,
    ) -> std::result::Result<PatternCandidate, Rejection> {
        let (left, head, right) = self.find_peaks(closes, center).ok_or(Rejection::NoPeak)?;

        if !(head.price > left.price && head.price > right.price) {
            return Err(Rejection::Shape);
        }

        let volume = bars.get(center).map_or(0.0, |b| b.volume());
        let confidence = score_confidence(
            left.price,
            head.price,
            right.price,
            volume,
            &self.params.confidence,
        );
        if confidence < self.params.confidence.min {
            return Err(Rejection::LowConfidence(confidence));
        }

        let class = classify_signal(
            bars,
            center,
            head.price,
            left.price,
            right.price,
            &self.params.classifier,
        );

        Ok(PatternCandidate {
            symbol: bars.first().map(|b| b.symbol().to_string()).unwrap_or_default(),
            pattern_type: class.pattern_type,
            left_shoulder: left.price,
            head: head.price,
            right_shoulder: right.price,
            confidence,
            signal: class.signal,
            strength: class.strength,
            start_index: left.index,
            center_index: center,
            end_index: right.index,
        })
    }

    /// Candidate at `center`, if any.
    #[inline]
    pub fn detect_at<T: OHLCV>(
        &self,
        bars: &[T],
        closes: &[f64],
        center: usize,
    ) -> Option<PatternCandidate> {
        self.evaluate(bars, closes, center).ok()
    }

    /// Raw scan: every accepted center, in ascending center order, before
    /// overlap resolution.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Vec<PatternCandidate> {
        if bars.len() < self.min_bars() {
            trace!(bars = bars.len(), need = self.min_bars(), "series too short");
            return Vec::new();
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close()).collect();
        let mut candidates = Vec::new();
        for center in self.center_range(bars.len()) {
            match self.evaluate(bars, &closes, center) {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => trace!(center, ?reason, "center rejected"),
            }
        }
        candidates
    }
}

impl ParameterizedDetector for HeadAndShouldersDetector {
    fn param_meta() -> &'static [ParamMeta] {
        HEAD_SHOULDERS_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        HeadShouldersParams::from_overrides(params).map(Self::new)
    }

    fn pattern_id_str() -> &'static str {
        HEAD_AND_SHOULDERS_ID
    }
}
