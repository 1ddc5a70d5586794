//! # HSPD - Head-and-Shoulders Pattern Detector
//!
//! Scans a time-ordered series of price bars for head-and-shoulders
//! formations (and their inverse) and returns scored, classified candidates.
//!
//! ## Quick Start
//!
//! ```rust
//! use hspd::prelude::*;
//!
//! let mut closes = vec![90.0; 31];
//! closes[8] = 100.0;
//! closes[15] = 115.0;
//! closes[21] = 101.0;
//!
//! let bars: Vec<PriceBar> = closes
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &c)| PriceBar::from_close("BTC", i as i64 * 86_400_000, c, 2_500_000.0))
//!     .collect();
//!
//! let engine = EngineBuilder::new().build().unwrap();
//! let patterns = engine.scan(&bars).unwrap();
//!
//! assert_eq!(patterns.len(), 1);
//! assert_eq!(patterns[0].head, 115.0);
//! assert_eq!(patterns[0].confidence, 95);
//! ```
//!
//! Any bar type can be scanned by implementing [`OHLCV`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod detectors;
pub mod params;

pub mod prelude {
    pub use crate::{
        // Free function
        detect_head_and_shoulders,
        // Detectors
        detectors::*,
        // Parameters
        params::{
            ClassifierParams, ConfidenceParams, HeadShouldersParams, ParamMeta, ParamType,
            ParameterizedDetector, PeakWindow, WindowParams,
        },
        // Parallel
        scan_parallel,
        scan_parallel_raw,
        // Engine
        EngineBuilder,
        EngineConfig,
        // Types
        PatternCandidate,
        PatternEngine,
        // Errors
        PatternError,
        PatternType,
        Peak,
        Period,
        PriceBar,
        Ratio,
        Result,
        ScanError,
        ScanResult,
        Signal,
        Strength,
        // Core trait
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur while configuring or running detection
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAIT
// ============================================================

/// Core OHLCV data trait. Detection reads `close`, `volume` and `symbol`.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Milliseconds since the Unix epoch
    fn timestamp(&self) -> Option<i64> {
        None
    }

    fn symbol(&self) -> &str {
        ""
    }
}

/// Validate a single bar's values
fn validate_bar<T: OHLCV>(bar: &T) -> std::result::Result<(), &'static str> {
    if bar.close().is_nan() || bar.volume().is_nan() {
        return Err("NaN in close or volume");
    }
    if bar.close().is_infinite() || bar.volume().is_infinite() {
        return Err("Infinite close or volume");
    }
    if bar.volume() < 0.0 {
        return Err("negative volume");
    }
    if bar.high() < bar.low() {
        return Err("high < low");
    }
    Ok(())
}

// ============================================================
// PRICE BAR
// ============================================================

/// One OHLCV observation for an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub date: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Bar whose open, high and low all equal `close`. Handy for close-only
    /// series.
    pub fn from_close(symbol: impl Into<String>, timestamp: i64, close: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            date: String::new(),
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}

impl OHLCV for PriceBar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp)
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }
}

// ============================================================
// PATTERN CANDIDATE
// ============================================================

/// Local maximum found in a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub price: f64,
    /// Position in the bar sequence
    pub index: usize,
}

/// Formation type, inferred from the trend leading into the head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    #[serde(rename = "Head & Shoulders Top")]
    HeadAndShouldersTop,
    #[serde(rename = "Inverse Head & Shoulders")]
    InverseHeadAndShoulders,
}

impl PatternType {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::HeadAndShouldersTop => "Head & Shoulders Top",
            PatternType::InverseHeadAndShoulders => "Inverse Head & Shoulders",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trading signal implied by a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "Bearish Reversal")]
    BearishReversal,
    #[serde(rename = "Bullish Reversal")]
    BullishReversal,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::BearishReversal => "Bearish Reversal",
            Signal::BullishReversal => "Bullish Reversal",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How prominent the head is over the shoulders
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Moderate => "Moderate",
            Strength::Strong => "Strong",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected formation. Indices point into the scanned bar sequence and
/// satisfy `start_index < center_index < end_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCandidate {
    pub symbol: String,
    pub pattern_type: PatternType,
    pub left_shoulder: f64,
    pub head: f64,
    pub right_shoulder: f64,
    /// Heuristic score, within the configured `[min, max]` confidence bounds
    pub confidence: u32,
    pub signal: Signal,
    pub strength: Strength,
    /// Index of the left shoulder
    pub start_index: usize,
    pub center_index: usize,
    /// Index of the right shoulder
    pub end_index: usize,
}

impl PatternCandidate {
    /// Number of bars between the two shoulders
    #[inline]
    pub fn span(&self) -> usize {
        self.end_index - self.start_index
    }
}

// ============================================================
// FREE FUNCTION
// ============================================================

/// Scan `bars` and resolve overlaps in one call.
///
/// Returns an empty list for series shorter than `params.min_bars`. The result
/// is ordered by confidence (highest first), not chronologically.
pub fn detect_head_and_shoulders<T: OHLCV>(
    bars: &[T],
    params: &params::HeadShouldersParams,
) -> Vec<PatternCandidate> {
    let raw = detectors::HeadAndShouldersDetector::new(params.clone()).scan(bars);
    detectors::resolve_overlaps(raw, params.min_center_distance.get())
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Drop final candidates below this confidence
    pub min_confidence: Option<u32>,
    /// Check bars for NaN/infinite values and ordering before scanning
    pub validate_data: bool,
}

/// Main pattern detection engine
#[derive(Debug, Clone)]
pub struct PatternEngine {
    detector: detectors::HeadAndShouldersDetector,
    config: EngineConfig,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new(detectors::HeadAndShouldersDetector::default())
    }
}

impl PatternEngine {
    pub fn new(detector: detectors::HeadAndShouldersDetector) -> Self {
        Self {
            detector,
            config: EngineConfig::default(),
        }
    }

    #[inline]
    pub fn params(&self) -> &params::HeadShouldersParams {
        &self.detector.params
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ===========================================
    // LOW-LEVEL: Single center
    // ===========================================

    /// Evaluate a single center index, without overlap resolution.
    pub fn scan_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternCandidate> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close()).collect();
        self.detector
            .detect_at(bars, &closes, index)
            .filter(|c| self.should_include(c))
    }

    // ===========================================
    // HIGH-LEVEL: Batch processing
    // ===========================================

    /// Every accepted center in ascending center order, before overlap
    /// resolution.
    pub fn scan_raw<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternCandidate>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }

        let mut raw = self.detector.scan(bars);
        raw.retain(|c| self.should_include(c));
        Ok(raw)
    }

    /// Scan all bars and return the resolved candidate list, ordered by
    /// confidence (highest first).
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternCandidate>> {
        let raw = self.scan_raw(bars)?;
        let raw_len = raw.len();
        let kept =
            detectors::resolve_overlaps(raw, self.detector.params.min_center_distance.get());

        debug!(
            symbol = bars.first().map_or("", |b| b.symbol()),
            bars = bars.len(),
            raw = raw_len,
            kept = kept.len(),
            "head-and-shoulders scan complete"
        );
        Ok(kept)
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn should_include(&self, c: &PatternCandidate) -> bool {
        match self.config.min_confidence {
            Some(min) => c.confidence >= min,
            None => true,
        }
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        let mut prev_ts: Option<i64> = None;
        for (index, bar) in bars.iter().enumerate() {
            validate_bar(bar).map_err(|reason| PatternError::InvalidOHLCV { index, reason })?;

            if let Some(ts) = bar.timestamp() {
                if prev_ts.is_some_and(|prev| ts < prev) {
                    return Err(PatternError::InvalidOHLCV {
                        index,
                        reason: "timestamp earlier than previous bar",
                    });
                }
                prev_ts = Some(ts);
            }
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    params: params::HeadShouldersParams,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all detection parameters
    pub fn params(mut self, params: params::HeadShouldersParams) -> Self {
        self.params = params;
        self
    }

    /// Set minimum confidence filter (applied on top of the detector's own gate)
    pub fn min_confidence(mut self, confidence: u32) -> Self {
        self.config.min_confidence = Some(confidence);
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let detector = detectors::HeadAndShouldersDetector::new(self.params);
        detector.validate_config()?;
        Ok(PatternEngine {
            detector,
            config: self.config,
        })
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<PatternCandidate>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(
    engine: &PatternEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    scan_each(instruments, |bars| engine.scan(bars))
}

/// Like [`scan_parallel`], but each result holds the unresolved
/// [`PatternEngine::scan_raw`] list.
pub fn scan_parallel_raw<'a, T, I>(
    engine: &PatternEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    scan_each(instruments, |bars| engine.scan_raw(bars))
}

fn scan_each<'a, T, I, F>(instruments: I, scan: F) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
    F: Fn(&[T]) -> Result<Vec<PatternCandidate>> + Sync,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            scan(bars)
                .map(|patterns| ScanResult {
                    symbol: symbol.to_string(),
                    patterns,
                })
                .map_err(|error| {
                    warn!(symbol, %error, "scan failed");
                    ScanError {
                        symbol: symbol.to_string(),
                        error,
                    }
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
