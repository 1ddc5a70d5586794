//! Tunable thresholds for head-and-shoulders detection
//!
//! Every constant the scanner relies on lives in [`HeadShouldersParams`]:
//! window offsets, the minimum series length, confidence bonuses, the
//! classifier's strength tiers and the overlap distance.
//!
//! This module also provides metadata about each scalar parameter, enabling:
//! - Grid search optimization
//! - Parameter documentation
//! - Loading overrides from a config file or a flat key/value map
//!
//! # Example
//!
//! ```rust
//! use hspd::params::{HeadShouldersParams, ParameterizedDetector};
//! use hspd::prelude::*;
//!
//! for param in HeadAndShouldersDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let params = HeadShouldersParams::default();
//! assert!(params.validate().is_ok());
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detectors::{MIN_CENTER_DISTANCE, PEAK_SEARCH_RADIUS};
use crate::{PatternError, Period, Ratio, Result};

// ============================================================
// PARAMETER STRUCTURES
// ============================================================

/// Largest accepted `peak_search_radius`
pub const MAX_PEAK_SEARCH_RADIUS: usize = 16;

/// Largest accepted absolute window offset
pub const MAX_WINDOW_OFFSET: usize = 1_000;

/// Half-open window `[center + start, center + end)` of offsets relative to a
/// candidate center index. Bounds may fall outside the series; the peak finder
/// clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakWindow {
  pub start: isize,
  pub end: isize,
}

impl PeakWindow {
  pub const fn new(start: isize, end: isize) -> Self {
    Self { start, end }
  }

  /// Absolute (unclamped) bounds for a given center index.
  #[inline]
  pub fn around(&self, center: usize) -> (isize, isize) {
    let center = isize::try_from(center).unwrap_or(isize::MAX);
    (center.saturating_add(self.start), center.saturating_add(self.end))
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.start >= self.end
  }
}

/// Search windows for the three peaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
  pub left_shoulder: PeakWindow,
  pub head: PeakWindow,
  pub right_shoulder: PeakWindow,
  /// Positions searched on either side of a window maximum that is not a
  /// strict local peak.
  pub peak_search_radius: usize,
}

impl Default for WindowParams {
  fn default() -> Self {
    Self {
      left_shoulder: PeakWindow::new(-12, -6),
      head: PeakWindow::new(-3, 3),
      right_shoulder: PeakWindow::new(6, 12),
      peak_search_radius: PEAK_SEARCH_RADIUS,
    }
  }
}

/// Additive confidence heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceParams {
  /// Starting score before any bonus
  pub base: u32,
  /// Candidates scoring below this are dropped by the scanner
  pub min: u32,
  /// Upper clamp applied by the scorer
  pub max: u32,
  /// Shoulder asymmetry below this earns `symmetry_tight_bonus`
  pub symmetry_tight: Ratio,
  pub symmetry_tight_bonus: u32,
  /// Shoulder asymmetry below this earns `symmetry_loose_bonus`
  pub symmetry_loose: Ratio,
  pub symmetry_loose_bonus: u32,
  /// Head prominence above this earns `prominence_high_bonus`
  pub prominence_high: Ratio,
  pub prominence_high_bonus: u32,
  /// Head prominence above this earns `prominence_low_bonus`
  pub prominence_low: Ratio,
  pub prominence_low_bonus: u32,
  /// Center-bar volume above this earns `volume_bonus`
  pub volume_threshold: f64,
  pub volume_bonus: u32,
}

impl Default for ConfidenceParams {
  fn default() -> Self {
    Self {
      base: 60,
      min: 60,
      max: 95,
      symmetry_tight: Ratio::new_const(0.03),
      symmetry_tight_bonus: 20,
      symmetry_loose: Ratio::new_const(0.05),
      symmetry_loose_bonus: 10,
      prominence_high: Ratio::new_const(0.05),
      prominence_high_bonus: 15,
      prominence_low: Ratio::new_const(0.03),
      prominence_low_bonus: 10,
      volume_threshold: 1_000_000.0,
      volume_bonus: 5,
    }
  }
}

/// Trend lookback and strength tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
  /// Number of bars, ending at the center, used to measure the recent trend
  pub trend_lookback: Period,
  pub strong_ratio: Ratio,
  pub moderate_ratio: Ratio,
}

impl Default for ClassifierParams {
  fn default() -> Self {
    Self {
      trend_lookback: Period::new_const(6),
      strong_ratio: Ratio::new_const(0.08),
      moderate_ratio: Ratio::new_const(0.05),
    }
  }
}

/// Full configuration of the head-and-shoulders scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadShouldersParams {
  /// Series shorter than this yield no candidates
  pub min_bars: Period,
  /// Centers are scanned over `[center_margin, len - center_margin)`
  pub center_margin: usize,
  pub windows: WindowParams,
  pub confidence: ConfidenceParams,
  pub classifier: ClassifierParams,
  /// Final candidates are at least this many bars apart (by center index)
  pub min_center_distance: Period,
}

impl Default for HeadShouldersParams {
  fn default() -> Self {
    Self {
      min_bars: Period::new_const(20),
      center_margin: 15,
      windows: WindowParams::default(),
      confidence: ConfidenceParams::default(),
      classifier: ClassifierParams::default(),
      min_center_distance: Period::new_const(MIN_CENTER_DISTANCE),
    }
  }
}

impl HeadShouldersParams {
  /// Load parameters from a TOML/JSON/YAML file. Missing keys keep their
  /// defaults; the result is validated before it is returned.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let params: Self = config::Config::builder()
      .add_source(config::File::from(path.as_ref()))
      .build()
      .map_err(|err| PatternError::InvalidConfig(err.to_string()))?
      .try_deserialize()
      .map_err(|err| PatternError::InvalidConfig(err.to_string()))?;
    params.validate()?;
    Ok(params)
  }

  /// Check cross-field consistency.
  pub fn validate(&self) -> Result<()> {
    let w = &self.windows;
    if w.peak_search_radius > MAX_PEAK_SEARCH_RADIUS {
      return Err(PatternError::OutOfRange {
        field: "peak_search_radius",
        value: w.peak_search_radius as f64,
        min: 0.0,
        max: MAX_PEAK_SEARCH_RADIUS as f64,
      });
    }
    for (name, window) in
      [("left_shoulder", w.left_shoulder), ("head", w.head), ("right_shoulder", w.right_shoulder)]
    {
      if window.start.unsigned_abs() > MAX_WINDOW_OFFSET
        || window.end.unsigned_abs() > MAX_WINDOW_OFFSET
      {
        return Err(PatternError::InvalidConfig(format!(
          "{name} window [{}, {}) exceeds offset limit {MAX_WINDOW_OFFSET}",
          window.start, window.end
        )));
      }
      if window.is_empty() {
        return Err(PatternError::InvalidConfig(format!(
          "{name} window [{}, {}) is empty",
          window.start, window.end
        )));
      }
    }

    // A corrected peak may move `peak_search_radius` positions away from the
    // window maximum; it must still land strictly before/after the center.
    let radius = w.peak_search_radius as isize;
    if w.left_shoulder.end - 1 + radius >= 0 {
      return Err(PatternError::InvalidConfig(format!(
        "left_shoulder window end {} with search radius {} can reach the center",
        w.left_shoulder.end, w.peak_search_radius
      )));
    }
    if w.right_shoulder.start - radius <= 0 {
      return Err(PatternError::InvalidConfig(format!(
        "right_shoulder window start {} with search radius {} can reach the center",
        w.right_shoulder.start, w.peak_search_radius
      )));
    }

    let c = &self.confidence;
    if c.max < c.min {
      return Err(PatternError::InvalidConfig(format!(
        "max confidence {} is below min confidence {}",
        c.max, c.min
      )));
    }
    if c.symmetry_tight > c.symmetry_loose {
      return Err(PatternError::InvalidConfig(
        "symmetry_tight must not exceed symmetry_loose".into(),
      ));
    }
    if c.prominence_low > c.prominence_high {
      return Err(PatternError::InvalidConfig(
        "prominence_low must not exceed prominence_high".into(),
      ));
    }
    if c.volume_threshold.is_nan() || c.volume_threshold < 0.0 {
      return Err(PatternError::OutOfRange {
        field: "volume_threshold",
        value: c.volume_threshold,
        min: 0.0,
        max: f64::INFINITY,
      });
    }

    if self.classifier.moderate_ratio > self.classifier.strong_ratio {
      return Err(PatternError::InvalidConfig(
        "moderate_ratio must not exceed strong_ratio".into(),
      ));
    }

    Ok(())
  }
}

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value (0.0..=1.0)
  Ratio,
  /// Period value (positive integer)
  Period,
  /// Non-negative whole number (score points, volumes, radii)
  Count,
  /// Signed whole-number offset relative to the center index
  Offset,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "symmetry_tight")
  pub name: &'static str,
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn count(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Count, default, range, description }
  }

  pub const fn offset(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Offset, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value.is_nan() || value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ok(()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(PatternError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
      ParamType::Count => {
        if value < 0.0 || value.fract() != 0.0 {
          return Err(PatternError::InvalidValue("Count must be a non-negative integer"));
        }
        Ok(())
      },
      ParamType::Offset => {
        if value.fract() != 0.0 {
          return Err(PatternError::InvalidValue("Offset must be an integer"));
        }
        Ok(())
      },
    }
  }
}

/// All scalar parameters of [`HeadShouldersParams`], by flat key.
pub const HEAD_SHOULDERS_PARAMS: &[ParamMeta] = &[
  ParamMeta::period("min_bars", 20.0, (10.0, 60.0, 5.0), "Minimum series length"),
  ParamMeta::count("center_margin", 15.0, (12.0, 30.0, 1.0), "Bars skipped at both ends"),
  ParamMeta::offset("left_shoulder_start", -12.0, (-20.0, -8.0, 1.0), "Left window start"),
  ParamMeta::offset("left_shoulder_end", -6.0, (-8.0, -3.0, 1.0), "Left window end (exclusive)"),
  ParamMeta::offset("head_start", -3.0, (-5.0, -1.0, 1.0), "Head window start"),
  ParamMeta::offset("head_end", 3.0, (1.0, 5.0, 1.0), "Head window end (exclusive)"),
  ParamMeta::offset("right_shoulder_start", 6.0, (3.0, 8.0, 1.0), "Right window start"),
  ParamMeta::offset("right_shoulder_end", 12.0, (8.0, 20.0, 1.0), "Right window end (exclusive)"),
  ParamMeta::count("peak_search_radius", 2.0, (0.0, 3.0, 1.0), "Local peak re-search radius"),
  ParamMeta::count("base_confidence", 60.0, (0.0, 100.0, 5.0), "Score before bonuses"),
  ParamMeta::count("min_confidence", 60.0, (0.0, 100.0, 5.0), "Minimum score to emit"),
  ParamMeta::count("max_confidence", 95.0, (0.0, 100.0, 5.0), "Score clamp"),
  ParamMeta::ratio("symmetry_tight", 0.03, (0.01, 0.05, 0.01), "Tight shoulder asymmetry"),
  ParamMeta::count("symmetry_tight_bonus", 20.0, (0.0, 30.0, 5.0), "Tight symmetry bonus"),
  ParamMeta::ratio("symmetry_loose", 0.05, (0.03, 0.10, 0.01), "Loose shoulder asymmetry"),
  ParamMeta::count("symmetry_loose_bonus", 10.0, (0.0, 30.0, 5.0), "Loose symmetry bonus"),
  ParamMeta::ratio("prominence_high", 0.05, (0.03, 0.10, 0.01), "High head prominence"),
  ParamMeta::count("prominence_high_bonus", 15.0, (0.0, 30.0, 5.0), "High prominence bonus"),
  ParamMeta::ratio("prominence_low", 0.03, (0.01, 0.05, 0.01), "Low head prominence"),
  ParamMeta::count("prominence_low_bonus", 10.0, (0.0, 30.0, 5.0), "Low prominence bonus"),
  ParamMeta::count(
    "volume_threshold",
    1_000_000.0,
    (0.0, 10_000_000.0, 500_000.0),
    "Center-bar volume threshold",
  ),
  ParamMeta::count("volume_bonus", 5.0, (0.0, 15.0, 5.0), "High volume bonus"),
  ParamMeta::period("trend_lookback", 6.0, (2.0, 20.0, 1.0), "Bars used for the recent trend"),
  ParamMeta::ratio("strong_ratio", 0.08, (0.05, 0.15, 0.01), "Strong head/shoulder ratio"),
  ParamMeta::ratio("moderate_ratio", 0.05, (0.02, 0.10, 0.01), "Moderate head/shoulder ratio"),
  ParamMeta::period("min_center_distance", 10.0, (5.0, 30.0, 1.0), "Overlap distance"),
];

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors that support parameterization
///
/// Implementing this trait enables:
/// - Discovery of available parameters
/// - Creation of detectors with custom parameter values
/// - Grid search optimization
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Returns the pattern ID string
  fn pattern_id_str() -> &'static str;
}

impl HeadShouldersParams {
  /// Build parameters from flat key/value overrides (keys as in
  /// [`HEAD_SHOULDERS_PARAMS`]). Unknown keys are ignored.
  pub fn from_overrides(params: &HashMap<&str, f64>) -> Result<Self> {
    for meta in HEAD_SHOULDERS_PARAMS {
      if let Some(&value) = params.get(meta.name) {
        meta.validate(value)?;
      }
    }

    let d = Self::default();
    let (dw, dc, dk) = (&d.windows, &d.confidence, &d.classifier);
    let out = Self {
      min_bars: get_period(params, "min_bars", d.min_bars.get())?,
      center_margin: get_count(params, "center_margin", d.center_margin as f64) as usize,
      windows: WindowParams {
        left_shoulder: PeakWindow::new(
          get_offset(params, "left_shoulder_start", dw.left_shoulder.start),
          get_offset(params, "left_shoulder_end", dw.left_shoulder.end),
        ),
        head: PeakWindow::new(
          get_offset(params, "head_start", dw.head.start),
          get_offset(params, "head_end", dw.head.end),
        ),
        right_shoulder: PeakWindow::new(
          get_offset(params, "right_shoulder_start", dw.right_shoulder.start),
          get_offset(params, "right_shoulder_end", dw.right_shoulder.end),
        ),
        peak_search_radius: get_count(params, "peak_search_radius", dw.peak_search_radius as f64)
          as usize,
      },
      confidence: ConfidenceParams {
        base: get_count(params, "base_confidence", dc.base as f64) as u32,
        min: get_count(params, "min_confidence", dc.min as f64) as u32,
        max: get_count(params, "max_confidence", dc.max as f64) as u32,
        symmetry_tight: get_ratio(params, "symmetry_tight", dc.symmetry_tight.get())?,
        symmetry_tight_bonus: get_count(params, "symmetry_tight_bonus", dc.symmetry_tight_bonus as f64)
          as u32,
        symmetry_loose: get_ratio(params, "symmetry_loose", dc.symmetry_loose.get())?,
        symmetry_loose_bonus: get_count(params, "symmetry_loose_bonus", dc.symmetry_loose_bonus as f64)
          as u32,
        prominence_high: get_ratio(params, "prominence_high", dc.prominence_high.get())?,
        prominence_high_bonus: get_count(
          params,
          "prominence_high_bonus",
          dc.prominence_high_bonus as f64,
        ) as u32,
        prominence_low: get_ratio(params, "prominence_low", dc.prominence_low.get())?,
        prominence_low_bonus: get_count(params, "prominence_low_bonus", dc.prominence_low_bonus as f64)
          as u32,
        volume_threshold: get_count(params, "volume_threshold", dc.volume_threshold),
        volume_bonus: get_count(params, "volume_bonus", dc.volume_bonus as f64) as u32,
      },
      classifier: ClassifierParams {
        trend_lookback: get_period(params, "trend_lookback", dk.trend_lookback.get())?,
        strong_ratio: get_ratio(params, "strong_ratio", dk.strong_ratio.get())?,
        moderate_ratio: get_ratio(params, "moderate_ratio", dk.moderate_ratio.get())?,
      },
      min_center_distance: get_period(params, "min_center_distance", d.min_center_distance.get())?,
    };
    out.validate()?;
    Ok(out)
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  Period::new(value as usize)
}

fn get_count(params: &HashMap<&str, f64>, key: &str, default: f64) -> f64 {
  params.get(key).copied().unwrap_or(default)
}

fn get_offset(params: &HashMap<&str, f64>, key: &str, default: isize) -> isize {
  params.get(key).map_or(default, |&v| v as isize)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    assert!(HeadShouldersParams::default().validate().is_ok());
  }

  #[test]
  fn test_defaults_match_meta() {
    let p = HeadShouldersParams::from_overrides(&HashMap::new()).unwrap();
    assert_eq!(p, HeadShouldersParams::default());

    let meta = HEAD_SHOULDERS_PARAMS.iter().find(|m| m.name == "min_confidence").unwrap();
    assert_eq!(meta.default, p.confidence.min as f64);
    let meta = HEAD_SHOULDERS_PARAMS.iter().find(|m| m.name == "left_shoulder_start").unwrap();
    assert_eq!(meta.default, p.windows.left_shoulder.start as f64);
  }

  #[test]
  fn test_from_overrides() {
    let mut overrides = HashMap::new();
    overrides.insert("min_center_distance", 15.0);
    overrides.insert("symmetry_tight", 0.02);
    overrides.insert("head_start", -2.0);
    overrides.insert("not_a_param", 1.0);

    let p = HeadShouldersParams::from_overrides(&overrides).unwrap();
    assert_eq!(p.min_center_distance.get(), 15);
    assert!((p.confidence.symmetry_tight.get() - 0.02).abs() < f64::EPSILON);
    assert_eq!(p.windows.head, PeakWindow::new(-2, 3));
  }

  #[test]
  fn test_from_overrides_out_of_range() {
    let mut overrides = HashMap::new();
    overrides.insert("strong_ratio", 0.5);
    assert!(HeadShouldersParams::from_overrides(&overrides).is_err());
  }

  #[test]
  fn test_from_overrides_inconsistent() {
    let mut overrides = HashMap::new();
    overrides.insert("moderate_ratio", 0.09);
    overrides.insert("strong_ratio", 0.06);
    assert!(matches!(
      HeadShouldersParams::from_overrides(&overrides),
      Err(PatternError::InvalidConfig(_))
    ));
  }

  #[test]
  fn test_validate_empty_window() {
    let mut p = HeadShouldersParams::default();
    p.windows.head = PeakWindow::new(2, 2);
    assert!(p.validate().is_err());
  }

  #[test]
  fn test_validate_window_reaching_center() {
    let mut p = HeadShouldersParams::default();
    p.windows.left_shoulder = PeakWindow::new(-12, -1);
    assert!(p.validate().is_err());

    let mut p = HeadShouldersParams::default();
    p.windows.right_shoulder = PeakWindow::new(3, 12);
    p.windows.peak_search_radius = 3;
    assert!(p.validate().is_err());

    let mut p = HeadShouldersParams::default();
    p.windows.peak_search_radius = 0;
    p.windows.left_shoulder = PeakWindow::new(-12, 0);
    assert!(p.validate().is_ok());
  }

  #[test]
  fn test_validate_confidence_bounds() {
    let mut p = HeadShouldersParams::default();
    p.confidence.max = 50;
    assert!(p.validate().is_err());
  }

  #[test]
  fn test_window_around() {
    let w = PeakWindow::new(-12, -6);
    assert_eq!(w.around(15), (3, 9));
    assert_eq!(w.around(4), (-8, -2));
    assert_eq!(PeakWindow::new(-1, isize::MAX).around(10).1, isize::MAX);
  }

  #[test]
  fn test_validate_rejects_huge_radius() {
    let p: HeadShouldersParams =
      serde_json::from_str(r#"{"windows":{"peak_search_radius":18446744073709551615}}"#).unwrap();
    assert!(matches!(
      p.validate(),
      Err(PatternError::OutOfRange { field: "peak_search_radius", .. })
    ));

    let mut p = HeadShouldersParams::default();
    p.windows.peak_search_radius = MAX_PEAK_SEARCH_RADIUS;
    p.windows.left_shoulder = PeakWindow::new(-40, -20);
    p.windows.right_shoulder = PeakWindow::new(20, 40);
    assert!(p.validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_huge_offsets() {
    let mut p = HeadShouldersParams::default();
    p.windows.right_shoulder = PeakWindow::new(6, isize::MAX);
    assert!(matches!(p.validate(), Err(PatternError::InvalidConfig(_))));

    let mut p = HeadShouldersParams::default();
    p.windows.left_shoulder = PeakWindow::new(isize::MIN, -6);
    assert!(p.validate().is_err());
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.2), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 3);
    assert!((grid[0] - 0.3).abs() < f64::EPSILON);
    assert!((grid[1] - 0.5).abs() < f64::EPSILON);
    assert!((grid[2] - 0.7).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validate_param_types() {
    let period = ParamMeta::period("p", 14.0, (10.0, 20.0, 2.0), "Test");
    assert!(period.validate(14.0).is_ok());
    assert!(period.validate(14.5).is_err());
    assert!(period.validate(22.0).is_err());

    let count = ParamMeta::count("c", 5.0, (0.0, 10.0, 1.0), "Test");
    assert!(count.validate(0.0).is_ok());
    assert!(count.validate(2.5).is_err());

    let offset = ParamMeta::offset("o", -6.0, (-8.0, -3.0, 1.0), "Test");
    assert!(offset.validate(-8.0).is_ok());
    assert!(offset.validate(-2.0).is_err());
    assert!(offset.validate(-4.5).is_err());
  }

  #[test]
  fn test_every_default_passes_its_meta() {
    for meta in HEAD_SHOULDERS_PARAMS {
      assert!(meta.validate(meta.default).is_ok(), "{} default out of range", meta.name);
    }
  }

  #[test]
  fn test_deserialize_partial_json() {
    let p: HeadShouldersParams =
      serde_json::from_str(r#"{"min_center_distance": 12, "confidence": {"volume_bonus": 0}}"#)
        .unwrap();
    assert_eq!(p.min_center_distance.get(), 12);
    assert_eq!(p.confidence.volume_bonus, 0);
    assert_eq!(p.confidence.base, 60);
    assert_eq!(p.windows, WindowParams::default());
  }

  #[test]
  fn test_deserialize_rejects_bad_ratio() {
    let res: std::result::Result<HeadShouldersParams, _> =
      serde_json::from_str(r#"{"classifier": {"strong_ratio": 1.5}}"#);
    assert!(res.is_err());
  }

  #[test]
  fn test_load_toml_file() {
    let path = std::env::temp_dir().join(format!("hspd-params-{}.toml", std::process::id()));
    std::fs::write(
      &path,
      "min_center_distance = 8\n\n[windows]\npeak_search_radius = 1\n\n[confidence]\nmin = 70\n",
    )
    .unwrap();

    let p = HeadShouldersParams::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(p.min_center_distance.get(), 8);
    assert_eq!(p.windows.peak_search_radius, 1);
    assert_eq!(p.windows.head, PeakWindow::new(-3, 3));
    assert_eq!(p.confidence.min, 70);
    assert_eq!(p.confidence.max, 95);
  }

  #[test]
  fn test_load_missing_file() {
    assert!(HeadShouldersParams::load("/nonexistent/hspd-params.toml").is_err());
  }
}
