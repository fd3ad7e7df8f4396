// THEORY:
// The `classifier` module turns a sampled `RgbColor` into a human-readable name. It
// is a pure function of the color: no clock, no mode state, no history. In
// particular it never sees the correction mode; callers always hand it the
// original, untransformed sample.
//
// Two strategies implement the same `ColorClassifier` contract:
// 1.  **Nearest-Palette**: the label of the closest reference color in RGB space.
//     Coarse (only as many names as entries) but trivially predictable.
// 2.  **HSL-Banded**: achromatic checks on lightness and saturation first, then a
//     hue band for the base name, then a light/dark/muted modifier. Richer, graded
//     names at the cost of more branching. HSL is taken as exact ratios of the
//     integer channels, so colors on a band start or a cut-off are named by the
//     side the boundary belongs to.
//
// `Classifier` selects one of them from configuration, so callers hold a single
// value and never branch on the strategy themselves.

use crate::config::ClassifierConfig;
use crate::core_modules::D1::pixel::pixel::{ExactHsl, RawChannel, RgbColor};
use crate::core_modules::hue_band::HueBandTable;
use crate::core_modules::palette::Palette;
use crate::error::{HueLensError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A human-readable color name such as "red" or "dark teal".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorName(String);

impl ColorName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ColorName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Names a color. Implementations must be pure and deterministic.
pub trait ColorClassifier {
    fn classify(&self, color: RgbColor) -> ColorName;

    /// Validates raw channel readings, then classifies.
    fn classify_channels(&self, channels: [RawChannel; 3]) -> Result<ColorName> {
        Ok(self.classify(RgbColor::from_channels(channels)?))
    }
}

/// Which naming strategy a `Classifier` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    NearestPalette,
    #[default]
    HslBanded,
}

pub struct NearestPaletteClassifier {
    palette: Palette,
}

impl NearestPaletteClassifier {
    pub fn new(palette: Palette) -> Result<Self> {
        if palette.is_empty() {
            return Err(HueLensError::EmptyPalette);
        }
        Ok(Self { palette })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl Default for NearestPaletteClassifier {
    /// The built-in twelve-color palette, which is never empty.
    fn default() -> Self {
        Self {
            palette: Palette::default(),
        }
    }
}

impl ColorClassifier for NearestPaletteClassifier {
    fn classify(&self, color: RgbColor) -> ColorName {
        // Both constructors guarantee a non-empty palette; "unknown" is unreachable
        // and only keeps `classify` total without a panic path.
        self.palette
            .nearest(&color)
            .map(|entry| ColorName::new(entry.label.as_str()))
            .unwrap_or_else(|| ColorName::new("unknown"))
    }
}

/// Cut-offs for HSL-banded naming. Each check short-circuits the ones after it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HslThresholds {
    /// Lightness below this is "black".
    pub black_below: f32,
    /// Lightness above this is "white".
    pub white_above: f32,
    /// Saturation below this is "gray".
    pub gray_below: f32,
    /// Lightness above this prefixes "light".
    pub light_above: f32,
    /// Lightness below this prefixes "dark".
    pub dark_below: f32,
    /// Saturation below this prefixes "muted".
    pub muted_below: f32,
}

impl Default for HslThresholds {
    fn default() -> Self {
        Self {
            black_below: 0.12,
            white_above: 0.88,
            gray_below: 0.12,
            light_above: 0.75,
            dark_below: 0.25,
            muted_below: 0.30,
        }
    }
}

#[derive(Default)]
pub struct HslBandedClassifier {
    bands: HueBandTable,
    thresholds: HslThresholds,
}

impl HslBandedClassifier {
    pub fn new(bands: HueBandTable, thresholds: HslThresholds) -> Self {
        Self { bands, thresholds }
    }

    /// Names exact HSL ratios. Every cut-off is compared exactly, so a value sitting
    /// on a threshold is not below it.
    pub fn classify_hsl(&self, hsl: &ExactHsl) -> ColorName {
        let t = &self.thresholds;
        if hsl.lightness.is_below(t.black_below) {
            return ColorName::new("black");
        }
        if hsl.lightness.is_above(t.white_above) {
            return ColorName::new("white");
        }
        if hsl.saturation.is_below(t.gray_below) {
            return ColorName::new("gray");
        }

        let base = &self.bands.band_for_ratio(&hsl.hue).label;
        if hsl.lightness.is_above(t.light_above) {
            ColorName::new(format!("light {base}"))
        } else if hsl.lightness.is_below(t.dark_below) {
            ColorName::new(format!("dark {base}"))
        } else if hsl.saturation.is_below(t.muted_below) {
            ColorName::new(format!("muted {base}"))
        } else {
            ColorName::new(base.as_str())
        }
    }
}

impl ColorClassifier for HslBandedClassifier {
    fn classify(&self, color: RgbColor) -> ColorName {
        self.classify_hsl(&color.exact_hsl())
    }
}

/// The configured classification strategy.
pub enum Classifier {
    NearestPalette(NearestPaletteClassifier),
    HslBanded(HslBandedClassifier),
}

impl Classifier {
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(match config.strategy {
            ClassifierStrategy::NearestPalette => Classifier::NearestPalette(
                NearestPaletteClassifier::new(Palette::new(config.palette.clone()))?,
            ),
            ClassifierStrategy::HslBanded => Classifier::HslBanded(HslBandedClassifier::new(
                HueBandTable::new(config.bands.clone())?,
                config.thresholds,
            )),
        })
    }

    pub fn strategy(&self) -> ClassifierStrategy {
        match self {
            Classifier::NearestPalette(_) => ClassifierStrategy::NearestPalette,
            Classifier::HslBanded(_) => ClassifierStrategy::HslBanded,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::HslBanded(HslBandedClassifier::default())
    }
}

impl ColorClassifier for Classifier {
    fn classify(&self, color: RgbColor) -> ColorName {
        match self {
            Classifier::NearestPalette(inner) => inner.classify(color),
            Classifier::HslBanded(inner) => inner.classify(color),
        }
    }
}
