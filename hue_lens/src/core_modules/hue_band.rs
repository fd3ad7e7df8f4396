// THEORY:
// A `HueBand` maps a contiguous arc of the color wheel to one base color name. The
// band table is the chromatic half of HSL-banded naming: once a sample is known to
// be neither too dark, too light nor too gray to carry a hue, its hue angle selects
// exactly one band.
//
// The table must tile [0, 360): every angle belongs to exactly one band, with no
// gaps and no overlaps. `HueBandTable::new` proves this before a table can be used,
// which is what makes `band_for_hue` total. A band whose start is greater than its
// end wraps through 0 (red covers 350..360 and 0..10).

use crate::core_modules::D1::pixel::pixel::Ratio;
use crate::error::{HueLensError, Result};
use serde::{Deserialize, Serialize};

pub const FULL_TURN: f32 = 360.0;

/// A half-open hue interval `[start, end)` in degrees and its base label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HueBand {
    pub start: f32,
    pub end: f32,
    pub label: String,
}

impl HueBand {
    pub fn new(start: f32, end: f32, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, hue: f32) -> bool {
        if self.wraps() {
            hue >= self.start || hue < self.end
        } else {
            hue >= self.start && hue < self.end
        }
    }

    /// Exact membership for a hue in [0, 360) given as a ratio of channel values.
    pub fn contains_ratio(&self, hue: &Ratio) -> bool {
        let from_start = !hue.is_below(self.start);
        let before_end = hue.is_below(self.end);
        if self.wraps() {
            from_start || before_end
        } else {
            from_start && before_end
        }
    }

    /// The non-wrapping pieces of this band.
    fn segments(&self) -> Vec<(f32, f32)> {
        if !self.wraps() {
            return vec![(self.start, self.end)];
        }
        let mut pieces = vec![(self.start, FULL_TURN)];
        if self.end > 0.0 {
            pieces.push((0.0, self.end));
        }
        pieces
    }
}

/// A validated band table that tiles the hue circle.
#[derive(Debug, Clone, PartialEq)]
pub struct HueBandTable {
    bands: Vec<HueBand>,
}

impl HueBandTable {
    pub fn new(bands: Vec<HueBand>) -> Result<Self> {
        validate_band_table(&bands)?;
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[HueBand] {
        &self.bands
    }

    /// The unique band containing `hue`. Angles outside [0, 360) are wrapped first.
    pub fn band_for_hue(&self, hue: f32) -> &HueBand {
        let mut hue = hue.rem_euclid(FULL_TURN);
        if hue >= FULL_TURN {
            hue = 0.0;
        }
        // Only a NaN hue misses every band of a validated table.
        self.bands
            .iter()
            .find(|band| band.contains(hue))
            .unwrap_or(&self.bands[0])
    }

    /// The band containing an exact hue. Used by classification so a color whose
    /// hue is exactly a band start lands in that band.
    pub fn band_for_ratio(&self, hue: &Ratio) -> &HueBand {
        // A band narrower than the bound resolution can drop out; fall back as above.
        self.bands
            .iter()
            .find(|band| band.contains_ratio(hue))
            .unwrap_or(&self.bands[0])
    }
}

impl Default for HueBandTable {
    fn default() -> Self {
        Self {
            bands: default_hue_bands(),
        }
    }
}

/// Checks that `bands` tile [0, 360) with no gap, overlap or empty band.
pub fn validate_band_table(bands: &[HueBand]) -> Result<()> {
    if bands.is_empty() {
        return Err(HueLensError::InvalidBandTable("no bands".to_string()));
    }

    let mut segments = Vec::with_capacity(bands.len() + 1);
    for band in bands {
        let in_range = |angle: f32| angle.is_finite() && (0.0..=FULL_TURN).contains(&angle);
        if !in_range(band.start) || !in_range(band.end) || band.start >= FULL_TURN {
            return Err(HueLensError::InvalidBandTable(format!(
                "band '{}' has bounds [{}, {}) outside the hue circle",
                band.label, band.start, band.end
            )));
        }
        if band.start == band.end {
            return Err(HueLensError::InvalidBandTable(format!(
                "band '{}' is empty",
                band.label
            )));
        }
        segments.extend(band.segments().into_iter().map(|(start, end)| (start, end, &band.label)));
    }

    segments.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut cursor = 0.0f32;
    for (start, end, label) in segments {
        if start > cursor {
            return Err(HueLensError::InvalidBandTable(format!(
                "gap between {cursor} and {start}"
            )));
        }
        if start < cursor {
            return Err(HueLensError::InvalidBandTable(format!(
                "band '{label}' overlaps at {start}"
            )));
        }
        cursor = end;
    }
    if cursor != FULL_TURN {
        return Err(HueLensError::InvalidBandTable(format!(
            "gap between {cursor} and {FULL_TURN}"
        )));
    }
    Ok(())
}

pub fn default_hue_bands() -> Vec<HueBand> {
    vec![
        HueBand::new(350.0, 10.0, "red"),
        HueBand::new(10.0, 25.0, "vermillion"),
        HueBand::new(25.0, 45.0, "orange"),
        HueBand::new(45.0, 60.0, "yellow"),
        HueBand::new(60.0, 85.0, "yellow-green"),
        HueBand::new(85.0, 150.0, "green"),
        HueBand::new(150.0, 190.0, "teal"),
        HueBand::new(190.0, 210.0, "cyan"),
        HueBand::new(210.0, 250.0, "blue"),
        HueBand::new(250.0, 270.0, "navy"),
        HueBand::new(270.0, 300.0, "blue-violet"),
        HueBand::new(300.0, 330.0, "purple"),
        HueBand::new(330.0, 350.0, "pink"),
    ]
}
