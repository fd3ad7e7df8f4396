// THEORY:
// The `palette` module is the reference set behind nearest-palette naming. It is a
// fixed, ordered list of labelled colors, built once and never mutated. Naming a
// sample is a linear scan for the entry closest in RGB space.
//
// Declaration order is part of the contract: when two entries are equally close,
// the one declared first wins. The scan therefore only replaces its best candidate
// on a strictly smaller distance.

use crate::core_modules::D1::pixel::pixel::RgbColor;
use serde::{Deserialize, Serialize};

/// A reference color and the label it lends to samples that land nearest to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedColorEntry {
    pub label: String,
    pub color: RgbColor,
}

impl NamedColorEntry {
    pub fn new(label: impl Into<String>, color: RgbColor) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// An immutable, ordered set of reference colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<NamedColorEntry>,
}

impl Palette {
    pub fn new(entries: Vec<NamedColorEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[NamedColorEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry closest to `color`, first declared on ties.
    /// `None` only for an empty palette.
    pub fn nearest(&self, color: &RgbColor) -> Option<&NamedColorEntry> {
        let mut best: Option<(&NamedColorEntry, u32)> = None;
        for entry in &self.entries {
            let distance = color.distance_squared(&entry.color);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((entry, distance)),
            }
        }
        best.map(|(entry, _)| entry)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(default_palette_entries())
    }
}

/// The twelve reference colors, in lookup priority order.
pub fn default_palette_entries() -> Vec<NamedColorEntry> {
    [
        ("red", RgbColor::new(255, 0, 0)),
        ("green", RgbColor::new(0, 255, 0)),
        ("blue", RgbColor::new(0, 0, 255)),
        ("yellow", RgbColor::new(255, 255, 0)),
        ("white", RgbColor::new(255, 255, 255)),
        ("black", RgbColor::new(0, 0, 0)),
        ("orange", RgbColor::new(255, 165, 0)),
        ("purple", RgbColor::new(128, 0, 128)),
        ("pink", RgbColor::new(255, 192, 203)),
        ("brown", RgbColor::new(165, 42, 42)),
        ("gray", RgbColor::new(128, 128, 128)),
        ("light blue", RgbColor::new(173, 216, 230)),
    ]
    .into_iter()
    .map(|(label, color)| NamedColorEntry::new(label, color))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_entries_name_themselves() {
        let palette = Palette::default();
        for entry in palette.entries() {
            assert_eq!(palette.nearest(&entry.color).unwrap().label, entry.label);
        }
    }

    #[test]
    fn first_declared_wins_ties() {
        let palette = Palette::new(vec![
            NamedColorEntry::new("low", RgbColor::new(0, 0, 0)),
            NamedColorEntry::new("high", RgbColor::new(20, 0, 0)),
        ]);
        // (10,0,0) is exactly 10 away from both.
        assert_eq!(palette.nearest(&RgbColor::new(10, 0, 0)).unwrap().label, "low");

        let reversed = Palette::new(palette.entries().iter().rev().cloned().collect());
        assert_eq!(reversed.nearest(&RgbColor::new(10, 0, 0)).unwrap().label, "high");
    }

    #[test]
    fn empty_palette_has_no_nearest() {
        assert!(Palette::new(Vec::new()).nearest(&RgbColor::new(1, 2, 3)).is_none());
    }

    #[test]
    fn near_misses_snap_to_reference() {
        let palette = Palette::default();
        assert_eq!(palette.nearest(&RgbColor::new(10, 10, 10)).unwrap().label, "black");
        assert_eq!(palette.nearest(&RgbColor::new(245, 245, 245)).unwrap().label, "white");
        assert_eq!(palette.nearest(&RgbColor::new(250, 160, 10)).unwrap().label, "orange");
    }

    #[test]
    fn entries_deserialize_from_channel_arrays() {
        let entry: NamedColorEntry =
            serde_json::from_str(r#"{ "label": "teal", "color": [0, 128, 128] }"#).unwrap();
        assert_eq!(entry, NamedColorEntry::new("teal", RgbColor::new(0, 128, 128)));
    }
}
