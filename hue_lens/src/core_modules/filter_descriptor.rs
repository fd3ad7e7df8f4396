// THEORY:
// Correcting every pixel of every video frame in software is too slow for a live
// surface. A `FilterDescriptor` is the declarative alternative: it describes the
// whole-surface effect (one color matrix) and lets the rendering collaborator apply
// it with whatever it has, typically an SVG `feColorMatrix` referenced from a CSS
// `filter`.
//
// The descriptor carries the same matrix `CvdEngine::correction_matrix` derives, and
// the SVG filter is declared with `color-interpolation-filters="sRGB"` so the
// surface runs the math on gamma-encoded channels exactly like the per-pixel path.
// Sampling a displayed pixel and correcting a raw sample then agree within rounding.

use crate::core_modules::D1::pixel::pixel::RgbColor;
use crate::core_modules::color_matrix::ColorMatrix;
use crate::core_modules::cvd_engine::CvdEngine;
use crate::core_modules::deficiency::Deficiency;
use crate::core_modules::mode_state::ModeState;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterDescriptor {
    /// No surface effect.
    None,
    /// A surface-wide color matrix for one deficiency type.
    ColorMatrix {
        deficiency: Deficiency,
        matrix: ColorMatrix,
    },
}

impl FilterDescriptor {
    pub fn for_mode(engine: &CvdEngine, mode: &ModeState) -> Self {
        match mode.active_deficiency() {
            None => FilterDescriptor::None,
            Some(deficiency) => Self::for_deficiency(engine, deficiency),
        }
    }

    pub fn for_deficiency(engine: &CvdEngine, deficiency: Deficiency) -> Self {
        if deficiency == Deficiency::Normal {
            return FilterDescriptor::None;
        }
        FilterDescriptor::ColorMatrix {
            deficiency,
            matrix: engine.correction_matrix(deficiency),
        }
    }

    /// Element id of the SVG filter, e.g. `protan-filter`.
    pub fn filter_id(&self) -> Option<String> {
        match self {
            FilterDescriptor::None => None,
            FilterDescriptor::ColorMatrix { deficiency, .. } => {
                Some(format!("{}-filter", deficiency.label()))
            }
        }
    }

    /// Value for a CSS `filter` property.
    pub fn css_value(&self) -> String {
        match self.filter_id() {
            None => "none".to_string(),
            Some(id) => format!("url(#{id})"),
        }
    }

    /// The `<filter>` element the CSS value refers to.
    pub fn svg_filter_element(&self) -> Option<String> {
        match self {
            FilterDescriptor::None => None,
            FilterDescriptor::ColorMatrix { deficiency, matrix } => Some(format!(
                "<filter id=\"{}-filter\" color-interpolation-filters=\"sRGB\"><feColorMatrix type=\"matrix\" values=\"{}\"/></filter>",
                deficiency.label(),
                matrix.to_svg_values()
            )),
        }
    }

    /// Evaluates the descriptor in software, as a surface would.
    pub fn apply(&self, color: RgbColor) -> RgbColor {
        match self {
            FilterDescriptor::None => color,
            FilterDescriptor::ColorMatrix { matrix, .. } => {
                RgbColor::from_normalized(matrix.apply(color.normalized()))
            }
        }
    }
}

/// A hidden `<svg>` holding one filter per deficiency type, ready to inline in a page.
pub fn svg_definitions(engine: &CvdEngine) -> String {
    let filters: String = Deficiency::CYCLE
        .into_iter()
        .filter_map(|deficiency| FilterDescriptor::for_deficiency(engine, deficiency).svg_filter_element())
        .collect();
    format!("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"0\" height=\"0\" style=\"position:absolute\"><defs>{filters}</defs></svg>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_and_disabled_modes_have_no_filter() {
        let engine = CvdEngine::default();
        let mut mode = ModeState::default();
        assert_eq!(FilterDescriptor::for_mode(&engine, &mode), FilterDescriptor::None);

        mode.cycle_deficiency();
        assert_ne!(FilterDescriptor::for_mode(&engine, &mode), FilterDescriptor::None);

        mode.toggle_correction();
        let descriptor = FilterDescriptor::for_mode(&engine, &mode);
        assert_eq!(descriptor.css_value(), "none");
        assert!(descriptor.svg_filter_element().is_none());
    }

    #[test]
    fn css_value_references_deficiency_filter() {
        let engine = CvdEngine::default();
        let descriptor = FilterDescriptor::for_deficiency(&engine, Deficiency::Tritanopia);
        assert_eq!(descriptor.css_value(), "url(#tritan-filter)");
        let element = descriptor.svg_filter_element().unwrap();
        assert!(element.starts_with("<filter id=\"tritan-filter\""));
        assert!(element.contains("color-interpolation-filters=\"sRGB\""));
        assert!(element.contains("feColorMatrix"));
    }

    #[test]
    fn definitions_hold_three_filters() {
        let defs = svg_definitions(&CvdEngine::default());
        assert_eq!(defs.matches("<filter ").count(), 3);
        for id in ["protan-filter", "deutan-filter", "tritan-filter"] {
            assert!(defs.contains(id));
        }
    }

    #[test]
    fn surface_agrees_with_sampled_correction() {
        let engine = CvdEngine::default();
        for deficiency in Deficiency::CYCLE {
            let descriptor = FilterDescriptor::for_deficiency(&engine, deficiency);
            for color in [
                RgbColor::new(255, 0, 0),
                RgbColor::new(12, 200, 40),
                RgbColor::new(90, 90, 250),
                RgbColor::new(128, 128, 128),
            ] {
                let surface = descriptor.apply(color);
                let sampled = engine.correct(color, deficiency, true);
                for (a, b) in surface.channels().into_iter().zip(sampled.channels()) {
                    assert!((a as i16 - b as i16).abs() <= 1, "{deficiency}: {surface} vs {sampled}");
                }
            }
        }
    }
}
