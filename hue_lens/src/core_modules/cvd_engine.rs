// THEORY:
// The `CvdEngine` is the correction half of the core. Given a color and a
// deficiency it can either show how that color is perceived by the deficient
// viewer (simulation) or shift the information the viewer loses into channels
// they can still see (Daltonization).
//
// Daltonization, per pixel, in normalized [0,1] space:
// 1.  Normal type or correction disabled: return the input untouched.
// 2.  `sim = S · v`, where S is the deficiency's simulation matrix. S only mixes
//     the (r,g) pair for protan and deutan and the (g,b) pair for tritan; the third
//     channel passes through. Each row of S sums to 1, so grays map to themselves.
// 3.  `err = v - sim`, the information the viewer cannot see.
// 4.  `out = v + E · err`, where E is the redistribution matrix. The row of E for
//     the deficient channel is zero: that channel is never corrected from its own
//     loss, and zero error leaves the color unchanged.
// 5.  Clamp to [0,1] and denormalize. This is the only clamp in the pipeline.
//
// Steps 2–4 are linear, so they collapse into the single matrix `I + E·(I - S)`
// (`correction_matrix`). A rendering surface applies that matrix as a
// declarative filter; sampled pixels go through `correct`. Both agree at every
// point up to float rounding.
//
// The coefficients are configuration, not derived constants. `CorrectionTable`
// ships the widely published simulation weights and a 0.7 redistribution weight,
// and `validate` enforces the two invariants above on any table loaded at runtime.

use crate::core_modules::D1::pixel::pixel::RgbColor;
use crate::core_modules::color_matrix::{ColorMatrix, Vector3};
use crate::core_modules::deficiency::Deficiency;
use crate::error::{HueLensError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ROW_SUM_TOLERANCE: f32 = 1e-3;

/// Simulation and redistribution weights for one deficiency type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeficiencyMatrices {
    /// Maps a color to its appearance for the deficient viewer.
    pub simulation: ColorMatrix,
    /// Maps the simulation error onto the channels the viewer can still use.
    pub redistribution: ColorMatrix,
}

/// The tunable coefficient table for every deficiency type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionTable {
    pub protanopia: DeficiencyMatrices,
    pub deuteranopia: DeficiencyMatrices,
    pub tritanopia: DeficiencyMatrices,
}

impl Default for CorrectionTable {
    fn default() -> Self {
        Self {
            protanopia: DeficiencyMatrices {
                simulation: ColorMatrix::new([
                    [0.567, 0.433, 0.0],
                    [0.558, 0.442, 0.0],
                    [0.0, 0.0, 1.0],
                ]),
                redistribution: ColorMatrix::new([
                    [0.0, 0.0, 0.0],
                    [0.7, 0.0, 0.0],
                    [0.7, 0.0, 0.0],
                ]),
            },
            deuteranopia: DeficiencyMatrices {
                simulation: ColorMatrix::new([
                    [0.625, 0.375, 0.0],
                    [0.7, 0.3, 0.0],
                    [0.0, 0.0, 1.0],
                ]),
                redistribution: ColorMatrix::new([
                    [0.0, 0.7, 0.0],
                    [0.0, 0.0, 0.0],
                    [0.0, 0.7, 0.0],
                ]),
            },
            tritanopia: DeficiencyMatrices {
                simulation: ColorMatrix::new([
                    [1.0, 0.0, 0.0],
                    [0.0, 0.433, 0.567],
                    [0.0, 0.475, 0.525],
                ]),
                redistribution: ColorMatrix::new([
                    [0.0, 0.0, 0.7],
                    [0.0, 0.0, 0.7],
                    [0.0, 0.0, 0.0],
                ]),
            },
        }
    }
}

impl CorrectionTable {
    /// `None` for `Deficiency::Normal`, which has nothing to correct.
    pub fn matrices(&self, deficiency: Deficiency) -> Option<&DeficiencyMatrices> {
        match deficiency {
            Deficiency::Normal => None,
            Deficiency::Protanopia => Some(&self.protanopia),
            Deficiency::Deuteranopia => Some(&self.deuteranopia),
            Deficiency::Tritanopia => Some(&self.tritanopia),
        }
    }

    /// Rejects tables that would tint grays, touch the channel outside the simulated
    /// pair, or let a channel correct itself.
    pub fn validate(&self) -> Result<()> {
        for deficiency in Deficiency::CYCLE {
            let (Some(matrices), Some(channel)) =
                (self.matrices(deficiency), deficiency.deficient_channel())
            else {
                continue;
            };

            let all_finite = matrices
                .simulation
                .m
                .iter()
                .chain(matrices.redistribution.m.iter())
                .flatten()
                .all(|v| v.is_finite());
            if !all_finite {
                return Err(HueLensError::InvalidCorrectionTable(format!(
                    "{deficiency} has a non-finite coefficient"
                )));
            }

            for (row, sum) in matrices.simulation.row_sums().into_iter().enumerate() {
                if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                    return Err(HueLensError::InvalidCorrectionTable(format!(
                        "{deficiency} simulation row {row} sums to {sum}, grays would shift"
                    )));
                }
            }

            if let Some(outside) = deficiency.unaffected_channel() {
                let k = outside.index();
                let passes_through = (0..3).all(|i| {
                    let expected = if i == k { 1.0 } else { 0.0 };
                    matrices.simulation.m[k][i] == expected && matrices.simulation.m[i][k] == expected
                });
                if !passes_through {
                    return Err(HueLensError::InvalidCorrectionTable(format!(
                        "{deficiency} simulation touches channel {outside:?} outside its pair"
                    )));
                }
            }

            if matrices.redistribution.row(channel.index()) != [0.0; 3] {
                return Err(HueLensError::InvalidCorrectionTable(format!(
                    "{deficiency} redistribution feeds its own deficient channel {channel:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Pure per-pixel simulation and Daltonization over a validated table.
#[derive(Debug, Clone, Default)]
pub struct CvdEngine {
    table: CorrectionTable,
}

impl CvdEngine {
    pub fn new(table: CorrectionTable) -> Result<Self> {
        table.validate()?;
        debug!("correction table validated");
        Ok(Self { table })
    }

    pub fn table(&self) -> &CorrectionTable {
        &self.table
    }

    /// How `color` appears to a viewer with `deficiency`.
    pub fn simulate(&self, color: RgbColor, deficiency: Deficiency) -> RgbColor {
        match self.table.matrices(deficiency) {
            None => color,
            Some(matrices) => RgbColor::from_normalized(matrices.simulation.apply(color.normalized())),
        }
    }

    /// Daltonizes `color`. Identity when `enabled` is false or the type is Normal.
    pub fn correct(&self, color: RgbColor, deficiency: Deficiency, enabled: bool) -> RgbColor {
        if !enabled {
            return color;
        }
        match self.table.matrices(deficiency) {
            None => color,
            Some(matrices) => RgbColor::from_normalized(Self::daltonize(matrices, color.normalized())),
        }
    }

    fn daltonize(matrices: &DeficiencyMatrices, original: Vector3) -> Vector3 {
        let simulated = matrices.simulation.apply(original);
        let error = [
            original[0] - simulated[0],
            original[1] - simulated[1],
            original[2] - simulated[2],
        ];
        let shift = matrices.redistribution.apply(error);
        [
            original[0] + shift[0],
            original[1] + shift[1],
            original[2] + shift[2],
        ]
    }

    /// The single linear map `I + E·(I - S)` equivalent to `correct` before clamping.
    pub fn correction_matrix(&self, deficiency: Deficiency) -> ColorMatrix {
        match self.table.matrices(deficiency) {
            None => ColorMatrix::IDENTITY,
            Some(matrices) => {
                let lost = ColorMatrix::IDENTITY.subtract(&matrices.simulation);
                ColorMatrix::IDENTITY.add(&matrices.redistribution.multiply(&lost))
            }
        }
    }

    /// Corrects a packed RGBA8 buffer in place. Alpha and any trailing partial
    /// pixel are left untouched.
    pub fn correct_rgba_in_place(&self, data: &mut [u8], deficiency: Deficiency, enabled: bool) {
        if !enabled || deficiency == Deficiency::Normal {
            return;
        }
        for pixel in data.chunks_exact_mut(4) {
            let corrected = self.correct(RgbColor::new(pixel[0], pixel[1], pixel[2]), deficiency, true);
            pixel[0] = corrected.red;
            pixel[1] = corrected.green;
            pixel[2] = corrected.blue;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TYPES: [Deficiency; 3] = [
        Deficiency::Protanopia,
        Deficiency::Deuteranopia,
        Deficiency::Tritanopia,
    ];

    fn deficiency_strategy() -> impl Strategy<Value = Deficiency> {
        prop::sample::select(Deficiency::CYCLE.to_vec())
    }

    #[test]
    fn default_table_is_valid() {
        CorrectionTable::default().validate().unwrap();
    }

    #[test]
    fn protan_red_keeps_red_and_gains_green_blue() {
        let engine = CvdEngine::default();
        let input = RgbColor::new(255, 0, 0);
        let simulated = engine.simulate(input, Deficiency::Protanopia);
        let corrected = engine.correct(input, Deficiency::Protanopia, true);

        assert_eq!(corrected.red, input.red);
        assert!(corrected.green > input.green);
        assert!(corrected.blue > input.blue);
        assert!(corrected.blue > simulated.blue);
        assert_eq!(corrected, RgbColor::new(255, 77, 77));
    }

    #[test]
    fn overflowing_channel_clamps_instead_of_wrapping() {
        // Blue would reach ~1.24 before the clamp.
        let corrected = CvdEngine::default().correct(RgbColor::new(255, 0, 255), Deficiency::Protanopia, true);
        assert_eq!(corrected, RgbColor::new(255, 77, 255));
    }

    #[test]
    fn simulation_leaves_the_channel_outside_the_pair_alone() {
        let engine = CvdEngine::default();
        let blue = RgbColor::new(0, 0, 255);
        assert_eq!(engine.simulate(blue, Deficiency::Protanopia), blue);
        assert_eq!(engine.simulate(blue, Deficiency::Deuteranopia), blue);
        let red = RgbColor::new(255, 0, 0);
        assert_eq!(engine.simulate(red, Deficiency::Tritanopia), red);
        // The pair itself is still mixed.
        assert_ne!(engine.simulate(red, Deficiency::Protanopia), red);
    }

    #[test]
    fn simulation_reaching_outside_its_pair_is_rejected() {
        let mut table = CorrectionTable::default();
        table.protanopia.simulation.m[2] = [0.0, 0.242, 0.758];
        let err = CvdEngine::new(table).unwrap_err();
        assert!(matches!(err, HueLensError::InvalidCorrectionTable(message) if message.contains("outside its pair")));

        let mut table = CorrectionTable::default();
        table.tritanopia.simulation.m[0] = [0.95, 0.05, 0.0];
        assert!(CvdEngine::new(table).is_err());
    }

    #[test]
    fn black_under_tritanopia_is_black() {
        let engine = CvdEngine::default();
        assert_eq!(
            engine.correct(RgbColor::new(0, 0, 0), Deficiency::Tritanopia, true),
            RgbColor::new(0, 0, 0)
        );
    }

    #[test]
    fn grays_have_no_error_and_pass_through() {
        let engine = CvdEngine::default();
        for value in 0..=255u8 {
            let gray = RgbColor::new(value, value, value);
            for deficiency in TYPES {
                assert_eq!(engine.simulate(gray, deficiency), gray);
                assert_eq!(engine.correct(gray, deficiency, true), gray);
            }
        }
    }

    #[test]
    fn correction_matrix_of_normal_is_identity() {
        assert_eq!(CvdEngine::default().correction_matrix(Deficiency::Normal), ColorMatrix::IDENTITY);
    }

    #[test]
    fn correction_matrix_leaves_deficient_row_as_identity() {
        let engine = CvdEngine::default();
        for deficiency in TYPES {
            let index = deficiency.deficient_channel().unwrap().index();
            let mut expected = [0.0; 3];
            expected[index] = 1.0;
            assert_eq!(engine.correction_matrix(deficiency).row(index), expected);
        }
    }

    #[test]
    fn table_with_tinting_simulation_is_rejected() {
        let mut table = CorrectionTable::default();
        table.deuteranopia.simulation.m[1] = [0.7, 0.4, 0.0];
        let err = CvdEngine::new(table).unwrap_err();
        assert!(matches!(err, HueLensError::InvalidCorrectionTable(message) if message.contains("deutan")));
    }

    #[test]
    fn table_feeding_deficient_channel_is_rejected() {
        let mut table = CorrectionTable::default();
        table.protanopia.redistribution.m[0] = [0.0, 0.7, 0.0];
        assert!(CvdEngine::new(table).is_err());

        let mut table = CorrectionTable::default();
        table.tritanopia.simulation.m[0][0] = f32::NAN;
        assert!(CvdEngine::new(table).is_err());
    }

    #[test]
    fn rgba_buffer_correction_matches_per_pixel_and_keeps_alpha() {
        let engine = CvdEngine::default();
        let mut buffer = vec![255, 0, 0, 17, 0, 255, 0, 200, 30, 60, 90, 255];
        let original = buffer.clone();
        engine.correct_rgba_in_place(&mut buffer, Deficiency::Deuteranopia, true);

        for (before, after) in original.chunks_exact(4).zip(buffer.chunks_exact(4)) {
            let expected = engine.correct(
                RgbColor::new(before[0], before[1], before[2]),
                Deficiency::Deuteranopia,
                true,
            );
            assert_eq!(&after[..3], &expected.channels());
            assert_eq!(after[3], before[3]);
        }

        let mut untouched = original.clone();
        engine.correct_rgba_in_place(&mut untouched, Deficiency::Deuteranopia, false);
        assert_eq!(untouched, original);
    }

    proptest! {
        #[test]
        fn disabled_or_normal_is_identity(r: u8, g: u8, b: u8, deficiency in deficiency_strategy()) {
            let engine = CvdEngine::default();
            let color = RgbColor::new(r, g, b);
            prop_assert_eq!(engine.correct(color, deficiency, false), color);
            prop_assert_eq!(engine.correct(color, Deficiency::Normal, true), color);
        }

        #[test]
        fn correction_is_deterministic(r: u8, g: u8, b: u8, deficiency in deficiency_strategy()) {
            let engine = CvdEngine::default();
            let color = RgbColor::new(r, g, b);
            prop_assert_eq!(engine.correct(color, deficiency, true), engine.correct(color, deficiency, true));
        }

        #[test]
        fn deficient_channel_is_never_modified(r: u8, g: u8, b: u8, deficiency in deficiency_strategy()) {
            let engine = CvdEngine::default();
            let color = RgbColor::new(r, g, b);
            let corrected = engine.correct(color, deficiency, true);
            if let Some(channel) = deficiency.deficient_channel() {
                prop_assert_eq!(corrected.channels()[channel.index()], color.channels()[channel.index()]);
            }
        }

        #[test]
        fn combined_matrix_agrees_with_per_pixel_path(r: u8, g: u8, b: u8, deficiency in deficiency_strategy()) {
            let engine = CvdEngine::default();
            let color = RgbColor::new(r, g, b);
            let per_pixel = engine.correct(color, deficiency, true);
            let surface = RgbColor::from_normalized(engine.correction_matrix(deficiency).apply(color.normalized()));
            for (a, b) in per_pixel.channels().into_iter().zip(surface.channels()) {
                prop_assert!((a as i16 - b as i16).abs() <= 1);
            }
        }
    }
}
