// THEORY (1D Pixel Color):
// The `pixel` module is the most fundamental unit of the color system. It holds a
// single sampled RGB value and the single-pixel heuristics computed from it alone,
// with no knowledge of neighbors in space or time. Both core components consume
// this type and nothing else: the classifier names an `RgbColor`, the correction
// engine transforms one.
//
// What lives here:
// - `RgbColor`: three 8-bit channels. The type makes an out-of-range channel
//   unrepresentable; untrusted samples enter through `RgbColor::from_channels`,
//   which is the single place `InvalidColorValue` is raised.
// - Normalized channels (0..1 sRGB): divide by 255.0, still gamma-encoded. All
//   correction math runs in this range and is denormalized exactly once, with a
//   clamp, on the way out.
// - `ExactHsl`: hue/saturation/lightness derived on demand with the standard
//   min/max-channel formula, kept as exact integer ratios. Classification decides
//   band and threshold membership on these, never on rounded floats.
// - `HslColor`: the same values as `f32`, for display and diagnostics.
//
// Key principles:
// 1) Single-pixel scope (1D): nothing here reads neighbors or history.
// 2) Validation at the boundary: raw samples are checked once, then trusted.
// 3) Clamping only on output: input that is out of range is an error, never clamped.

pub mod pixel {
    use crate::error::{HueLensError, Result};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    pub type Channel = u8;
    pub type RawChannel = f64;
    pub type NormalizedChannel = f32;
    pub type Hue = f32;
    pub type SaturationHSL = f32;
    pub type LightnessHSL = f32;

    const CHANNEL_MAX: RawChannel = 255.0;
    const CHANNEL_NAMES: [&str; 3] = ["red", "green", "blue"];

    /// An immutable sampled color with three 8-bit channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(from = "[Channel; 3]", into = "[Channel; 3]")]
    pub struct RgbColor {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl RgbColor {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            RgbColor { red, green, blue }
        }

        /// Builds a color from unvalidated channel readings.
        ///
        /// - Each channel must be finite and lie in [0, 255]; anything else is an
        ///   `InvalidColorValue`. Input is never clamped.
        /// - Fractional readings (e.g. from an averaging sampler) round to nearest.
        pub fn from_channels(channels: [RawChannel; 3]) -> Result<Self> {
            let mut bytes = [0 as Channel; 3];
            for (index, value) in channels.into_iter().enumerate() {
                if !value.is_finite() || !(0.0..=CHANNEL_MAX).contains(&value) {
                    return Err(HueLensError::InvalidColorValue {
                        channel: CHANNEL_NAMES[index],
                        value,
                    });
                }
                bytes[index] = value.round() as Channel;
            }
            Ok(RgbColor::new(bytes[0], bytes[1], bytes[2]))
        }

        /// Channels scaled to 0..1, still gamma-encoded.
        pub fn normalized(&self) -> [NormalizedChannel; 3] {
            [
                self.red as NormalizedChannel / 255.0,
                self.green as NormalizedChannel / 255.0,
                self.blue as NormalizedChannel / 255.0,
            ]
        }

        /// Denormalizes 0..1 channels, clamping each into range first.
        /// A NaN channel (never produced by the engine) collapses to 0.
        pub fn from_normalized(channels: [NormalizedChannel; 3]) -> Self {
            let to_byte = |value: NormalizedChannel| -> Channel {
                let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
                (clamped * 255.0).round() as Channel
            };
            RgbColor::new(to_byte(channels[0]), to_byte(channels[1]), to_byte(channels[2]))
        }

        /// Channels as an array in R, G, B order.
        pub fn channels(&self) -> [Channel; 3] {
            [self.red, self.green, self.blue]
        }

        /// Squared Euclidean distance in RGB space.
        /// Monotone with the true distance, so it orders candidates identically.
        pub fn distance_squared(&self, other: &RgbColor) -> u32 {
            let dr = self.red as i32 - other.red as i32;
            let dg = self.green as i32 - other.green as i32;
            let db = self.blue as i32 - other.blue as i32;
            (dr * dr + dg * dg + db * db) as u32
        }

        /// Euclidean distance in RGB space.
        pub fn distance(&self, other: &RgbColor) -> f64 {
            (self.distance_squared(other) as f64).sqrt()
        }

        pub fn hsl(&self) -> HslColor {
            HslColor::from(*self)
        }

        pub fn exact_hsl(&self) -> ExactHsl {
            ExactHsl::from(*self)
        }
    }

    impl TryFrom<[i32; 3]> for RgbColor {
        type Error = HueLensError;

        fn try_from(channels: [i32; 3]) -> Result<Self> {
            RgbColor::from_channels(channels.map(|value| value as RawChannel))
        }
    }

    impl From<[Channel; 3]> for RgbColor {
        fn from(channels: [Channel; 3]) -> Self {
            RgbColor::new(channels[0], channels[1], channels[2])
        }
    }

    impl From<RgbColor> for [Channel; 3] {
        fn from(color: RgbColor) -> Self {
            color.channels()
        }
    }

    impl fmt::Display for RgbColor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }
    }

    /// Hue, saturation and lightness derived from an `RgbColor`.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct HslColor {
        /// Angle on the color wheel in degrees [0, 360). 0 for achromatic input.
        pub hue: Hue,
        /// HSL saturation in [0, 1]. 0 when max == min.
        pub saturation: SaturationHSL,
        /// HSL lightness in [0, 1]: midpoint of the max and min channels.
        pub lightness: LightnessHSL,
    }

    /// Scale at which decimal bounds (hue degrees, lightness and saturation cut-offs)
    /// are resolved before an exact comparison: 1/10_000.
    pub const BOUND_SCALE: i64 = 10_000;

    /// Resolves a configured decimal bound to an integer count of `1 / BOUND_SCALE`.
    pub fn scaled_bound(bound: f32) -> i64 {
        (bound as f64 * BOUND_SCALE as f64).round() as i64
    }

    /// A non-negative ratio of integers with a positive denominator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Ratio {
        pub numerator: i64,
        pub denominator: i64,
    }

    impl Ratio {
        pub const ZERO: Ratio = Ratio {
            numerator: 0,
            denominator: 1,
        };

        /// Exact comparison against a decimal bound.
        pub fn cmp_bound(&self, bound: f32) -> std::cmp::Ordering {
            let lhs = self.numerator as i128 * BOUND_SCALE as i128;
            lhs.cmp(&(scaled_bound(bound) as i128 * self.denominator as i128))
        }

        pub fn is_below(&self, bound: f32) -> bool {
            self.cmp_bound(bound).is_lt()
        }

        pub fn is_above(&self, bound: f32) -> bool {
            self.cmp_bound(bound).is_gt()
        }

        pub fn to_f32(self) -> f32 {
            (self.numerator as f64 / self.denominator as f64) as f32
        }
    }

    /// HSL as exact ratios of the integer channels. Band and threshold membership is
    /// decided on these, so a color sitting exactly on a boundary lands on the
    /// side the boundary belongs to.
    ///
    /// With `max`, `min` in 0..=255 and `c = max - min`:
    /// - lightness  = (max + min) / 510
    /// - saturation = c / min(max + min, 510 - max - min)
    /// - hue        = 60 * (d + offset * c) / c, wrapped into [0, 360)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExactHsl {
        pub hue: Ratio,
        pub saturation: Ratio,
        pub lightness: Ratio,
    }

    impl From<RgbColor> for ExactHsl {
        fn from(color: RgbColor) -> Self {
            let (red, green, blue) = (color.red as i64, color.green as i64, color.blue as i64);
            let maximum_channel = red.max(green.max(blue));
            let minimum_channel = red.min(green.min(blue));
            let chroma = maximum_channel - minimum_channel;
            let channel_sum = maximum_channel + minimum_channel;
            let lightness = Ratio {
                numerator: channel_sum,
                denominator: 2 * Channel::MAX as i64,
            };

            if chroma == 0 {
                return ExactHsl {
                    hue: Ratio::ZERO,
                    saturation: Ratio::ZERO,
                    lightness,
                };
            }

            // Non-zero chroma keeps both sums away from 0 and 510.
            let saturation = Ratio {
                numerator: chroma,
                denominator: channel_sum.min(2 * Channel::MAX as i64 - channel_sum),
            };

            let (base_difference, sector_offset) = if maximum_channel == red {
                (green - blue, 0)
            } else if maximum_channel == green {
                (blue - red, 2)
            } else {
                (red - green, 4)
            };

            let mut hue_numerator = 60 * (base_difference + sector_offset * chroma);
            if hue_numerator < 0 {
                hue_numerator += 360 * chroma;
            }
            if hue_numerator >= 360 * chroma {
                hue_numerator -= 360 * chroma;
            }

            ExactHsl {
                hue: Ratio {
                    numerator: hue_numerator,
                    denominator: chroma,
                },
                saturation,
                lightness,
            }
        }
    }

    impl From<ExactHsl> for HslColor {
        fn from(exact: ExactHsl) -> Self {
            HslColor {
                hue: exact.hue.to_f32(),
                saturation: exact.saturation.to_f32(),
                lightness: exact.lightness.to_f32(),
            }
        }
    }

    impl From<RgbColor> for HslColor {
        fn from(color: RgbColor) -> Self {
            HslColor::from(ExactHsl::from(color))
        }
    }
}


// -----------------------------------------------------------------------------
// Glossary: Single-Pixel Color Terms (1D)
//
// - Normalized Channel (sRGB): Channel scaled to 0..1 but still gamma-encoded.
//
// - Hue: Angle on the color wheel (0°–360°) describing the color family. Undefined
//   for grays; reported as 0 there.
//
// - Lightness (HSL): Midpoint of the maximum and minimum channels.
//
// - Chroma: max(R,G,B) − min(R,G,B). Zero means perfectly gray.
//
// - Saturation (HSL): Chroma divided by (1 − |2L − 1|).
