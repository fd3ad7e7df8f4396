// THEORY:
// A `Frame` is the raw surface the core samples from and renders into: a packed
// RGBA8 buffer with its dimensions. It is the bridge between whatever acquired the
// image (camera, file, canvas) and the single-pixel core.
//
// Key architectural principles:
// 1.  **Sampling reads the source**: `sample` and friends always read the frame
//     they are given. Callers keep the untransformed source frame around and name
//     colors from it, never from a corrected copy.
// 2.  **Display mapping**: taps arrive in display coordinates of a scaled surface.
//     `sample_scaled` maps them back onto source pixels the same way for every
//     caller.
// 3.  **Noise pooling**: a single camera pixel is noisy. `sample_average` pools a
//     small square around the tap, which cancels sensor noise before naming.

use crate::core_modules::D1::pixel::pixel::{RawChannel, RgbColor};
use crate::error::{HueLensError, Result};
use image::{ImageEncoder, RgbaImage};
use std::path::Path;

pub const CHANNELS: usize = 4;

/// A packed RGBA8 image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(HueLensError::FrameSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame of one opaque color.
    pub fn filled(width: u32, height: u32, color: RgbColor) -> Self {
        let pixel = [color.red, color.green, color.blue, u8::MAX];
        let data = pixel.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    fn byte_index(&self, x: u32, y: u32) -> usize {
        ((y as usize * self.width as usize) + x as usize) * CHANNELS
    }

    fn out_of_bounds(&self, x: f64, y: f64) -> HueLensError {
        HueLensError::SampleOutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// The RGBA bytes at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = self.byte_index(x, y);
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.data[index..index + CHANNELS]);
        Some(rgba)
    }

    /// The color at `(x, y)`; alpha is ignored.
    pub fn sample(&self, x: u32, y: u32) -> Result<RgbColor> {
        self.pixel(x, y)
            .map(|[red, green, blue, _]| RgbColor::new(red, green, blue))
            .ok_or_else(|| self.out_of_bounds(x as f64, y as f64))
    }

    /// Maps a tap on a surface displayed at `display_width` x `display_height` back
    /// to the source pixel and samples it.
    pub fn sample_scaled(
        &self,
        display_x: f64,
        display_y: f64,
        display_width: f64,
        display_height: f64,
    ) -> Result<RgbColor> {
        let (x, y) = self.map_display_point(display_x, display_y, display_width, display_height)?;
        self.sample(x, y)
    }

    /// Source pixel coordinates for a point on the displayed surface.
    pub fn map_display_point(
        &self,
        display_x: f64,
        display_y: f64,
        display_width: f64,
        display_height: f64,
    ) -> Result<(u32, u32)> {
        let valid = |value: f64| value.is_finite();
        if !(valid(display_x) && valid(display_y))
            || !(display_width.is_finite() && display_width > 0.0)
            || !(display_height.is_finite() && display_height > 0.0)
        {
            return Err(self.out_of_bounds(display_x, display_y));
        }
        let x = (display_x * self.width as f64 / display_width).floor();
        let y = (display_y * self.height as f64 / display_height).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return Err(self.out_of_bounds(display_x, display_y));
        }
        Ok((x as u32, y as u32))
    }

    /// Mean color of the square of side `2 * radius + 1` centred on `(x, y)`,
    /// clipped to the frame. The centre itself must lie inside the frame.
    pub fn sample_average(&self, x: u32, y: u32, radius: u32) -> Result<RgbColor> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_bounds(x as f64, y as f64));
        }
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = x.saturating_add(radius).min(self.width - 1);
        let y1 = y.saturating_add(radius).min(self.height - 1);

        let mut sums = [0u64; 3];
        let mut count = 0u64;
        for py in y0..=y1 {
            let row_start = self.byte_index(x0, py);
            let row_end = self.byte_index(x1, py) + CHANNELS;
            for pixel in self.data[row_start..row_end].chunks_exact(CHANNELS) {
                sums[0] += pixel[0] as u64;
                sums[1] += pixel[1] as u64;
                sums[2] += pixel[2] as u64;
                count += 1;
            }
        }
        RgbColor::from_channels(sums.map(|sum| sum as RawChannel / count as RawChannel))
    }

    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        let expected = self.data.len();
        RgbaImage::from_raw(self.width, self.height, self.data).ok_or(
            HueLensError::FrameSizeMismatch {
                expected,
                actual: expected,
            },
        )
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(&self.data, self.width, self.height, image::ExtendedColorType::Rgba8)?;
        Ok(())
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

impl From<image::DynamicImage> for Frame {
    fn from(image: image::DynamicImage) -> Self {
        Frame::from(image.into_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height) as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 7, 255]);
            }
        }
        Frame::new(width, height, data).unwrap()
    }

    #[test]
    fn rejects_wrong_buffer_length() {
        let err = Frame::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, HueLensError::FrameSizeMismatch { expected: 16, actual: 15 }));
    }

    #[test]
    fn samples_by_row_major_index() {
        let frame = gradient(4, 3);
        assert_eq!(frame.sample(0, 0).unwrap(), RgbColor::new(0, 0, 7));
        assert_eq!(frame.sample(3, 2).unwrap(), RgbColor::new(30, 20, 7));
        assert_eq!(frame.pixel(1, 2), Some([10, 20, 7, 255]));
    }

    #[test]
    fn sampling_outside_is_an_error() {
        let frame = gradient(4, 3);
        assert!(matches!(frame.sample(4, 0), Err(HueLensError::SampleOutOfBounds { .. })));
        assert!(frame.sample(0, 3).is_err());
        assert!(frame.pixel(9, 9).is_none());
    }

    #[test]
    fn display_taps_scale_to_source_pixels() {
        let frame = gradient(4, 3);
        // Displayed at 2x: (5, 3) lands on source (2, 1).
        assert_eq!(frame.map_display_point(5.0, 3.0, 8.0, 6.0).unwrap(), (2, 1));
        assert_eq!(frame.sample_scaled(5.0, 3.0, 8.0, 6.0).unwrap(), RgbColor::new(20, 10, 7));
        // Displayed at half size.
        assert_eq!(frame.map_display_point(1.9, 1.4, 2.0, 1.5).unwrap(), (3, 2));
    }

    #[test]
    fn display_taps_off_surface_are_rejected() {
        let frame = gradient(4, 3);
        assert!(frame.sample_scaled(8.0, 0.0, 8.0, 6.0).is_err());
        assert!(frame.sample_scaled(-0.1, 0.0, 8.0, 6.0).is_err());
        assert!(frame.sample_scaled(f64::NAN, 0.0, 8.0, 6.0).is_err());
        assert!(frame.sample_scaled(1.0, 1.0, 0.0, 6.0).is_err());
    }

    #[test]
    fn average_pools_and_clips_at_edges() {
        let frame = gradient(4, 3);
        // Corner: pixels x 0..=1, y 0..=1 → red mean 5, green mean 5.
        assert_eq!(frame.sample_average(0, 0, 1).unwrap(), RgbColor::new(5, 5, 7));
        assert_eq!(frame.sample_average(1, 1, 0).unwrap(), frame.sample(1, 1).unwrap());
        assert!(frame.sample_average(4, 0, 1).is_err());
    }

    #[test]
    fn filled_frame_is_uniform() {
        let frame = Frame::filled(3, 2, RgbColor::new(1, 2, 3));
        assert_eq!(frame.data().len(), 24);
        assert!(frame.data().chunks_exact(4).all(|p| p == [1, 2, 3, 255]));
    }

    #[test]
    fn converts_through_image_buffers() {
        let frame = gradient(4, 3);
        let image = frame.clone().into_rgba_image().unwrap();
        assert_eq!(image.get_pixel(3, 2).0, [30, 20, 7, 255]);
        assert_eq!(Frame::from(image), frame);
    }

    #[test]
    fn saves_png() {
        let path = std::env::temp_dir().join("hue_lens_frame_save.png");
        gradient(4, 3).save_png(&path).expect("Error Saving File.");
        let reloaded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(Frame::from(reloaded), gradient(4, 3));
        let _ = std::fs::remove_file(path);
    }
}
