// THEORY:
// The `pipeline` module is the top-level API for the color engine. It composes the
// two independent core components (the classifier and the correction engine) with
// the explicit mode state, and gives the surrounding application one object to
// drive from its UI and render loop.
//
// The contract it protects is "what you tap is what you named":
// - `render` produces a corrected copy for display and never touches the source.
// - `sample` names the color of the *source* frame at the tapped point, and reports
//   alongside it what the corrected surface shows there.
// - `surface_filter` is the declarative equivalent of `render` for live surfaces,
//   numerically consistent with it at every sample point.

use crate::config::HueLensConfig;
use crate::core_modules::D1::pixel::pixel::{RawChannel, RgbColor};
use crate::core_modules::classifier::{Classifier, ColorClassifier, ColorName};
use crate::core_modules::cvd_engine::CvdEngine;
use crate::core_modules::deficiency::Deficiency;
use crate::core_modules::filter_descriptor::FilterDescriptor;
use crate::core_modules::frame::Frame;
use crate::core_modules::mode_state::ModeState;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

const DEFAULT_ROWS_PER_BAND: u32 = 32;

/// Configuration for frame processing, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker tasks for parallel frame correction. `None` uses one per CPU.
    pub worker_count: Option<usize>,
    /// Frame rows handed to a worker at a time.
    pub rows_per_band: u32,
    /// Radius of the square pooled around a tap. 0 samples a single pixel.
    pub sample_radius: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            rows_per_band: DEFAULT_ROWS_PER_BAND,
            sample_radius: 0,
        }
    }
}

impl PipelineConfig {
    pub fn resolved_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// The result of a sample request.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReport {
    /// Source pixel coordinates.
    pub x: u32,
    pub y: u32,
    /// The untransformed source color the name was computed from.
    pub color: RgbColor,
    pub name: ColorName,
    /// What the corrected surface shows for `color` under the current mode.
    pub displayed: RgbColor,
}

/// The main, top-level struct for the color engine.
pub struct ColorPipeline {
    classifier: Classifier,
    engine: Arc<CvdEngine>,
    mode: ModeState,
    config: PipelineConfig,
}

impl ColorPipeline {
    pub fn new(config: HueLensConfig) -> Result<Self> {
        let classifier = Classifier::from_config(&config.classifier)?;
        let engine = CvdEngine::new(config.correction)?;
        info!(
            strategy = ?classifier.strategy(),
            workers = config.pipeline.resolved_worker_count(),
            "color pipeline ready"
        );
        Ok(Self {
            classifier,
            engine: Arc::new(engine),
            mode: ModeState::default(),
            config: config.pipeline,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<CvdEngine> {
        &self.engine
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn mode(&self) -> ModeState {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ModeState) {
        debug!(deficiency = %mode.deficiency, enabled = mode.enabled, "mode set");
        self.mode = mode;
    }

    pub fn cycle_deficiency(&mut self) -> Deficiency {
        self.mode.cycle_deficiency()
    }

    pub fn toggle_correction(&mut self) -> bool {
        self.mode.toggle_correction()
    }

    pub fn classify(&self, color: RgbColor) -> ColorName {
        self.classifier.classify(color)
    }

    /// Corrects one color under the current mode.
    pub fn correct(&self, color: RgbColor) -> RgbColor {
        self.engine.correct(color, self.mode.deficiency, self.mode.enabled)
    }

    /// Names raw channel readings, or logs and skips them when they are invalid.
    pub fn name_sample(&self, channels: [RawChannel; 3]) -> Option<ColorName> {
        match self.classifier.classify_channels(channels) {
            Ok(name) => Some(name),
            Err(error) => {
                warn!(%error, "sample skipped, no classification available");
                None
            }
        }
    }

    /// Corrected copy of `source` for display. Alpha is preserved.
    pub fn render(&self, source: &Frame) -> Frame {
        let mut output = source.clone();
        self.engine
            .correct_rgba_in_place(output.data_mut(), self.mode.deficiency, self.mode.enabled);
        debug!(
            width = source.width(),
            height = source.height(),
            deficiency = %self.mode.deficiency,
            enabled = self.mode.enabled,
            "frame rendered"
        );
        output
    }

    /// Declarative whole-surface equivalent of `render`.
    pub fn surface_filter(&self) -> FilterDescriptor {
        FilterDescriptor::for_mode(&self.engine, &self.mode)
    }

    /// Names the source color at `(x, y)`.
    pub fn sample(&self, source: &Frame, x: u32, y: u32) -> Result<SampleReport> {
        let color = if self.config.sample_radius > 0 {
            source.sample_average(x, y, self.config.sample_radius)?
        } else {
            source.sample(x, y)?
        };
        let report = SampleReport {
            x,
            y,
            color,
            name: self.classify(color),
            displayed: self.correct(color),
        };
        trace!(x, y, color = %report.color, name = %report.name, "sampled");
        Ok(report)
    }

    /// Names the source color under a tap on a surface displayed at another size.
    pub fn sample_scaled(
        &self,
        source: &Frame,
        display_x: f64,
        display_y: f64,
        display_width: f64,
        display_height: f64,
    ) -> Result<SampleReport> {
        let (x, y) = source.map_display_point(display_x, display_y, display_width, display_height)?;
        self.sample(source, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::classifier::ClassifierStrategy;
    use crate::error::HueLensError;

    fn pipeline() -> ColorPipeline {
        ColorPipeline::new(HueLensConfig::default()).unwrap()
    }

    fn two_tone() -> Frame {
        let mut data = Vec::new();
        data.extend_from_slice(&[255, 0, 0, 255]);
        data.extend_from_slice(&[0, 128, 0, 90]);
        Frame::new(2, 1, data).unwrap()
    }

    #[test]
    fn sample_names_source_even_when_correcting() {
        let mut pipeline = pipeline();
        pipeline.set_mode(ModeState::new(Deficiency::Protanopia, true));
        let source = two_tone();
        let report = pipeline.sample(&source, 0, 0).unwrap();
        assert_eq!(report.color, RgbColor::new(255, 0, 0));
        assert_eq!(report.name, "red");
        assert_eq!(report.displayed, RgbColor::new(255, 77, 77));
    }

    #[test]
    fn rendered_frame_matches_displayed_sample() {
        let mut pipeline = pipeline();
        let source = two_tone();
        for _ in 0..4 {
            let rendered = pipeline.render(&source);
            for x in 0..2 {
                let report = pipeline.sample(&source, x, 0).unwrap();
                assert_eq!(rendered.sample(x, 0).unwrap(), report.displayed);
            }
            // Alpha untouched.
            assert_eq!(rendered.pixel(1, 0).unwrap()[3], 90);
            pipeline.cycle_deficiency();
        }
    }

    #[test]
    fn render_never_modifies_source() {
        let mut pipeline = pipeline();
        pipeline.set_mode(ModeState::new(Deficiency::Tritanopia, true));
        let source = two_tone();
        let before = source.clone();
        let _ = pipeline.render(&source);
        assert_eq!(source, before);
    }

    #[test]
    fn disabled_mode_renders_identity_and_no_filter() {
        let mut pipeline = pipeline();
        pipeline.set_mode(ModeState::new(Deficiency::Deuteranopia, false));
        let source = two_tone();
        assert_eq!(pipeline.render(&source), source);
        assert_eq!(pipeline.surface_filter(), FilterDescriptor::None);
        pipeline.toggle_correction();
        assert_eq!(pipeline.surface_filter().css_value(), "url(#deutan-filter)");
    }

    #[test]
    fn invalid_samples_are_skipped() {
        let pipeline = pipeline();
        assert_eq!(pipeline.name_sample([f64::NAN, 0.0, 0.0]), None);
        assert_eq!(pipeline.name_sample([0.0, -3.0, 0.0]), None);
        assert_eq!(pipeline.name_sample([10.0, 10.0, 10.0]).unwrap(), "black");
    }

    #[test]
    fn scaled_taps_and_out_of_bounds() {
        let pipeline = pipeline();
        let source = two_tone();
        let report = pipeline.sample_scaled(&source, 150.0, 20.0, 200.0, 100.0).unwrap();
        assert_eq!((report.x, report.y), (1, 0));
        assert_eq!(report.name, "green");
        assert!(matches!(
            pipeline.sample(&source, 2, 0),
            Err(HueLensError::SampleOutOfBounds { .. })
        ));
    }

    #[test]
    fn configured_strategy_is_used() {
        let mut config = HueLensConfig::default();
        config.classifier.strategy = ClassifierStrategy::NearestPalette;
        let pipeline = ColorPipeline::new(config).unwrap();
        assert_eq!(pipeline.classify(RgbColor::new(165, 42, 42)), "brown");
    }

    #[test]
    fn pooled_sampling_averages_neighbours() {
        let mut config = HueLensConfig::default();
        config.pipeline.sample_radius = 1;
        let pipeline = ColorPipeline::new(config).unwrap();
        let report = pipeline.sample(&two_tone(), 0, 0).unwrap();
        assert_eq!(report.color, RgbColor::new(128, 64, 0));
    }

    #[test]
    fn worker_count_falls_back_to_cpus() {
        let config = PipelineConfig::default();
        assert!(config.resolved_worker_count() >= 1);
        let pinned = PipelineConfig {
            worker_count: Some(0),
            ..PipelineConfig::default()
        };
        assert_eq!(pinned.resolved_worker_count(), 1);
    }
}
