// THEORY:
// This file is the main entry point for the `hue_lens` library crate.
// It defines the public API exposed to the surrounding application (camera view,
// image viewer, CLI tester).
//
// The primary goal is to export `ColorPipeline` and its associated data structures
// (`HueLensConfig`, `SampleReport`, `ModeState`, etc.) as the high-level interface
// for color naming and color-vision-deficiency correction. The single-pixel
// building blocks under `core_modules` stay public for callers that only need one
// of the two components.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::{ClassifierConfig, HueLensConfig};
pub use core_modules::D1::pixel::pixel::{ExactHsl, HslColor, RgbColor};
pub use core_modules::classifier::{
    Classifier, ClassifierStrategy, ColorClassifier, ColorName, HslBandedClassifier,
    NearestPaletteClassifier,
};
pub use core_modules::cvd_engine::{CorrectionTable, CvdEngine};
pub use core_modules::deficiency::Deficiency;
pub use core_modules::filter_descriptor::{FilterDescriptor, svg_definitions};
pub use core_modules::frame::Frame;
pub use core_modules::mode_state::ModeState;
pub use error::{HueLensError, Result};
pub use parallel_pipeline::ParallelCorrector;
pub use pipeline::{ColorPipeline, PipelineConfig, SampleReport};
