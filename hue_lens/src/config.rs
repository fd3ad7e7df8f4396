// THEORY:
// Every tunable table in the engine lives in one serializable configuration value:
// the classifier strategy and its reference data (palette, hue bands, thresholds),
// the Daltonization coefficients, and the frame-pipeline knobs. Defaults are the
// built-in constants, so an empty JSON object is a complete configuration and any
// field may be overridden alone.
//
// Configuration is data, not trust: `validate` runs the same checks the components
// run on construction, so a bad file is rejected at load time with a precise error.

use crate::core_modules::classifier::{ClassifierStrategy, HslThresholds};
use crate::core_modules::cvd_engine::CorrectionTable;
use crate::core_modules::hue_band::{HueBand, default_hue_bands, validate_band_table};
use crate::core_modules::palette::{NamedColorEntry, default_palette_entries};
use crate::error::{HueLensError, Result};
use crate::pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strategy: ClassifierStrategy,
    /// Reference colors for the nearest-palette strategy, in priority order.
    pub palette: Vec<NamedColorEntry>,
    /// Hue bands for the HSL-banded strategy; must tile [0, 360).
    pub bands: Vec<HueBand>,
    pub thresholds: HslThresholds,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::default(),
            palette: default_palette_entries(),
            bands: default_hue_bands(),
            thresholds: HslThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HueLensConfig {
    pub classifier: ClassifierConfig,
    pub correction: CorrectionTable,
    pub pipeline: PipelineConfig,
}

impl HueLensConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HueLensConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!(path = %path.display(), strategy = ?config.classifier.strategy, "configuration loaded");
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        match self.classifier.strategy {
            ClassifierStrategy::NearestPalette if self.classifier.palette.is_empty() => {
                return Err(HueLensError::EmptyPalette);
            }
            ClassifierStrategy::HslBanded => validate_band_table(&self.classifier.bands)?,
            _ => {}
        }
        self.correction.validate()
    }
}
