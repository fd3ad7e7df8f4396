// THEORY:
// `ModeState` is the only mutable state the core knows about: which deficiency the
// viewer has and whether correction is switched on. UI controls own the value and
// flip it through the two toggles; the correction engine receives it explicitly on
// every call. The classifier never reads it.

use crate::core_modules::deficiency::Deficiency;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeState {
    pub deficiency: Deficiency,
    pub enabled: bool,
}

impl Default for ModeState {
    /// Correction on, type Normal: nothing is altered until a type is chosen.
    fn default() -> Self {
        Self {
            deficiency: Deficiency::Normal,
            enabled: true,
        }
    }
}

impl ModeState {
    pub fn new(deficiency: Deficiency, enabled: bool) -> Self {
        Self { deficiency, enabled }
    }

    /// Advances Normal → Protanopia → Deuteranopia → Tritanopia → Normal.
    pub fn cycle_deficiency(&mut self) -> Deficiency {
        self.deficiency = self.deficiency.next();
        debug!(deficiency = %self.deficiency, "deficiency cycled");
        self.deficiency
    }

    pub fn toggle_correction(&mut self) -> bool {
        self.enabled = !self.enabled;
        debug!(enabled = self.enabled, "correction toggled");
        self.enabled
    }

    /// The deficiency to correct for, or `None` when output must be left alone.
    pub fn active_deficiency(&self) -> Option<Deficiency> {
        if self.enabled && self.deficiency != Deficiency::Normal {
            Some(self.deficiency)
        } else {
            None
        }
    }
}
