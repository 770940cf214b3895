//! Application configuration, loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid configuration:
//!
//! ```json
//! {
//!   "simulation": { "particle_count": 500, "seed": 7 },
//!   "layer": { "dot_radius": 1.0 },
//!   "fill_style": "rgba(255,255,255,0.8)",
//!   "min_zoom": 0,
//!   "max_zoom": 18,
//!   "cluster_cell_px": 80.0
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use tf_core::{CoreError, LayerConfig, SimConfig, Zoom};
use tf_render::FillStyle;

use crate::FlowResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub simulation: SimConfig,
    pub layer:      LayerConfig,

    /// CSS colour of the particle dots.
    pub fill_style: String,

    /// Zoom range the cluster index covers.
    pub min_zoom: Zoom,
    pub max_zoom: Zoom,

    /// Grid cell size, in world pixels, used when clustering relays.
    pub cluster_cell_px: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            simulation:      SimConfig::default(),
            layer:           LayerConfig::default(),
            fill_style:      FillStyle::default().to_string(),
            min_zoom:        Zoom::MIN,
            max_zoom:        Zoom::MAX,
            cluster_cell_px: 80.0,
        }
    }
}

impl FlowConfig {
    pub fn from_json_str(json: &str) -> FlowResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> FlowResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every section.
    pub fn validate(&self) -> FlowResult<()> {
        self.simulation.validate()?;
        if !(self.layer.dot_radius.is_finite() && self.layer.dot_radius >= 0.0) {
            return Err(CoreError::Config(format!(
                "layer.dot_radius must be finite and >= 0, got {}",
                self.layer.dot_radius
            ))
            .into());
        }
        if self.min_zoom > self.max_zoom {
            return Err(CoreError::Config(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            ))
            .into());
        }
        if !(self.cluster_cell_px.is_finite() && self.cluster_cell_px > 0.0) {
            return Err(CoreError::Config(format!(
                "cluster_cell_px must be finite and > 0, got {}",
                self.cluster_cell_px
            ))
            .into());
        }
        self.style()?;
        Ok(())
    }

    /// The parsed fill style.
    pub fn style(&self) -> FlowResult<FillStyle> {
        Ok(self.fill_style.parse()?)
    }
}
