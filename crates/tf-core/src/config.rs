//! Simulation and layer configuration.
//!
//! Typically loaded from a JSON file by the application crate (see
//! `tf_flow::FlowConfig`) and passed to the simulation builder.

use crate::{CoreError, CoreResult};

/// Default particle pool size.
pub const PARTICLE_COUNT: usize = 500;

/// Particle simulation parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Size of the particle pool.  Fixed for the lifetime of a simulation.
    pub particle_count: usize,

    /// Master RNG seed.  The same seed always produces the same animation.
    pub seed: u64,

    /// Slowest particle speed, as journey progress per tick.
    pub min_speed: f64,

    /// Fastest particle speed, as journey progress per tick.
    pub max_speed: f64,

    /// Allowed deviation of the node weight sum from 1 before the simulation
    /// logs a renormalization warning.
    pub weight_tolerance: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count:   PARTICLE_COUNT,
            seed:             0,
            min_speed:        0.004,
            max_speed:        0.012,
            weight_tolerance: 1e-3,
        }
    }
}

impl SimConfig {
    /// Check the numeric parameters (node data is validated separately).
    pub fn validate(&self) -> CoreResult<()> {
        if self.particle_count == 0 {
            return Err(CoreError::Config("particle_count must be > 0".into()));
        }
        if !(self.min_speed.is_finite() && self.min_speed > 0.0) {
            return Err(CoreError::Config(format!(
                "min_speed must be finite and > 0, got {}",
                self.min_speed
            )));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= self.min_speed) {
            return Err(CoreError::Config(format!(
                "max_speed must be finite and >= min_speed ({}), got {}",
                self.min_speed, self.max_speed
            )));
        }
        if !(self.weight_tolerance.is_finite() && self.weight_tolerance >= 0.0) {
            return Err(CoreError::Config(format!(
                "weight_tolerance must be finite and >= 0, got {}",
                self.weight_tolerance
            )));
        }
        Ok(())
    }
}

/// Dot layer drawing parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayerConfig {
    /// Dot radius in pixels.
    pub dot_radius: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { dot_radius: 1.0 }
    }
}
