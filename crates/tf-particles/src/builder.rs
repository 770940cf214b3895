//! Fluent builder for constructing a [`ParticleSimulation`].

use tracing::{debug, warn};

use tf_core::{FrameScheduler, MapProjection, SimConfig, SimRng, SimulationId, Tick};

use crate::sim::{populate, Lifecycle};
use crate::{CumulativeDistribution, ParticleSimulation, PositionSet, SimError, SimResult, WeightedNode};

/// Fluent builder for [`ParticleSimulation<P, S>`].
///
/// # Required inputs
///
/// - the weighted node set (weights summing to ~1)
/// - `P: MapProjection` — the map whose current projection positions are
///   computed in (usually a shared `Rc<RefCell<Viewport>>`)
/// - `S: FrameScheduler` — the frame source (usually a shared
///   `Rc<RefCell<FrameQueue>>`)
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                          |
/// |--------------------------|----------------------------------|
/// | `.config(c)`             | `SimConfig::default()`           |
/// | `.particle_count(n)`     | `PARTICLE_COUNT` (500)           |
/// | `.seed(s)`               | `0`                              |
/// | `.speed_range(min, max)` | `0.004 ..= 0.012` progress/tick  |
/// | `.weight_tolerance(t)`   | `1e-3`                           |
pub struct SimulationBuilder<P: MapProjection, S: FrameScheduler> {
    nodes:      Vec<WeightedNode>,
    projection: P,
    scheduler:  S,
    config:     SimConfig,
}

impl<P: MapProjection, S: FrameScheduler> SimulationBuilder<P, S> {
    /// Create a builder with all required inputs.
    pub fn new(nodes: Vec<WeightedNode>, projection: P, scheduler: S) -> Self {
        Self {
            nodes,
            projection,
            scheduler,
            config: SimConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn particle_count(mut self, count: usize) -> Self {
        self.config.particle_count = count;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Per-particle speeds are drawn uniformly from `min ..= max`, in leg
    /// progress per tick.
    pub fn speed_range(mut self, min: f64, max: f64) -> Self {
        self.config.min_speed = min;
        self.config.max_speed = max;
        self
    }

    pub fn weight_tolerance(mut self, tolerance: f64) -> Self {
        self.config.weight_tolerance = tolerance;
        self
    }

    /// Validate inputs, precompute the sampling distribution, populate the
    /// particle pool and return an idle simulation.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for a zero particle count, an empty node set, a
    /// node with an invalid position or weight, a zero total weight, or a bad
    /// speed range.  Nothing is allocated for the pool on failure.
    pub fn build(self) -> SimResult<ParticleSimulation<P, S>> {
        self.config.validate()?;

        if self.nodes.is_empty() {
            return Err(SimError::InvalidConfiguration("node set is empty".into()));
        }
        if let Some((i, node)) = self.nodes.iter().enumerate().find(|(_, n)| !n.is_valid()) {
            return Err(SimError::InvalidConfiguration(format!(
                "node {i} is malformed: position {}, weight {}",
                node.position, node.weight
            )));
        }

        let distribution = CumulativeDistribution::new(self.nodes.iter().map(|n| n.weight))?;
        let deviation = (distribution.raw_total() - 1.0).abs();
        if deviation > self.config.weight_tolerance {
            warn!(
                total = distribution.raw_total(),
                tolerance = self.config.weight_tolerance,
                "node weights do not sum to 1; renormalizing"
            );
        }

        let mut rng = SimRng::new(self.config.seed);
        let particles = populate(&self.nodes, &distribution, &mut rng, &self.config);

        let id = SimulationId::next();
        debug!(
            %id,
            nodes = self.nodes.len(),
            particles = particles.len(),
            seed = self.config.seed,
            "particle simulation built"
        );

        Ok(ParticleSimulation {
            id,
            positions:         PositionSet::with_capacity(particles.len()),
            node_px:           Vec::with_capacity(self.nodes.len()),
            config:            self.config,
            nodes:             self.nodes,
            distribution,
            particles,
            rng,
            projection:        self.projection,
            scheduler:         self.scheduler,
            state:             Lifecycle::Idle,
            pending:           None,
            clock:             Tick::ZERO,
            subscriber:        None,
            next_subscription: 0,
        })
    }
}
