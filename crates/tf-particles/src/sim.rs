//! The `ParticleSimulation` struct and its frame-driven tick loop.

use std::fmt;

use tracing::{debug, trace};

use tf_core::{
    FrameScheduler, FrameToken, MapProjection, NodeId, ScreenPoint, SimConfig, SimRng,
    SimulationId, SubscriptionId, Tick,
};

use crate::subscription::Subscriber;
use crate::{
    CumulativeDistribution, Particle, PositionObserver, PositionSet, SimError, SimResult,
    SimulationBuilder, Subscription, WeightedNode,
};

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Lifecycle of a simulation.
///
/// ```text
/// Idle ──start()──▶ Running ──stop()──▶ Idle
///   └──────────────┴──destroy()──▶ Destroyed (terminal)
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Lifecycle {
    Idle,
    Running,
    Destroyed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifecycle::Idle      => "idle",
            Lifecycle::Running   => "running",
            Lifecycle::Destroyed => "destroyed",
        })
    }
}

// ── ParticleSimulation ────────────────────────────────────────────────────────

/// A fixed-size pool of particles flowing between weighted nodes.
///
/// The simulation never loops on its own: [`start`](Self::start) requests a
/// frame from the scheduler, and every frame token handed back through
/// [`on_frame`](Self::on_frame) runs one tick and requests the next frame.
/// At most one frame is in flight, and a token is honoured only if it is the
/// one the simulation is currently waiting for, so a frame that was already
/// queued before `stop()` or `destroy()` never ticks.
///
/// Create via [`SimulationBuilder`] or [`ParticleSimulation::new`].
pub struct ParticleSimulation<P: MapProjection, S: FrameScheduler> {
    pub(crate) id:     SimulationId,
    pub(crate) config: SimConfig,

    /// Node set for this generation.  Never mutated after construction.
    pub(crate) nodes:        Vec<WeightedNode>,
    pub(crate) distribution: CumulativeDistribution,

    /// The pool.  Length is `config.particle_count` until `destroy()`.
    pub(crate) particles: Vec<Particle>,
    pub(crate) rng:       SimRng,

    pub(crate) projection: P,
    pub(crate) scheduler:  S,

    pub(crate) state:   Lifecycle,
    /// The frame this simulation is waiting for, if running.
    pub(crate) pending: Option<FrameToken>,
    pub(crate) clock:   Tick,

    /// Output buffer, refilled every tick.
    pub(crate) positions: PositionSet,
    /// Per-tick scratch: projected node positions, indexed by `NodeId`.
    pub(crate) node_px:   Vec<Option<ScreenPoint>>,

    pub(crate) subscriber:        Option<Subscriber>,
    pub(crate) next_subscription: u32,
}

impl<P: MapProjection, S: FrameScheduler> ParticleSimulation<P, S> {
    /// Build an idle simulation of `count` particles over `nodes` with the
    /// default configuration.  See [`SimulationBuilder`] for the other knobs.
    pub fn new(nodes: Vec<WeightedNode>, count: usize, projection: P, scheduler: S) -> SimResult<Self> {
        SimulationBuilder::new(nodes, projection, scheduler)
            .particle_count(count)
            .build()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Begin ticking.  Idempotent while running.
    ///
    /// # Errors
    ///
    /// `InvalidState` after [`destroy`](Self::destroy).
    pub fn start(&mut self) -> SimResult<&mut Self> {
        match self.state {
            Lifecycle::Destroyed => {
                return Err(SimError::InvalidState { op: "start", state: self.state });
            }
            Lifecycle::Running => {}
            Lifecycle::Idle => {
                self.state = Lifecycle::Running;
                self.pending = Some(self.scheduler.request_frame(self.id));
                debug!(id = %self.id, tick = %self.clock, "simulation started");
            }
        }
        Ok(self)
    }

    /// Halt ticking and withdraw the pending frame.  Particle state is kept,
    /// so a later `start()` resumes where this left off.  Safe to call any
    /// number of times, including after `destroy()`.
    pub fn stop(&mut self) -> &mut Self {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
        if self.state == Lifecycle::Running {
            self.state = Lifecycle::Idle;
            debug!(id = %self.id, tick = %self.clock, "simulation stopped");
        }
        self
    }

    /// Stop and release the pool, output buffer and subscriber.  Terminal.
    ///
    /// # Errors
    ///
    /// `InvalidState` if already destroyed.
    pub fn destroy(&mut self) -> SimResult<()> {
        if self.state == Lifecycle::Destroyed {
            return Err(SimError::InvalidState { op: "destroy", state: self.state });
        }
        self.stop();
        self.particles = Vec::new();
        self.node_px = Vec::new();
        self.positions.release();
        self.subscriber = None;
        self.state = Lifecycle::Destroyed;
        debug!(id = %self.id, tick = %self.clock, "simulation destroyed");
        Ok(())
    }

    /// Replace every particle with a freshly drawn one.  The running state is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidState` after [`destroy`](Self::destroy).
    pub fn reset(&mut self) -> SimResult<&mut Self> {
        if self.state == Lifecycle::Destroyed {
            return Err(SimError::InvalidState { op: "reset", state: self.state });
        }
        self.particles = populate(&self.nodes, &self.distribution, &mut self.rng, &self.config);
        debug!(id = %self.id, "particle pool reset");
        Ok(self)
    }

    // ── Subscription ──────────────────────────────────────────────────────

    /// Register the observer that receives every tick's [`PositionSet`].
    ///
    /// Only one observer is kept; registering replaces the previous one.
    ///
    /// # Errors
    ///
    /// `InvalidState` after [`destroy`](Self::destroy).
    pub fn on_positions_available<O>(&mut self, observer: O) -> SimResult<Subscription>
    where
        O: PositionObserver + 'static,
    {
        if self.state == Lifecycle::Destroyed {
            return Err(SimError::InvalidState { op: "subscribe", state: self.state });
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscriber = Some(Subscriber { id, observer: Box::new(observer) });
        Ok(Subscription { id })
    }

    /// Remove the observer registered under `subscription`.  Returns `false`
    /// if it has already been replaced or removed.  Ticking is unaffected.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        match &self.subscriber {
            Some(s) if s.id == subscription.id => {
                self.subscriber = None;
                true
            }
            _ => false,
        }
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Frame dispatch entry point.
    ///
    /// Runs one tick and schedules the next frame if `token` is the frame this
    /// simulation is waiting for.  Tokens that are stale (withdrawn by
    /// `stop()`/`destroy()`, or belonging to another simulation) are ignored.
    /// Returns `true` if a tick ran.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.state != Lifecycle::Running || self.pending != Some(token) {
            trace!(id = %self.id, ?token, state = %self.state, "ignoring stale frame");
            return false;
        }
        self.pending = None;
        self.tick();
        self.pending = Some(self.scheduler.request_frame(self.id));
        true
    }

    /// Run one tick immediately, outside the frame loop, and return its
    /// positions (which are also delivered to the subscriber).
    ///
    /// # Errors
    ///
    /// `InvalidState` after [`destroy`](Self::destroy).
    pub fn step(&mut self) -> SimResult<&PositionSet> {
        if self.state == Lifecycle::Destroyed {
            return Err(SimError::InvalidState { op: "step", state: self.state });
        }
        self.tick();
        Ok(&self.positions)
    }

    fn tick(&mut self) {
        self.clock = self.clock + 1;

        // Explicit field borrows so the borrow checker sees disjoint access.
        let nodes        = self.nodes.as_slice();
        let distribution = &self.distribution;
        let rng          = &mut self.rng;
        let projection   = &self.projection;
        let node_px      = &mut self.node_px;
        let positions    = &mut self.positions;

        // Nodes are few and shared by many particles: project each once.
        node_px.clear();
        node_px.extend(nodes.iter().map(|n| projection.project(n.position)));

        positions.begin(self.clock);
        for particle in self.particles.iter_mut() {
            if particle.advance() {
                let reached = nodes
                    .get(particle.target.index())
                    .map_or(particle.origin, |n| n.position);
                particle.retarget(reached, distribution.sample_with(rng));
            }
            match interpolate(particle, node_px, projection) {
                Some(p) => positions.push(p),
                None    => positions.skip(),
            }
        }

        if positions.skipped() > 0 {
            trace!(
                id = %self.id,
                tick = %self.clock,
                skipped = positions.skipped(),
                "particles skipped: leg could not be projected"
            );
        }

        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber.observer.on_positions(&self.positions);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> SimulationId {
        self.id
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == Lifecycle::Running
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == Lifecycle::Destroyed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Pool size (zero once destroyed).
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[WeightedNode] {
        &self.nodes
    }

    pub fn distribution(&self) -> &CumulativeDistribution {
        &self.distribution
    }

    /// Ticks run so far (frame-driven and manual).
    pub fn ticks_elapsed(&self) -> Tick {
        self.clock
    }

    /// The frame this simulation is waiting for, if any.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Number of particles currently heading to each node, indexed by
    /// `NodeId`.
    pub fn target_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for p in &self.particles {
            if let Some(c) = counts.get_mut(p.target.index()) {
                *c += 1;
            }
        }
        counts
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Draw a full pool: each particle starts at a weighted-random node, heads to
/// another weighted-random node, and is spread along that leg so the first
/// frames already show a steady flow.
pub(crate) fn populate(
    nodes:        &[WeightedNode],
    distribution: &CumulativeDistribution,
    rng:          &mut SimRng,
    config:       &SimConfig,
) -> Vec<Particle> {
    (0..config.particle_count)
        .map(|_| {
            let from: NodeId = distribution.sample_with(rng);
            let target = distribution.sample_with(rng);
            Particle {
                origin:   nodes[from.index()].position,
                target,
                progress: rng.unit(),
                speed:    rng.gen_range(config.min_speed..=config.max_speed),
            }
        })
        .collect()
}

/// Pixel position of `particle` on its current leg, or `None` if either end
/// cannot be projected.
fn interpolate<P: MapProjection>(
    particle:   &Particle,
    node_px:    &[Option<ScreenPoint>],
    projection: &P,
) -> Option<ScreenPoint> {
    let to = (*node_px.get(particle.target.index())?)?;
    let from = projection.project(particle.origin)?;
    let p = from.lerp(to, particle.progress.clamp(0.0, 1.0));
    p.is_finite().then_some(p)
}
