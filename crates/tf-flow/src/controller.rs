//! `FlowController` — one particle simulation per cluster generation, piped
//! into a shared dot layer.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, info, warn};

use tf_core::{FrameScheduler, FrameToken, MapProjection, SimRng, Zoom};
use tf_particles::{ParticleSimulation, PositionSet, SimulationBuilder};
use tf_render::{DotLayer, DrawSurface, MapEvent};

use crate::{ClusterIndex, FlowConfig, FlowResult};

/// Owns the cluster index, the current simulation and the particle layer.
///
/// Whenever the map finishes re-clustering (initial load, end of a zoom
/// animation) the host calls [`on_map_clustered`](Self::on_map_clustered):
///
/// ```text
/// nodes := cluster_index.weighted_nodes(map.zoom())
/// new simulation(nodes) ──positions──▶ layer.clear(); layer.add(p) …
/// old simulation: stop, destroy
/// layer: clear
/// new simulation: start
/// ```
///
/// The host drains its frame queue and passes the tokens to
/// [`dispatch`](Self::dispatch), and forwards viewport changes to
/// [`on_map_event`](Self::on_map_event).
pub struct FlowController<S, M, F>
where
    S: DrawSurface + 'static,
    M: MapProjection + Clone + 'static,
    F: FrameScheduler + Clone,
{
    config:     FlowConfig,
    clusters:   ClusterIndex,
    map:        M,
    scheduler:  F,
    layer:      Rc<RefCell<DotLayer<S, M>>>,
    simulation: Option<ParticleSimulation<M, F>>,
    /// Zoom the current simulation's nodes were taken from.
    zoom:       Option<Zoom>,
    generation: u64,
}

impl<S, M, F> FlowController<S, M, F>
where
    S: DrawSurface + 'static,
    M: MapProjection + Clone + 'static,
    F: FrameScheduler + Clone,
{
    /// Validate `config`, create the particle layer on `surface` and attach
    /// it to `map`.  No simulation runs until the first
    /// [`on_map_clustered`](Self::on_map_clustered).
    ///
    /// # Errors
    ///
    /// Configuration errors, or `Render(NotReady)` if the surface is not ready.
    pub fn new(config: FlowConfig, clusters: ClusterIndex, map: M, scheduler: F, surface: S) -> FlowResult<Self> {
        config.validate()?;
        let mut layer = DotLayer::new(config.layer.clone()).with_surface(surface);
        layer.fill_style(config.style()?).add_to(map.clone())?;
        Ok(Self {
            config,
            clusters,
            map,
            scheduler,
            layer: Rc::new(RefCell::new(layer)),
            simulation: None,
            zoom:       None,
            generation: 0,
        })
    }

    /// Replace the running simulation with one built from the clusters at the
    /// map's current zoom.
    ///
    /// The new simulation is built and subscribed before the old one is
    /// destroyed, so nothing changes unless the replacement is ready to start.
    ///
    /// # Errors
    ///
    /// `NoClusters`, `ZeroBandwidth` or `ZoomOutOfRange` if the index has no
    /// usable clusters for the zoom, or `Simulation` if the node set cannot
    /// be built.  The previous simulation keeps running in that case.
    pub fn on_map_clustered(&mut self) -> FlowResult<()> {
        let zoom = self.map.zoom();
        let nodes = self.clusters.weighted_nodes(zoom)?;

        let generation = self.generation + 1;
        let mut config = self.config.simulation.clone();
        config.seed = SimRng::mix_seed(config.seed, generation);

        let mut simulation = SimulationBuilder::new(nodes, self.map.clone(), self.scheduler.clone())
            .config(config)
            .build()?;

        let layer = Rc::clone(&self.layer);
        let _subscription = simulation.on_positions_available(move |positions: &PositionSet| {
            match layer.try_borrow_mut() {
                Ok(mut layer) => {
                    layer.replace_points(positions.iter());
                }
                Err(_) => warn!(tick = %positions.tick(), "particle layer busy; frame dropped"),
            }
        })?;

        self.teardown()?;
        self.layer.borrow_mut().clear();
        simulation.start()?;
        self.generation = generation;

        info!(
            %zoom,
            generation = self.generation,
            nodes = simulation.node_count(),
            particles = simulation.particle_count(),
            "particle flow restarted"
        );
        self.simulation = Some(simulation);
        self.zoom = Some(zoom);
        Ok(())
    }

    /// Deliver drained frame tokens to the current simulation.  Returns the
    /// number of ticks that ran.
    pub fn dispatch<I>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = FrameToken>,
    {
        let Some(simulation) = self.simulation.as_mut() else {
            return 0;
        };
        tokens.into_iter().filter(|&t| simulation.on_frame(t)).count()
    }

    /// Forward a viewport change to the particle layer.
    pub fn on_map_event(&mut self, event: MapEvent) {
        self.layer.borrow_mut().on_map_event(event);
    }

    /// Pause the current simulation.  The last frame stays on the layer.
    pub fn pause(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.stop();
        }
    }

    /// Resume the current simulation after [`pause`](Self::pause).
    pub fn resume(&mut self) -> FlowResult<()> {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.start()?;
        }
        Ok(())
    }

    /// Destroy the simulation and detach the layer from the map.
    pub fn shutdown(&mut self) -> FlowResult<()> {
        self.teardown()?;
        self.layer.borrow_mut().remove();
        debug!(generation = self.generation, "particle flow shut down");
        Ok(())
    }

    fn teardown(&mut self) -> FlowResult<()> {
        if let Some(mut old) = self.simulation.take() {
            old.stop();
            old.destroy()?;
            debug!(id = %old.id(), ticks = %old.ticks_elapsed(), "previous simulation destroyed");
        }
        self.zoom = None;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn clusters(&self) -> &ClusterIndex {
        &self.clusters
    }

    /// Mutable access for re-clustering; call
    /// [`on_map_clustered`](Self::on_map_clustered) afterwards.
    pub fn clusters_mut(&mut self) -> &mut ClusterIndex {
        &mut self.clusters
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn simulation(&self) -> Option<&ParticleSimulation<M, F>> {
        self.simulation.as_ref()
    }

    pub fn layer(&self) -> Ref<'_, DotLayer<S, M>> {
        self.layer.borrow()
    }

    /// Number of simulations built so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Zoom of the running simulation's node set, if any.
    pub fn zoom(&self) -> Option<Zoom> {
        self.zoom
    }
}
