//! `tf-particles` — weighted particle flow simulation.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                     |
//! |------------------|--------------------------------------------------------------|
//! | [`node`]         | `WeightedNode` — a geo point with a normalized bandwidth share |
//! | [`sampler`]      | `CumulativeDistribution` — weighted draw by binary search    |
//! | [`particle`]     | `Particle` — per-slot journey state                          |
//! | [`positions`]    | `PositionSet` — one tick's projected particle positions      |
//! | [`subscription`] | `PositionObserver` trait, `Subscription` handle              |
//! | [`builder`]      | `SimulationBuilder`                                          |
//! | [`sim`]          | `ParticleSimulation` and its frame-driven tick loop          |
//! | [`error`]        | `SimError`, `SimResult<T>`                                   |
//!
//! # Tick
//!
//! ```text
//! for each particle:
//!   ① progress += speed
//!   ② progress >= 1  →  origin := nodes[target]; target := weighted draw; progress := 0
//!   ③ point := lerp(project(origin), project(nodes[target]), progress)
//! emit PositionSet to the subscriber
//! ```
//!
//! Rule ② makes every particle leave from the node it just reached, so the
//! picture is a continuous flow that concentrates on high-bandwidth nodes.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let queue = Rc::new(RefCell::new(FrameQueue::new()));
//! let mut sim = SimulationBuilder::new(nodes, viewport.clone(), queue.clone())
//!     .particle_count(500)
//!     .seed(7)
//!     .build()?;
//! let _sub = sim.on_positions_available(|set: &PositionSet| draw(set))?;
//! sim.start()?;
//! loop {
//!     let tokens = queue.borrow_mut().drain_frame();
//!     for t in tokens { sim.on_frame(t); }
//! }
//! ```

pub mod builder;
pub mod error;
pub mod node;
pub mod particle;
pub mod positions;
pub mod sampler;
pub mod sim;
pub mod subscription;


pub use builder::SimulationBuilder;
pub use error::{SimError, SimResult};
pub use node::WeightedNode;
pub use particle::Particle;
pub use positions::PositionSet;
pub use sampler::CumulativeDistribution;
pub use sim::{Lifecycle, ParticleSimulation};
pub use subscription::{PositionObserver, Subscription};
