//! Per-slot particle state.

use tf_core::{GeoPoint, NodeId};

/// One particle of the pool.
///
/// A particle travels from `origin` towards the node `target`; `progress` is
/// the completed fraction of that leg.  On arrival it re-emits from the node
/// it reached, so `origin` is always the position of a node the particle
/// visited (or was placed at).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    /// Where the current leg started.
    pub origin: GeoPoint,

    /// Node the particle is heading to.
    pub target: NodeId,

    /// Completed fraction of the current leg, in `[0, 1)` between ticks.
    pub progress: f64,

    /// Progress gained per tick.
    pub speed: f64,
}

impl Particle {
    /// Advance by one tick's worth of progress.  Returns `true` if the particle
    /// reached (or passed) its target.
    #[inline]
    pub fn advance(&mut self) -> bool {
        self.progress += self.speed;
        self.progress >= 1.0
    }

    /// Start a new leg from `from` (the node just reached) towards `next`.
    /// Overshoot past the previous target is discarded.
    #[inline]
    pub fn retarget(&mut self, from: GeoPoint, next: NodeId) {
        self.origin = from;
        self.target = next;
        self.progress = 0.0;
    }
}
