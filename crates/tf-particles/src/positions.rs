//! `PositionSet` — the output of one tick.

use tf_core::{ScreenPoint, Tick};

/// Container-pixel positions of every particle that could be projected on
/// one tick, in pool order.
///
/// Handed to the subscriber by reference.  The simulation refills the same
/// buffer on the next tick, so consumers copy what they need to keep.
#[derive(Clone, Debug, Default)]
pub struct PositionSet {
    tick:    Tick,
    points:  Vec<ScreenPoint>,
    skipped: usize,
}

impl PositionSet {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { tick: Tick::ZERO, points: Vec::with_capacity(n), skipped: 0 }
    }

    /// Reset for `tick`, keeping the allocation.
    pub(crate) fn begin(&mut self, tick: Tick) {
        self.tick = tick;
        self.points.clear();
        self.skipped = 0;
    }

    #[inline]
    pub(crate) fn push(&mut self, p: ScreenPoint) {
        self.points.push(p);
    }

    #[inline]
    pub(crate) fn skip(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn release(&mut self) {
        self.points = Vec::new();
        self.skipped = 0;
    }

    /// Tick that produced this set.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = ScreenPoint> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Particles left out of this tick because their leg could not be
    /// projected.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
