//! Position subscription.

use tf_core::SubscriptionId;

use crate::PositionSet;

/// Receiver of the per-tick [`PositionSet`].
///
/// Implemented for every `FnMut(&PositionSet)` closure, so most callers pass
/// a closure to
/// [`ParticleSimulation::on_positions_available`][crate::ParticleSimulation::on_positions_available].
pub trait PositionObserver {
    fn on_positions(&mut self, positions: &PositionSet);
}

impl<F: FnMut(&PositionSet)> PositionObserver for F {
    fn on_positions(&mut self, positions: &PositionSet) {
        self(positions)
    }
}

/// Handle of the current subscriber, used to cancel it.
///
/// Cancelling a subscription does not stop the tick loop, and stopping the
/// loop does not cancel the subscription.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[must_use = "dropping the handle leaves no way to unsubscribe"]
pub struct Subscription {
    pub(crate) id: SubscriptionId,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// The single registered observer.
pub(crate) struct Subscriber {
    pub(crate) id:       SubscriptionId,
    pub(crate) observer: Box<dyn PositionObserver>,
}
