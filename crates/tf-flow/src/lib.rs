//! `tf-flow` — the relay map application layer.
//!
//! Turns the relay list into per-zoom clusters and keeps one particle
//! simulation running over the clusters of the current zoom, drawing its
//! positions on a [`DotLayer`](tf_render::DotLayer).
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`relays`]     | `RelayDocument` (the `/nodes` JSON), `Relay`             |
//! | [`cluster`]    | `Cluster`, `ClusterIndex` (zoom → clusters), grid bucketing |
//! | [`config`]     | `FlowConfig`, loaded from JSON                           |
//! | [`controller`] | `FlowController` — recluster → rebuild simulation        |
//! | [`error`]      | `FlowError`, `FlowResult<T>`                             |

pub mod cluster;
pub mod config;
pub mod controller;
pub mod error;
pub mod relays;

#[cfg(test)]
mod tests;

pub use cluster::{Cluster, ClusterIndex, MAX_RADIUS, MIN_RADIUS};
pub use config::FlowConfig;
pub use controller::FlowController;
pub use error::{FlowError, FlowResult};
pub use relays::{Circle, NodeObject, Relay, RelayDocument};
