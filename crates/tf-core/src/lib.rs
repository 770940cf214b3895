//! `tf-core` — foundational types for the torflow particle map.
//!
//! This crate is a dependency of every other `tf-*` crate.  It has no `tf-*`
//! dependencies and few external ones (`rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `PointId`, `ShapeId`, `SimulationId`, …         |
//! | [`geo`]         | `GeoPoint`, `ScreenPoint`, `GeoBounds`, haversine distance |
//! | [`projection`]  | `MapProjection` trait, web-mercator `Viewport`, `Zoom`    |
//! | [`frame`]       | `FrameScheduler` trait, `FrameQueue`, `FrameToken`        |
//! | [`time`]        | `Tick`                                                    |
//! | [`rng`]         | `SimRng`                                                  |
//! | [`config`]      | `SimConfig`, `LayerConfig`                                |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod config;
pub mod error;
pub mod frame;
pub mod geo;
pub mod ids;
pub mod projection;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{LayerConfig, SimConfig, PARTICLE_COUNT};
pub use error::{CoreError, CoreResult};
pub use frame::{FrameQueue, FrameScheduler, FrameToken};
pub use geo::{GeoBounds, GeoPoint, ScreenPoint};
pub use ids::{NodeId, PointId, ShapeId, SimulationId, SubscriptionId};
pub use projection::{MapProjection, Viewport, Zoom};
pub use rng::SimRng;
pub use time::Tick;
