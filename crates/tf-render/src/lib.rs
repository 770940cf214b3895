//! `tf-render` — the dot layer that draws particle positions over a map.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`style`]        | `FillStyle` — CSS colour strings (`rgba(…)`, `#rrggbb`, …) |
//! | [`surface`]      | `DrawSurface` trait                                        |
//! | [`canvas`]       | `PixelCanvas` — RGBA8 raster surface with PPM export       |
//! | [`display_list`] | `DisplayList` — retained dot list with SVG export          |
//! | [`layer`]        | `DotLayer`, `MapEvent`                                     |
//! | [`error`]        | `RenderError`, `RenderResult<T>`                           |
//!
//! # Redraw model
//!
//! The layer keeps every point in geographic coordinates.  `add` draws the
//! new dot incrementally; `clear` wipes points and surface together; a map
//! event (pan, zoom, reset, resize) repaints everything through the map's
//! *current* projection, so dots stay glued to the map mid-zoom without any
//! new data from the simulation.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | FxHash for the point → shape index instead of SipHash.   |

pub mod canvas;
pub mod display_list;
pub mod error;
pub mod layer;
pub mod style;
pub mod surface;


pub use canvas::PixelCanvas;
pub use display_list::{DisplayList, Dot};
pub use error::{RenderError, RenderResult};
pub use layer::{DotLayer, MapEvent};
pub use style::FillStyle;
pub use surface::DrawSurface;
