//! The drawing surface abstraction.

use tf_core::{ScreenPoint, ShapeId};

use crate::{FillStyle, RenderResult};

/// Something dots can be painted on, in container pixel coordinates.
///
/// Surfaces are repainted wholesale: the layer calls [`clear`](Self::clear)
/// and then [`fill_dot`](Self::fill_dot) once per visible point.
pub trait DrawSurface {
    /// `false` until the surface has backing storage (e.g. zero-sized).
    fn is_ready(&self) -> bool;

    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Match the map container size.  Clears the surface.
    fn resize(&mut self, width: u32, height: u32);

    /// Erase everything.
    fn clear(&mut self);

    /// Paint a filled disc and return its handle.
    fn fill_dot(&mut self, center: ScreenPoint, radius: f64, style: &FillStyle) -> RenderResult<ShapeId>;
}
