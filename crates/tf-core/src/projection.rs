//! Geo ↔ pixel projection.
//!
//! [`MapProjection`] is the seam between the particle model and whatever map
//! widget hosts it: the simulation and the dot layer only ever ask "where is
//! this coordinate on screen *right now*", so pan and zoom are picked up on
//! the next frame without either side caching pixel positions.
//!
//! [`Viewport`] is the in-process implementation: spherical web-mercator
//! (EPSG:3857) with 256 px tiles, the projection slippy-map widgets use.
//!
//! ```text
//! world_x = 256·2^z · (lng/360 + ½)
//! world_y = 256·2^z · (½ − ln(tan(π/4 + φ/2)) / 2π)
//! container = world(p) − world(center) + size/2
//! ```

use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::fmt;
use std::rc::Rc;

use crate::{GeoBounds, GeoPoint, ScreenPoint};

/// Latitude limit of the square web-mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Side length of one map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

// ── Zoom ──────────────────────────────────────────────────────────────────────

/// An integer map zoom level.  Clusters are computed per zoom level, so the
/// level doubles as a cache key.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zoom(pub u8);

impl Zoom {
    pub const MIN: Zoom = Zoom(0);
    pub const MAX: Zoom = Zoom(18);

    /// Pixel width of the whole world at this zoom.
    #[inline]
    pub fn world_size(self) -> f64 {
        TILE_SIZE * f64::from(1u32 << self.0.min(30))
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z{}", self.0)
    }
}

// ── MapProjection ─────────────────────────────────────────────────────────────

/// Read access to a map's current viewport.
///
/// Implementations must answer with the state at call time: callers invoke
/// these methods every frame and never cache the results across frames.
pub trait MapProjection {
    /// Geo coordinate → container pixel.  `None` if the point cannot be
    /// projected (invalid coordinate, viewport unavailable).
    fn project(&self, geo: GeoPoint) -> Option<ScreenPoint>;

    /// Container pixel → geo coordinate.  `None` if the pixel lies off the
    /// map's world (e.g. beside the world at low zoom in a wide container).
    fn unproject(&self, point: ScreenPoint) -> Option<GeoPoint>;

    /// Current zoom level.
    fn zoom(&self) -> Zoom;

    /// Geographic extent of the visible container.
    fn bounds(&self) -> GeoBounds;
}

impl<T: MapProjection + ?Sized> MapProjection for &T {
    fn project(&self, geo: GeoPoint) -> Option<ScreenPoint> {
        (**self).project(geo)
    }
    fn unproject(&self, point: ScreenPoint) -> Option<GeoPoint> {
        (**self).unproject(point)
    }
    fn zoom(&self) -> Zoom {
        (**self).zoom()
    }
    fn bounds(&self) -> GeoBounds {
        (**self).bounds()
    }
}

/// Shared handle: the map owner mutates the viewport between frames while the
/// simulation and the layer hold clones of the same `Rc`.
///
/// `project`/`unproject` answer `None` rather than panic if the viewport is
/// mutably borrowed at call time.
///
/// # Panics
///
/// `zoom` and `bounds` have no value to fall back on and panic if the
/// viewport is mutably borrowed at call time.  Callers must not query them
/// from inside a `borrow_mut()` of the same viewport.
impl<T: MapProjection> MapProjection for Rc<RefCell<T>> {
    fn project(&self, geo: GeoPoint) -> Option<ScreenPoint> {
        self.try_borrow().ok()?.project(geo)
    }
    fn unproject(&self, point: ScreenPoint) -> Option<GeoPoint> {
        self.try_borrow().ok()?.unproject(point)
    }
    fn zoom(&self) -> Zoom {
        self.borrow().zoom()
    }
    fn bounds(&self) -> GeoBounds {
        self.borrow().bounds()
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// A web-mercator map viewport: center, zoom and container size.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    center:   GeoPoint,
    zoom:     Zoom,
    width:    f64,
    height:   f64,
    min_zoom: Zoom,
    max_zoom: Zoom,
}

impl Viewport {
    /// Create a viewport of `width × height` pixels centered on `center`.
    ///
    /// The zoom is clamped to `[Zoom::MIN, Zoom::MAX]` and the center latitude
    /// to the mercator limit.
    pub fn new(center: GeoPoint, zoom: Zoom, width: f64, height: f64) -> Self {
        let mut vp = Self {
            center,
            zoom,
            width:    width.max(0.0),
            height:   height.max(0.0),
            min_zoom: Zoom::MIN,
            max_zoom: Zoom::MAX,
        };
        vp.set_view(center, zoom);
        vp
    }

    /// Restrict the zoom range (builder style).  `min > max` is swapped.
    pub fn with_zoom_range(mut self, min: Zoom, max: Zoom) -> Self {
        self.min_zoom = min.min(max);
        self.max_zoom = max.max(min);
        let (center, zoom) = (self.center, self.zoom);
        self.set_view(center, zoom);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn min_zoom(&self) -> Zoom {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> Zoom {
        self.max_zoom
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Jump to `center` at `zoom` (both clamped).
    pub fn set_view(&mut self, center: GeoPoint, zoom: Zoom) {
        self.center = GeoPoint::new(
            center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            wrap_lng(center.lng),
        );
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Change the zoom level, keeping the center fixed.  Returns `true` if the
    /// zoom actually changed.
    pub fn set_zoom(&mut self, zoom: Zoom) -> bool {
        let before = self.zoom;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.zoom != before
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(Zoom(self.zoom.0.saturating_add(1)))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(Zoom(self.zoom.0.saturating_sub(1)))
    }

    /// Move the view by a pixel offset (positive `dx` pans east, positive
    /// `dy` pans south).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let c = world_point(self.center, self.zoom).offset(dx, dy);
        let center = world_to_geo(c, self.zoom);
        let zoom = self.zoom;
        self.set_view(center, zoom);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    fn half_size(&self) -> ScreenPoint {
        ScreenPoint::new(self.width * 0.5, self.height * 0.5)
    }
}

impl MapProjection for Viewport {
    fn project(&self, geo: GeoPoint) -> Option<ScreenPoint> {
        if !geo.is_valid() {
            return None;
        }
        let p = world_point(geo, self.zoom);
        let c = world_point(self.center, self.zoom);
        let h = self.half_size();
        let out = ScreenPoint::new(p.x - c.x + h.x, p.y - c.y + h.y);
        out.is_finite().then_some(out)
    }

    fn unproject(&self, point: ScreenPoint) -> Option<GeoPoint> {
        if !point.is_finite() {
            return None;
        }
        let c = world_point(self.center, self.zoom);
        let h = self.half_size();
        let world = ScreenPoint::new(point.x + c.x - h.x, point.y + c.y - h.y);
        // Off the world rectangle there is no geographic point to return.
        let size = self.zoom.world_size();
        if !(0.0..=size).contains(&world.x) || !(0.0..=size).contains(&world.y) {
            return None;
        }
        let geo = world_to_geo(world, self.zoom);
        geo.is_valid().then_some(geo)
    }

    fn zoom(&self) -> Zoom {
        self.zoom
    }

    fn bounds(&self) -> GeoBounds {
        let c = world_point(self.center, self.zoom);
        let h = self.half_size();
        let nw = world_to_geo(ScreenPoint::new(c.x - h.x, c.y - h.y), self.zoom);
        let se = world_to_geo(ScreenPoint::new(c.x + h.x, c.y + h.y), self.zoom);
        GeoBounds::new(GeoPoint::new(se.lat, nw.lng), GeoPoint::new(nw.lat, se.lng))
    }
}

// ── Mercator helpers ──────────────────────────────────────────────────────────

/// Absolute world pixel of `geo` at `zoom`.
fn world_point(geo: GeoPoint, zoom: Zoom) -> ScreenPoint {
    let scale = zoom.world_size();
    let lat = geo.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = scale * (geo.lng / 360.0 + 0.5);
    let y = scale * (0.5 - (FRAC_PI_4 + lat * 0.5).tan().ln() / TAU);
    ScreenPoint::new(x, y)
}

/// Inverse of [`world_point`].  Latitude saturates at the mercator limit.
fn world_to_geo(p: ScreenPoint, zoom: Zoom) -> GeoPoint {
    let scale = zoom.world_size();
    let lng = (p.x / scale - 0.5) * 360.0;
    let lat = (2.0 * ((0.5 - p.y / scale) * TAU).exp().atan() - FRAC_PI_2).to_degrees();
    GeoPoint::new(lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lng.clamp(-180.0, 180.0))
}

/// Normalize a longitude into `[-180, 180]`.
fn wrap_lng(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        return lng;
    }
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lng > 0.0 { 180.0 } else { wrapped }
}
