//! `DotLayer` — a map overlay that draws one dot per point.

use tracing::{debug, trace, warn};

use tf_core::{GeoPoint, LayerConfig, MapProjection, PointId, ScreenPoint, ShapeId};

use crate::{DrawSurface, FillStyle, RenderError, RenderResult};

#[cfg(feature = "fx-hash")]
type ShapeIndex = rustc_hash::FxHashMap<PointId, ShapeId>;
#[cfg(not(feature = "fx-hash"))]
type ShapeIndex = std::collections::HashMap<PointId, ShapeId>;

/// Viewport notifications forwarded from the map.
///
/// Every variant triggers a full redraw through the map's current projection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapEvent {
    /// The map was panned.
    Move,
    /// The zoom level changed (or is animating).
    Zoom,
    /// The map jumped to a new view.
    ViewReset,
    /// The map container changed size.  The surface is resized to match.
    Resize { width: u32, height: u32 },
}

/// Overlay that keeps a set of geo points and paints them as dots.
///
/// Points are stored in geographic coordinates, so the layer can repaint
/// itself after any viewport change without being fed new data.  The
/// point → shape index only ever holds shapes drawn since the last `clear`,
/// so `drawn_count() <= point_count()` at all times.
///
/// ```rust,ignore
/// let mut layer = DotLayer::new(LayerConfig::default())
///     .with_surface(PixelCanvas::new(1024, 768));
/// layer.fill_style("rgba(255,255,255,0.8)".parse()?).add_to(map)?;
/// ```
pub struct DotLayer<S: DrawSurface, M: MapProjection> {
    config:  LayerConfig,
    style:   FillStyle,
    surface: Option<S>,
    map:     Option<M>,

    points:     Vec<(PointId, GeoPoint)>,
    shapes:     ShapeIndex,
    next_point: u32,

    frames_degraded: u64,
}

impl<S: DrawSurface, M: MapProjection> DotLayer<S, M> {
    pub fn new(config: LayerConfig) -> Self {
        Self {
            config,
            style:           FillStyle::default(),
            surface:         None,
            map:             None,
            points:          Vec::new(),
            shapes:          ShapeIndex::default(),
            next_point:      0,
            frames_degraded: 0,
        }
    }

    /// Builder-style [`set_surface`](Self::set_surface).
    pub fn with_surface(mut self, surface: S) -> Self {
        self.set_surface(surface);
        self
    }

    /// Install (or replace) the drawing surface.  Repaints if attached.
    pub fn set_surface(&mut self, surface: S) -> &mut Self {
        self.surface = Some(surface);
        self.shapes.clear();
        if self.map.is_some() {
            self.redraw();
        }
        self
    }

    /// Set the fill used for every dot drawn from now on.
    pub fn fill_style(&mut self, style: FillStyle) -> &mut Self {
        self.style = style;
        self
    }

    // ── Attachment ────────────────────────────────────────────────────────

    /// Attach to `map` and paint the current points.
    ///
    /// # Errors
    ///
    /// `NotReady` if no surface has been installed or it has no backing
    /// storage yet.  The layer stays detached.
    pub fn add_to(&mut self, map: M) -> RenderResult<&mut Self> {
        match &self.surface {
            None => return Err(RenderError::NotReady("no drawing surface")),
            Some(s) if !s.is_ready() => {
                return Err(RenderError::NotReady("drawing surface has no backing storage"));
            }
            Some(_) => {}
        }
        debug!(points = self.points.len(), zoom = %map.zoom(), "dot layer attached");
        self.map = Some(map);
        self.redraw();
        Ok(self)
    }

    /// Detach from the map, dropping every point and wiping the surface.
    /// Returns the map, or `None` if the layer was not attached.
    pub fn remove(&mut self) -> Option<M> {
        let map = self.map.take()?;
        self.points.clear();
        self.shapes.clear();
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
        debug!("dot layer removed");
        Some(map)
    }

    // ── Points ────────────────────────────────────────────────────────────

    /// Add a point given in container pixels and draw it.  No-op when
    /// detached.  Points the projection cannot place, such as pixels beside
    /// the world at low zoom, are dropped.
    pub fn add(&mut self, point: ScreenPoint) -> &mut Self {
        let Some(map) = self.map.as_ref() else {
            return self;
        };
        match map.unproject(point) {
            Some(geo) => self.insert(geo),
            None => trace!(%point, "point outside the projection, dropped"),
        }
        self
    }

    /// Add a point given in geographic coordinates and draw it.  No-op when
    /// detached.
    pub fn add_geo(&mut self, point: GeoPoint) -> &mut Self {
        if self.map.is_some() {
            self.insert(point);
        }
        self
    }

    /// Drop every point and wipe the surface.  No-op when detached.
    pub fn clear(&mut self) -> &mut Self {
        if self.map.is_none() {
            return self;
        }
        self.points.clear();
        self.shapes.clear();
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
        self
    }

    /// `clear()` followed by `add()` for each point: show exactly one frame.
    pub fn replace_points<I>(&mut self, points: I) -> &mut Self
    where
        I: IntoIterator<Item = ScreenPoint>,
    {
        self.clear();
        for p in points {
            self.add(p);
        }
        self
    }

    fn insert(&mut self, geo: GeoPoint) {
        let id = PointId(self.next_point);
        self.next_point = self.next_point.wrapping_add(1);
        self.points.push((id, geo));

        let (Some(map), Some(surface)) = (self.map.as_ref(), self.surface.as_mut()) else {
            return;
        };
        let Some(px) = map.project(geo) else {
            return;
        };
        match surface.fill_dot(px, self.config.dot_radius, &self.style) {
            Ok(shape) => {
                self.shapes.insert(id, shape);
            }
            // Retained: the next full redraw tries again.
            Err(e) => trace!(%id, error = %e, "incremental draw failed"),
        }
    }

    // ── Redraw ────────────────────────────────────────────────────────────

    /// Forward a viewport change from the map.  No-op when detached.
    pub fn on_map_event(&mut self, event: MapEvent) {
        if self.map.is_none() {
            return;
        }
        if let MapEvent::Resize { width, height } = event {
            if let Some(surface) = self.surface.as_mut() {
                surface.resize(width, height);
            }
        }
        trace!(?event, points = self.points.len(), "map event");
        self.redraw();
    }

    /// Repaint every retained point through the map's current projection.
    ///
    /// Never fails: if the surface rejects a dot, the frame is left empty,
    /// logged, and counted in [`frames_degraded`](Self::frames_degraded).
    pub fn redraw(&mut self) {
        let (Some(map), Some(surface)) = (self.map.as_ref(), self.surface.as_mut()) else {
            return;
        };
        self.shapes.clear();
        surface.clear();

        let mut offscreen = 0usize;
        let mut failure = None;
        for &(id, geo) in &self.points {
            let Some(px) = map.project(geo) else {
                offscreen += 1;
                continue;
            };
            match surface.fill_dot(px, self.config.dot_radius, &self.style) {
                Ok(shape) => {
                    self.shapes.insert(id, shape);
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            surface.clear();
            self.shapes.clear();
            self.frames_degraded += 1;
            warn!(error = %e, points = self.points.len(), "redraw failed; frame left empty");
            return;
        }
        if offscreen > 0 {
            trace!(offscreen, "points not projectable in the current view");
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Number of dots currently on the surface.
    pub fn drawn_count(&self) -> usize {
        self.shapes.len()
    }

    /// Number of retained points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.points.iter().map(|&(_, p)| p)
    }

    pub fn is_attached(&self) -> bool {
        self.map.is_some()
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn style(&self) -> &FillStyle {
        &self.style
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Redraws that failed and were left empty.
    pub fn frames_degraded(&self) -> u64 {
        self.frames_degraded
    }
}
