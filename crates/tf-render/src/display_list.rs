//! `DisplayList` — a retained-mode surface.
//!
//! Keeps every dot as data instead of pixels.  Handy for hit-testing,
//! assertions, and exporting a frame as SVG.

use std::fmt::Write as _;

use tf_core::{ScreenPoint, ShapeId};

use crate::{DrawSurface, FillStyle, RenderError, RenderResult};

/// One retained dot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dot {
    pub id:     ShapeId,
    pub center: ScreenPoint,
    pub radius: f64,
    pub style:  FillStyle,
}

#[derive(Default)]
pub struct DisplayList {
    width:      u32,
    height:     u32,
    dots:       Vec<Dot>,
    next_shape: u32,
}

impl DisplayList {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Render the current frame as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = self.width,
            h = self.height,
        );
        for dot in &self.dots {
            // Infallible: writing into a String.
            let _ = writeln!(
                svg,
                "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"rgb({},{},{})\" fill-opacity=\"{}\"/>",
                dot.center.x, dot.center.y, dot.radius,
                dot.style.r, dot.style.g, dot.style.b, dot.style.a,
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl DrawSurface for DisplayList {
    fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.dots.clear();
    }

    fn clear(&mut self) {
        self.dots.clear();
    }

    fn fill_dot(&mut self, center: ScreenPoint, radius: f64, style: &FillStyle) -> RenderResult<ShapeId> {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return Err(RenderError::Surface(format!(
                "cannot draw dot at {center} with radius {radius}"
            )));
        }
        let id = ShapeId(self.next_shape);
        self.next_shape = self.next_shape.wrapping_add(1);
        self.dots.push(Dot { id, center, radius, style: *style });
        Ok(id)
    }
}
