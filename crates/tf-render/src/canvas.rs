//! `PixelCanvas` — an RGBA8 raster surface.
//!
//! Dots are rasterized with one sample per pixel centre and composited with
//! the canvas "source-over" rule on straight (non-premultiplied) alpha:
//!
//! ```text
//! αo = αs + αd·(1 − αs)
//! Co = (Cs·αs + Cd·αd·(1 − αs)) / αo
//! ```

use std::io::{self, Write};

use tf_core::{ScreenPoint, ShapeId};

use crate::{DrawSurface, FillStyle, RenderError, RenderResult};

pub struct PixelCanvas {
    width:  u32,
    height: u32,
    /// Row-major RGBA8.
    pixels: Vec<[u8; 4]>,
    next_shape: u32,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
            next_shape: 0,
        }
    }

    /// RGBA at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Number of pixels with non-zero alpha.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p[3] > 0).count()
    }

    /// Raw RGBA8 rows.
    pub fn as_rgba(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Write the canvas as a binary PPM (P6), compositing over `background`.
    pub fn write_ppm<W: Write>(&self, mut out: W, background: [u8; 3]) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut row = Vec::with_capacity(self.width as usize * 3);
        for line in self.pixels.chunks(self.width.max(1) as usize) {
            row.clear();
            for px in line {
                let a = f64::from(px[3]) / 255.0;
                for c in 0..3 {
                    let v = f64::from(px[c]) * a + f64::from(background[c]) * (1.0 - a);
                    row.push(v.round() as u8);
                }
            }
            out.write_all(&row)?;
        }
        Ok(())
    }

    fn blend(&mut self, x: u32, y: u32, style: &FillStyle) {
        let i = y as usize * self.width as usize + x as usize;
        let dst = self.pixels[i];
        let sa = style.a;
        let da = f64::from(dst[3]) / 255.0;
        let oa = sa + da * (1.0 - sa);
        if oa <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            let v = (f64::from(s) * sa + f64::from(d) * da * (1.0 - sa)) / oa;
            v.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[i] = [
            mix(style.r, dst[0]),
            mix(style.g, dst[1]),
            mix(style.b, dst[2]),
            (oa * 255.0).round().clamp(0.0, 255.0) as u8,
        ];
    }
}

impl DrawSurface for PixelCanvas {
    fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0; 4]; width as usize * height as usize];
    }

    fn clear(&mut self) {
        self.pixels.fill([0; 4]);
    }

    fn fill_dot(&mut self, center: ScreenPoint, radius: f64, style: &FillStyle) -> RenderResult<ShapeId> {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return Err(RenderError::Surface(format!(
                "cannot draw dot at {center} with radius {radius}"
            )));
        }
        let id = ShapeId(self.next_shape);
        self.next_shape = self.next_shape.wrapping_add(1);
        if style.is_invisible() || !self.is_ready() {
            return Ok(id);
        }

        // Pixel (x, y) is covered when its centre (x + ½, y + ½) is inside
        // the disc.  A radius under ½ still lights the pixel under the centre.
        let r = radius.max(0.5);
        let x0 = (center.x - r).floor().max(0.0);
        let y0 = (center.y - r).floor().max(0.0);
        let x1 = (center.x + r).ceil().min(f64::from(self.width));
        let y1 = (center.y + r).ceil().min(f64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return Ok(id); // entirely off-canvas
        }

        let r2 = r * r;
        for y in y0 as u32..y1 as u32 {
            let dy = f64::from(y) + 0.5 - center.y;
            for x in x0 as u32..x1 as u32 {
                let dx = f64::from(x) + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, style);
                }
            }
        }
        Ok(id)
    }
}
