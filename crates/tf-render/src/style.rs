//! CSS-style fill colours.

use std::fmt;
use std::str::FromStr;

use crate::RenderError;

/// A straight-alpha sRGB fill colour.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FillStyle {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

impl FillStyle {
    pub const WHITE: FillStyle = FillStyle::rgba(255, 255, 255, 1.0);
    pub const BLACK: FillStyle = FillStyle::rgba(0, 0, 0, 1.0);
    pub const TRANSPARENT: FillStyle = FillStyle::rgba(0, 0, 0, 0.0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// `true` if drawing with this style changes nothing.
    pub fn is_invisible(&self) -> bool {
        self.a <= 0.0
    }
}

impl Default for FillStyle {
    /// Translucent white, the particle colour of the relay map.
    fn default() -> Self {
        FillStyle::rgba(255, 255, 255, 0.8)
    }
}

impl fmt::Display for FillStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`, `rgba(r,g,b,a)` and
/// a handful of colour names.  A missing closing parenthesis is tolerated,
/// since hand-written styles such as `"rgba(255,255,255,0.8"` exist in the
/// wild and browsers' canvas parsers are equally forgiving.
impl FromStr for FillStyle {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RenderError::InvalidStyle(s.to_string());
        let text = s.trim().to_ascii_lowercase();

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let functional = text
            .strip_prefix("rgba(")
            .map(|body| (body, true))
            .or_else(|| text.strip_prefix("rgb(").map(|body| (body, false)));
        if let Some((body, has_alpha)) = functional {
            let body = body.trim_end();
            let body = body.strip_suffix(')').unwrap_or(body);
            return parse_functional(body, has_alpha).ok_or_else(invalid);
        }

        named(&text).ok_or_else(invalid)
    }
}

fn parse_hex(hex: &str) -> Option<FillStyle> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(FillStyle::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        6 => Some(FillStyle::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(FillStyle::rgba(byte(0)?, byte(2)?, byte(4)?, f64::from(byte(6)?) / 255.0)),
        _ => None,
    }
}

fn parse_functional(body: &str, has_alpha: bool) -> Option<FillStyle> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let channel = |v: &str| -> Option<u8> {
        let x: f64 = v.parse().ok()?;
        x.is_finite().then(|| x.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = |v: &str| -> Option<f64> {
        let x: f64 = v.parse().ok()?;
        x.is_finite().then(|| x.clamp(0.0, 1.0))
    };
    match (parts.as_slice(), has_alpha) {
        ([r, g, b], _) => Some(FillStyle::rgb(channel(r)?, channel(g)?, channel(b)?)),
        ([r, g, b, a], true) => Some(FillStyle::rgba(channel(r)?, channel(g)?, channel(b)?, alpha(a)?)),
        _ => None,
    }
}

fn named(name: &str) -> Option<FillStyle> {
    Some(match name {
        "white"       => FillStyle::WHITE,
        "black"       => FillStyle::BLACK,
        "transparent" => FillStyle::TRANSPARENT,
        "red"         => FillStyle::rgb(255, 0, 0),
        "green"       => FillStyle::rgb(0, 128, 0),
        "blue"        => FillStyle::rgb(0, 0, 255),
        "yellow"      => FillStyle::rgb(255, 255, 0),
        "orange"      => FillStyle::rgb(255, 165, 0),
        _ => return None,
    })
}
