//! 4-byte RGBA color value and the compositing helpers the rasterizers share.
//!
//! Colors are straight (not premultiplied) alpha. Two compositing rules are
//! used across the scope:
//! - **max-alpha-wins** ([`Rgba8::max_alpha`]): a new sample replaces the
//!   existing pixel only if its alpha is at least as high. Overlapping strokes
//!   stay stable and never get muddied by weaker draws.
//! - **over** ([`Rgba8::over`]): standard source-over blending, used when
//!   laying returns on top of the background and when flattening layers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Rgba8 = Rgba8 { r: 255, g: 255, b: 255, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Multiply the alpha channel by `factor` (clamped to 0-1).
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            a: to_channel(self.a as f32 * factor),
            ..self
        }
    }

    /// Alpha as a 0-1 float.
    #[inline]
    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Read a color from the first four bytes of an RGBA slice.
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// Linear interpolation of all four channels, `t` clamped to 0-1.
    pub fn lerp(from: Rgba8, to: Rgba8, t: f32) -> Rgba8 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let t_inv = 1.0 - t;
        Rgba8::new(
            to_channel(from.r as f32 * t_inv + to.r as f32 * t),
            to_channel(from.g as f32 * t_inv + to.g as f32 * t),
            to_channel(from.b as f32 * t_inv + to.b as f32 * t),
            to_channel(from.a as f32 * t_inv + to.a as f32 * t),
        )
    }

    /// Source-over blend of `fg` (at coverage `alpha`) onto `bg`.
    ///
    /// With an opaque background this is exactly
    /// `out = fg * alpha + bg * (1 - alpha)`. Translucent backgrounds use the
    /// general straight-alpha form. A zero result alpha returns `bg` unchanged.
    pub fn over(fg: Rgba8, bg: Rgba8, alpha: f32) -> Rgba8 {
        let a_f = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        let a_b = bg.alpha();
        let out_a = a_f + a_b * (1.0 - a_f);
        if out_a <= f32::EPSILON {
            return bg;
        }

        let blend = |f: u8, b: u8| -> u8 {
            to_channel((f as f32 * a_f + b as f32 * a_b * (1.0 - a_f)) / out_a)
        };

        Rgba8::new(
            blend(fg.r, bg.r),
            blend(fg.g, bg.g),
            blend(fg.b, bg.b),
            to_channel(out_a * 255.0),
        )
    }

    /// Layer `self` on top of `below` using its own alpha.
    pub fn composite_onto(self, below: Rgba8) -> Rgba8 {
        if self.a == 0 {
            return below;
        }
        Rgba8::over(self.with_alpha(255), below, self.alpha())
    }

    /// Keep-higher-alpha rule: `candidate` wins ties.
    #[inline]
    pub fn max_alpha(existing: Rgba8, candidate: Rgba8) -> Rgba8 {
        if candidate.a >= existing.a {
            candidate
        } else {
            existing
        }
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(v: [u8; 4]) -> Self {
        Rgba8::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(c: Rgba8) -> Self {
        c.to_bytes()
    }
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
pub fn parse_hex_color(hex: &str) -> Option<Rgba8> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    let r = channel(0)?;
    let g = channel(2)?;
    let b = channel(4)?;
    let a = if hex.len() == 8 { channel(6)? } else { 255 };

    Some(Rgba8::new(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_channel_rounds_and_clamps() {
        assert_eq!(to_channel(127.5), 128);
        assert_eq!(to_channel(-4.0), 0);
        assert_eq!(to_channel(300.0), 255);
    }

    #[test]
    fn test_over_zero_alpha_returns_background() {
        let bg = Rgba8::new(12, 34, 56, 255);
        assert_eq!(Rgba8::over(Rgba8::WHITE, bg, 0.0), bg);
    }
}
