//! Anti-aliased primitive rasterization shared by all scope layers.
//!
//! All angles use the display convention: 0° points up and angles grow
//! clockwise, in screen coordinates (x right, y down). Every primitive
//! composites with the keep-higher-alpha rule, so a stroke drawn over an
//! existing stronger stroke leaves it untouched.

use scope_common::Rgba8;

use crate::surface::Surface;

/// Radial distance between beam slices, in pixels.
const BEAM_RADIAL_STEP: f32 = 0.5;

/// Spacing of samples across a beam slice, in pixels.
const BEAM_SLICE_STEP: f32 = 0.5;

/// Wrap any finite angle into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Compass angle of the offset `(dx, dy)` from a center, in degrees.
/// The center itself (zero offset) is treated as 0°.
pub fn polar_angle(dx: f32, dy: f32) -> f32 {
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    normalize_angle(dx.atan2(-dy).to_degrees())
}

/// Whether `angle` lies in the sector that ends at `end` and extends `span`
/// degrees counter-clockwise from it (both bounds inclusive).
pub fn angle_in_sector(angle: f32, end: f32, span: f32) -> bool {
    if span >= 360.0 {
        return true;
    }
    let behind = normalize_angle(end - angle);
    behind <= span + 1e-4
}

/// Sine/cosine lookup over the 360 integer degrees.
#[derive(Debug, Clone)]
pub struct AngleTable {
    sin: [f32; 360],
    cos: [f32; 360],
}

impl AngleTable {
    pub fn new() -> Self {
        let mut sin = [0.0f32; 360];
        let mut cos = [0.0f32; 360];
        for deg in 0..360 {
            let rad = (deg as f32).to_radians();
            sin[deg] = rad.sin();
            cos[deg] = rad.cos();
        }
        Self { sin, cos }
    }

    /// `(sin, cos)` of an integer degree; any integer is accepted.
    #[inline]
    pub fn sin_cos(&self, degrees: i32) -> (f32, f32) {
        let i = degrees.rem_euclid(360) as usize;
        (self.sin[i], self.cos[i])
    }

    /// Unit screen-space direction for a compass angle, interpolated between
    /// the two neighboring table entries.
    pub fn direction(&self, angle: f32) -> (f32, f32) {
        let a = normalize_angle(angle);
        let lo = a.floor();
        let frac = a - lo;
        let (s0, c0) = self.sin_cos(lo as i32);
        let (s1, c1) = self.sin_cos(lo as i32 + 1);
        let s = s0 + (s1 - s0) * frac;
        let c = c0 + (c1 - c0) * frac;
        let len = (s * s + c * c).sqrt().max(f32::EPSILON);
        (s / len, -c / len)
    }
}

impl Default for AngleTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Bresenham-stepped line of the given width.
///
/// Each stepped pixel paints a disc of radius `width / 2`; a pixel's alpha is
/// the color alpha attenuated linearly by its distance from the ideal line.
pub fn draw_aa_line(
    surface: &mut Surface,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    color: Rgba8,
    width: f32,
) {
    if ![x0, y0, x1, y1, width].iter().all(|v| v.is_finite()) || color.a == 0 {
        return;
    }
    let half = (width * 0.5).max(0.5);
    let reach = half.ceil() as i32;

    let margin = reach as f32 + 1.0;
    let Some((x0, y0, x1, y1)) = clip_segment(
        x0,
        y0,
        x1,
        y1,
        -margin,
        surface.size() as f32 + margin,
    ) else {
        return;
    };

    let (mut x, mut y) = (x0.round() as i32, y0.round() as i32);
    let (ex, ey) = (x1.round() as i32, y1.round() as i32);
    let dx = (ex - x).abs();
    let dy = (ey - y).abs();
    let sx = if x < ex { 1 } else { -1 };
    let sy = if y < ey { 1 } else { -1 };
    let mut err = dx - dy;
    let half_sq = half * half;

    loop {
        for qy in (y - reach)..=(y + reach) {
            for qx in (x - reach)..=(x + reach) {
                let ox = (qx - x) as f32;
                let oy = (qy - y) as f32;
                if ox * ox + oy * oy > half_sq {
                    continue;
                }
                let d = distance_to_segment(qx as f32, qy as f32, x0, y0, x1, y1);
                let coverage = 1.0 - d / half;
                if coverage > 0.0 {
                    surface.blend_max(qx, qy, color.scale_alpha(coverage));
                }
            }
        }

        if x == ex && y == ey {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Circle of the given stroke width centered on `(cx, cy)`.
///
/// Pixels within `[radius - width, radius + width]` of the center get
/// alpha `1 - |distance from ring| / (width / 2)`, clamped to 0-1.
pub fn draw_aa_ring(surface: &mut Surface, cx: f32, cy: f32, radius: f32, color: Rgba8, width: f32) {
    if ![cx, cy, radius, width].iter().all(|v| v.is_finite()) || radius < 0.0 || color.a == 0 {
        return;
    }
    let half = (width * 0.5).max(0.5);
    let outer = radius + width.max(half);
    let inner = (radius - width.max(half)).max(0.0);

    let max_coord = surface.size() as i32 - 1;
    let x_start = ((cx - outer).floor() as i32).max(0);
    let x_end = ((cx + outer).ceil() as i32).min(max_coord);
    let y_start = ((cy - outer).floor() as i32).max(0);
    let y_end = ((cy + outer).ceil() as i32).min(max_coord);

    for y in y_start..=y_end {
        for x in x_start..=x_end {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if d < inner || d > outer {
                continue;
            }
            let coverage = (1.0 - (d - radius).abs() / half).clamp(0.0, 1.0);
            if coverage > 0.0 {
                surface.blend_max(x, y, color.scale_alpha(coverage));
            }
        }
    }
}

/// Radial beam from `(cx, cy)` out to `max_radius` along `angle`.
///
/// The beam is built from perpendicular slices every half pixel. Alpha falls
/// off linearly toward the slice edges and fades to zero over the last
/// `edge_fade` pixels before `max_radius`, giving a soft rim.
#[allow(clippy::too_many_arguments)]
pub fn draw_radial_beam(
    surface: &mut Surface,
    table: &AngleTable,
    cx: f32,
    cy: f32,
    max_radius: f32,
    angle: f32,
    color: Rgba8,
    width: f32,
    edge_fade: f32,
) {
    if ![cx, cy, max_radius, width].iter().all(|v| v.is_finite()) || max_radius <= 0.0 || color.a == 0 {
        return;
    }
    let (dx, dy) = table.direction(angle);
    let (px, py) = (-dy, dx);
    let edge_fade = if edge_fade.is_finite() { edge_fade.max(0.0) } else { 0.0 };
    let fade_start = max_radius - edge_fade;

    // Only radii between the nearest and farthest surface points can land
    // on a pixel.
    let size = surface.size() as f32;
    let far_x = cx.abs().max((size - cx).abs());
    let far_y = cy.abs().max((size - cy).abs());
    let reach = (far_x * far_x + far_y * far_y).sqrt() + 1.0;
    let near_x = (-cx).max(cx - size).max(0.0);
    let near_y = (-cy).max(cy - size).max(0.0);
    let near = (near_x * near_x + near_y * near_y).sqrt();
    let half = (width * 0.5).clamp(0.5, reach);
    let first_step = ((near - half - 1.0).max(0.0) / BEAM_RADIAL_STEP) as usize;
    let last_step = (max_radius.min(reach + half) / BEAM_RADIAL_STEP) as usize;
    let slice_steps = (2.0 * half / BEAM_SLICE_STEP) as usize;

    for i in first_step..=last_step {
        let r = i as f32 * BEAM_RADIAL_STEP;
        let edge = if edge_fade > 0.0 && r > fade_start {
            ((max_radius - r) / edge_fade).clamp(0.0, 1.0)
        } else {
            1.0
        };

        if edge > 0.0 {
            let bx = cx + dx * r;
            let by = cy + dy * r;
            for j in 0..=slice_steps {
                let o = -half + j as f32 * BEAM_SLICE_STEP;
                let alpha = (1.0 - o.abs() / half) * edge;
                if alpha > 0.0 {
                    let x = (bx + px * o).round() as i32;
                    let y = (by + py * o).round() as i32;
                    surface.blend_max(x, y, color.scale_alpha(alpha));
                }
            }
        }
    }
}

fn distance_to_segment(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return ((px - x0).powi(2) + (py - y0).powi(2)).sqrt();
    }
    let t = (((px - x0) * dx + (py - y0) * dy) / len_sq).clamp(0.0, 1.0);
    let nx = x0 + t * dx;
    let ny = y0 + t * dy;
    ((px - nx).powi(2) + (py - ny).powi(2)).sqrt()
}

/// Liang-Barsky clip of a segment to the square `[min, max]²`.
fn clip_segment(x0: f32, y0: f32, x1: f32, y1: f32, min: f32, max: f32) -> Option<(f32, f32, f32, f32)> {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [(-dx, x0 - min), (dx, max - x0), (-dy, y0 - min), (dy, max - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((x0 + t0 * dx, y0 + t0 * dy, x0 + t1 * dx, y0 + t1 * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment() {
        assert!((distance_to_segment(5.0, 3.0, 0.0, 0.0, 10.0, 0.0) - 3.0).abs() < 1e-5);
        // Beyond the end point, distance is to the end point
        assert!((distance_to_segment(13.0, 4.0, 0.0, 0.0, 10.0, 0.0) - 5.0).abs() < 1e-5);
        // Degenerate segment
        assert!((distance_to_segment(3.0, 4.0, 0.0, 0.0, 0.0, 0.0) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_clip_segment_inside_untouched() {
        let clipped = clip_segment(1.0, 1.0, 5.0, 5.0, 0.0, 10.0).unwrap();
        assert_eq!(clipped, (1.0, 1.0, 5.0, 5.0));
    }

    #[test]
    fn test_clip_segment_crossing() {
        let (x0, _, x1, _) = clip_segment(-100.0, 5.0, 100.0, 5.0, 0.0, 10.0).unwrap();
        assert!((x0 - 0.0).abs() < 1e-4);
        assert!((x1 - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_clip_segment_outside() {
        assert!(clip_segment(-5.0, -5.0, -1.0, -1.0, 0.0, 10.0).is_none());
    }
}
