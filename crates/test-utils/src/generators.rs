//! Synthetic sensor frames with predictable, verifiable content.
//!
//! Positions on the display are given in polar form: compass angle (0° up,
//! clockwise) and a fraction of the display radius.

use scope_common::{Rgba8, SensorFrame};

/// Pixel coordinates on a `size x size` display for a polar position.
///
/// # Example
///
/// ```
/// use test_utils::display_point;
///
/// // Straight up, halfway out on a 100 pixel display
/// assert_eq!(display_point(100, 0.0, 0.5), (50, 25));
/// // Due east
/// assert_eq!(display_point(100, 90.0, 0.5), (75, 50));
/// ```
pub fn display_point(size: usize, angle_deg: f32, radius_fraction: f32) -> (usize, usize) {
    let center = size as f32 / 2.0;
    let r = center * radius_fraction;
    let rad = angle_deg.to_radians();
    let x = (center + rad.sin() * r).round().max(0.0) as usize;
    let y = (center - rad.cos() * r).round().max(0.0) as usize;
    (x.min(size - 1), y.min(size - 1))
}

/// An RGBA frame filled with one color.
pub fn solid_rgba_frame(width: usize, height: usize, color: Rgba8) -> SensorFrame {
    let pixels = color.to_bytes().repeat(width * height);
    SensorFrame::from_rgba(width, height, pixels).expect("solid frame has matching length")
}

/// An intensity frame filled with one value.
pub fn solid_intensity_frame(width: usize, height: usize, value: f32) -> SensorFrame {
    SensorFrame::from_intensity(width, height, vec![value; width * height])
        .expect("solid frame has matching length")
}

/// Intensity frame where pixels whose polar angle lies in
/// `[start_deg, end_deg)` carry `value` and everything else is 0.
/// The sector may wrap through north.
pub fn wedge_intensity_frame(size: usize, start_deg: f32, end_deg: f32, value: f32) -> SensorFrame {
    let center = size as f32 / 2.0;
    let span = (end_deg - start_deg).rem_euclid(360.0);
    let mut values = vec![0.0f32; size * size];
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let angle = dx.atan2(-dy).to_degrees().rem_euclid(360.0);
            if (angle - start_deg).rem_euclid(360.0) < span {
                values[y * size + x] = value;
            }
        }
    }
    SensorFrame::from_intensity(size, size, values).expect("wedge frame has matching length")
}

/// A circular echo for [`storm_intensity_frame`].
#[derive(Debug, Clone, Copy)]
pub struct StormCell {
    pub angle_deg: f32,
    pub range_fraction: f32,
    /// Radius in pixels.
    pub radius: f32,
    pub peak: f32,
}

/// Intensity frame of Gaussian-shaped storm cells; overlapping cells keep
/// the stronger value.
pub fn storm_intensity_frame(size: usize, cells: &[StormCell]) -> SensorFrame {
    let mut values = vec![0.0f32; size * size];
    for cell in cells {
        let (cx, cy) = display_point(size, cell.angle_deg, cell.range_fraction);
        let sigma = (cell.radius / 2.0).max(0.5);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - cx as f32;
                let dy = y as f32 - cy as f32;
                let d_sq = dx * dx + dy * dy;
                if d_sq > cell.radius * cell.radius {
                    continue;
                }
                let v = cell.peak * (-d_sq / (2.0 * sigma * sigma)).exp();
                let slot = &mut values[y * size + x];
                *slot = slot.max(v);
            }
        }
    }
    SensorFrame::from_intensity(size, size, values).expect("storm frame has matching length")
}

/// RGBA frame split into horizontal stripes, one per color.
pub fn striped_rgba_frame(width: usize, height: usize, colors: &[Rgba8]) -> SensorFrame {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let color = colors[(y * colors.len() / height.max(1)).min(colors.len() - 1)];
        for _ in 0..width {
            pixels.extend_from_slice(&color.to_bytes());
        }
    }
    SensorFrame::from_rgba(width, height, pixels).expect("striped frame has matching length")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_point_cardinals() {
        assert_eq!(display_point(64, 0.0, 1.0), (32, 0));
        assert_eq!(display_point(64, 180.0, 0.5), (32, 48));
        assert_eq!(display_point(64, 270.0, 0.5), (16, 32));
    }

    #[test]
    fn test_storm_cell_peak_at_center() {
        let cell = StormCell { angle_deg: 90.0, range_fraction: 0.5, radius: 4.0, peak: 0.8 };
        let frame = storm_intensity_frame(32, &[cell]);
        let (x, y) = display_point(32, 90.0, 0.5);
        match frame.get(x, y) {
            Some(scope_common::Sample::Intensity(v)) => assert!((v - 0.8).abs() < 1e-6),
            other => panic!("unexpected sample {:?}", other),
        }
    }
}
