//! Range rings, bearing ticks and label anchors.
//!
//! The ring layer only changes when the display range or heading changes, so
//! it is redrawn lazily: setters mark it dirty and [`RingCompositor::redraw`]
//! repaints on the next call.
//!
//! Ticks are laid out in the heading-up frame. A tick for bearing `b` is drawn
//! at screen angle `b - heading`, and the heading marker always points at
//! screen 0°.

use tracing::{debug, warn};

use scope_common::{Rgba8, ScopeConfig};

use crate::raster::{draw_aa_line, draw_aa_ring, normalize_angle, AngleTable};
use crate::surface::Surface;

/// Gap between the outermost ring and the mask edge, in pixels.
const RIM_MARGIN_PX: f32 = 1.5;

const RING_WIDTH_PX: f32 = 1.5;
const TICK_WIDTH_PX: f32 = 1.5;
const HEADING_LINE_WIDTH_PX: f32 = 1.0;

/// Tick lengths as fractions of the outer ring radius.
const MAJOR_TICK_FRACTION: f32 = 0.06;
const MINOR_TICK_FRACTION: f32 = 0.03;

const MINOR_TICK_ALPHA: f32 = 0.5;
const HEADING_LINE_ALPHA: f32 = 0.6;

/// Screen angle where range labels are anchored.
const RANGE_LABEL_ANGLE: f32 = 45.0;

const CARDINALS: [(f32, &str); 4] = [(0.0, "N"), (90.0, "E"), (180.0, "S"), (270.0, "W")];

/// Where a host should draw a text label, in polar display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnchor {
    /// Distance from the center as a fraction of the outer ring radius.
    pub radius_fraction: f32,
    /// Screen angle, 0° up, clockwise.
    pub angle_degrees: f32,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub range_nm: f32,
    pub ring_count: usize,
    pub major_tick_count: usize,
    pub minor_tick_count: usize,
    pub heading_degrees: f32,
}

impl RingGeometry {
    pub fn from_config(config: &ScopeConfig) -> Self {
        Self {
            range_nm: config.range_nm,
            ring_count: config.ring_count,
            major_tick_count: config.major_tick_count,
            minor_tick_count: config.minor_tick_count,
            heading_degrees: normalize_angle(config.heading_degrees),
        }
    }

    /// Screen angle of a true bearing in the heading-up frame.
    pub fn screen_angle(&self, bearing: f32) -> f32 {
        normalize_angle(bearing - self.heading_degrees)
    }

    /// Range labels at each ring plus the four cardinal bearings.
    pub fn label_anchors(&self) -> Vec<LabelAnchor> {
        let mut anchors = Vec::with_capacity(self.ring_count + CARDINALS.len());
        for k in 1..=self.ring_count {
            let fraction = k as f32 / self.ring_count as f32;
            anchors.push(LabelAnchor {
                radius_fraction: fraction,
                angle_degrees: RANGE_LABEL_ANGLE,
                text: format_range(self.range_nm * fraction),
            });
        }
        for (bearing, text) in CARDINALS {
            anchors.push(LabelAnchor {
                radius_fraction: 1.0,
                angle_degrees: self.screen_angle(bearing),
                text: text.to_string(),
            });
        }
        anchors
    }
}

/// Range in nautical miles with at most one decimal and no trailing zero.
pub fn format_range(nm: f32) -> String {
    let rounded = (nm * 10.0).round() / 10.0;
    if (rounded - rounded.round()).abs() < 1e-3 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

pub struct RingCompositor {
    surface: Surface,
    table: AngleTable,
    geometry: RingGeometry,
    color: Rgba8,
    dirty: bool,
}

impl RingCompositor {
    pub fn new(config: &ScopeConfig) -> Self {
        Self {
            surface: Surface::new(config.display_resolution),
            table: AngleTable::new(),
            geometry: RingGeometry::from_config(config),
            color: config.ring_color,
            dirty: true,
        }
    }

    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Change the display range. Non-positive or non-finite ranges are
    /// rejected and leave the rings untouched. Returns whether the layer was
    /// marked for redraw.
    pub fn set_range(&mut self, range_nm: f32) -> bool {
        if !(range_nm.is_finite() && range_nm > 0.0) {
            warn!(range_nm, "Ignoring invalid display range");
            return false;
        }
        if range_nm == self.geometry.range_nm {
            return false;
        }
        debug!(from = self.geometry.range_nm, to = range_nm, "Range changed");
        self.geometry.range_nm = range_nm;
        self.dirty = true;
        true
    }

    pub fn set_heading(&mut self, heading_degrees: f32) -> bool {
        if !heading_degrees.is_finite() {
            warn!("Ignoring non-finite heading");
            return false;
        }
        let heading = normalize_angle(heading_degrees);
        if heading == self.geometry.heading_degrees {
            return false;
        }
        self.geometry.heading_degrees = heading;
        self.dirty = true;
        true
    }

    /// Replace every geometry parameter at once. Marks the layer dirty only
    /// if something changed.
    pub fn set_geometry(&mut self, geometry: RingGeometry) {
        if geometry != self.geometry {
            self.geometry = geometry;
            self.dirty = true;
        }
    }

    pub fn label_anchors(&self) -> Vec<LabelAnchor> {
        self.geometry.label_anchors()
    }

    /// Outer ring radius in pixels.
    pub fn max_radius(&self) -> f32 {
        (self.surface.radius() - RIM_MARGIN_PX).max(0.0)
    }

    /// Repaint if dirty. Returns whether anything was drawn.
    pub fn redraw(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.render();
        self.dirty = false;
        true
    }

    fn render(&mut self) {
        self.surface.clear();
        let center = self.surface.center();
        let max_radius = self.max_radius();
        let g = self.geometry;

        if g.ring_count > 0 {
            for k in 1..=g.ring_count {
                let radius = k as f32 / g.ring_count as f32 * max_radius;
                draw_aa_ring(&mut self.surface, center, center, radius, self.color, RING_WIDTH_PX);
            }
        }

        let major_step = if g.major_tick_count > 0 {
            360.0 / g.major_tick_count as f32
        } else {
            0.0
        };
        for i in 0..g.major_tick_count {
            let screen = g.screen_angle(i as f32 * major_step);
            self.draw_tick(screen, max_radius * MAJOR_TICK_FRACTION, self.color);
        }

        if g.minor_tick_count > 0 {
            let minor_step = 360.0 / g.minor_tick_count as f32;
            let minor_color = self.color.scale_alpha(MINOR_TICK_ALPHA);
            for i in 0..g.minor_tick_count {
                let bearing = i as f32 * minor_step;
                if major_step > 0.0 && is_multiple_of(bearing, major_step) {
                    continue;
                }
                self.draw_tick(g.screen_angle(bearing), max_radius * MINOR_TICK_FRACTION, minor_color);
            }
        }

        let (dx, dy) = self.table.direction(0.0);
        draw_aa_line(
            &mut self.surface,
            center,
            center,
            center + dx * max_radius,
            center + dy * max_radius,
            self.color.scale_alpha(HEADING_LINE_ALPHA),
            HEADING_LINE_WIDTH_PX,
        );

        debug!(
            range_nm = g.range_nm,
            heading = g.heading_degrees,
            rings = g.ring_count,
            "Redrew range rings"
        );
    }

    fn draw_tick(&mut self, screen_angle: f32, length: f32, color: Rgba8) {
        let center = self.surface.center();
        let outer = self.max_radius();
        let inner = (outer - length).max(0.0);
        let (dx, dy) = self.table.direction(screen_angle);
        draw_aa_line(
            &mut self.surface,
            center + dx * inner,
            center + dy * inner,
            center + dx * outer,
            center + dy * outer,
            color,
            TICK_WIDTH_PX,
        );
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
}

fn is_multiple_of(value: f32, step: f32) -> bool {
    let q = value / step;
    (q - q.round()).abs() < 1e-3
}
