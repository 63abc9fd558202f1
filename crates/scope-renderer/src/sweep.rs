//! Rotating sweep beam with a fading trail.
//!
//! The sweep angle advances at a constant angular velocity. Every crossing
//! of a full rotation raises [`SweepEvent::Complete`] and every angle change
//! raises [`SweepEvent::AngleChanged`]; observers run synchronously inside
//! [`SweepRenderer::advance`].

use tracing::{debug, trace};

use scope_common::{Rgba8, ScopeConfig};

use crate::raster::{draw_radial_beam, normalize_angle, AngleTable};
use crate::surface::Surface;

/// Glow beams are this much wider than the main beam.
const GLOW_WIDTH_SCALE: f32 = 2.5;

/// Alpha multiplier for glow beams.
const GLOW_ALPHA_SCALE: f32 = 0.35;

/// Only trail steps this close to the head get a glow pass.
const GLOW_MAX_TRAIL_T: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepState {
    /// Current angle in `[0, 360)`, 0° up, clockwise.
    pub angle: f32,
    /// Degrees per second. Zero freezes the sweep.
    pub angular_velocity: f32,
    pub trail_length_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepEvent {
    Complete,
    AngleChanged(f32),
}

/// Outcome of one [`SweepRenderer::advance`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepAdvance {
    /// Full rotations crossed during this step.
    pub completed: u32,
    pub angle_changed: bool,
}

pub type SweepObserver = Box<dyn FnMut(&SweepEvent)>;

/// Visual parameters of the beam and trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepStyle {
    pub head_color: Rgba8,
    pub tail_color: Rgba8,
    pub beam_width: f32,
    pub edge_fade: f32,
    pub trail_steps: usize,
    pub glow: bool,
}

impl SweepStyle {
    pub fn from_config(config: &ScopeConfig) -> Self {
        Self {
            head_color: config.sweep_head_color,
            tail_color: config.sweep_tail_color,
            beam_width: config.beam_width_px,
            edge_fade: config.edge_fade_px,
            trail_steps: config.trail_steps.max(1),
            glow: config.glow_enabled,
        }
    }
}

pub struct SweepRenderer {
    surface: Surface,
    table: AngleTable,
    style: SweepStyle,
    // Kept in f64 so long runs of tiny steps do not drift.
    angle: f64,
    angular_velocity: f32,
    trail_length: f32,
    drawn_angle: Option<f32>,
    observers: Vec<SweepObserver>,
}

impl SweepRenderer {
    pub fn new(config: &ScopeConfig) -> Self {
        Self {
            surface: Surface::new(config.display_resolution),
            table: AngleTable::new(),
            style: SweepStyle::from_config(config),
            angle: 0.0,
            angular_velocity: config.angular_velocity(),
            trail_length: config.trail_length_degrees.clamp(0.0, 360.0),
            drawn_angle: None,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> SweepState {
        SweepState {
            angle: self.angle(),
            angular_velocity: self.angular_velocity,
            trail_length_degrees: self.trail_length,
        }
    }

    pub fn angle(&self) -> f32 {
        normalize_angle(self.angle as f32)
    }

    pub fn style(&self) -> &SweepStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: SweepStyle) {
        self.style = style;
        self.drawn_angle = None;
    }

    pub fn set_angular_velocity(&mut self, degrees_per_sec: f32) {
        self.angular_velocity = if degrees_per_sec.is_finite() { degrees_per_sec } else { 0.0 };
    }

    pub fn set_trail_length(&mut self, degrees: f32) {
        let degrees = if degrees.is_finite() { degrees.clamp(0.0, 360.0) } else { 0.0 };
        if degrees != self.trail_length {
            self.trail_length = degrees;
            self.drawn_angle = None;
        }
    }

    /// Jump to `angle`, notifying observers if it differs from the current one.
    pub fn set_angle(&mut self, angle: f32) {
        let angle = normalize_angle(angle);
        if angle != self.angle() {
            self.angle = angle as f64;
            self.emit(SweepEvent::AngleChanged(angle));
        }
    }

    /// Register a callback for sweep events.
    pub fn subscribe(&mut self, observer: impl FnMut(&SweepEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: SweepEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }

    /// Advance by `dt` seconds.
    ///
    /// NaN `dt` counts as zero and `dt` is clamped to `[0, one rotation]`, so
    /// an absurdly large step completes one sweep rather than many.
    pub fn advance(&mut self, dt: f32) -> SweepAdvance {
        let omega = self.angular_velocity;
        if !omega.is_finite() || omega == 0.0 {
            return SweepAdvance::default();
        }
        let dt = if dt.is_nan() { 0.0 } else { dt };
        let dt = dt.clamp(0.0, 360.0 / omega.abs());
        if dt == 0.0 {
            return SweepAdvance::default();
        }

        let previous = self.angle();
        let raw = self.angle + omega as f64 * dt as f64;
        let mut completed = (raw / 360.0).floor().abs() as u32;
        self.angle = raw.rem_euclid(360.0);

        // Angles a hair below 360 read back as 0 once narrowed to f32. Snap
        // them so the stored angle and the completion count agree.
        if self.angle >= 360.0 || self.angle as f32 >= 360.0 {
            self.angle = 0.0;
            if omega > 0.0 {
                completed += 1;
            } else {
                completed = completed.saturating_sub(1);
            }
        }

        for _ in 0..completed {
            debug!("Sweep complete");
            self.emit(SweepEvent::Complete);
        }

        let current = self.angle();
        let angle_changed = current != previous;
        if angle_changed {
            self.emit(SweepEvent::AngleChanged(current));
        }

        SweepAdvance {
            completed,
            angle_changed,
        }
    }

    pub fn needs_redraw(&self) -> bool {
        self.drawn_angle != Some(self.angle())
    }

    /// Render the beam and trail for the current angle. Returns false when the
    /// angle is unchanged since the last draw and nothing was redrawn.
    pub fn draw(&mut self) -> bool {
        let angle = self.angle();
        if self.drawn_angle == Some(angle) {
            return false;
        }

        self.surface.clear();
        let center = self.surface.center();
        let max_radius = self.surface.radius();
        let steps = self.style.trail_steps.max(1);
        let style = self.style;

        if style.glow {
            for step in 0..steps {
                let t = trail_position(step, steps);
                if t > GLOW_MAX_TRAIL_T {
                    continue;
                }
                let color = trail_color(&style, t).scale_alpha(GLOW_ALPHA_SCALE);
                draw_radial_beam(
                    &mut self.surface,
                    &self.table,
                    center,
                    center,
                    max_radius,
                    angle - t * self.trail_length,
                    color,
                    style.beam_width * GLOW_WIDTH_SCALE,
                    style.edge_fade,
                );
            }
        }

        for step in 0..steps {
            let t = trail_position(step, steps);
            draw_radial_beam(
                &mut self.surface,
                &self.table,
                center,
                center,
                max_radius,
                angle - t * self.trail_length,
                trail_color(&style, t),
                style.beam_width,
                style.edge_fade,
            );
        }

        trace!(angle, steps, "Drew sweep");
        self.drawn_angle = Some(angle);
        true
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
}

/// Trail parameter for a step: 1 for the oldest step, 0 for the head.
/// Steps are drawn oldest first.
fn trail_position(step: usize, steps: usize) -> f32 {
    if steps <= 1 {
        return 0.0;
    }
    1.0 - step as f32 / (steps - 1) as f32
}

/// Head-to-tail color at `t` with a smoothstep alpha falloff.
fn trail_color(style: &SweepStyle, t: f32) -> Rgba8 {
    let falloff = 1.0 - t * t * (3.0 - 2.0 * t);
    Rgba8::lerp(style.head_color, style.tail_color, t).scale_alpha(falloff)
}
