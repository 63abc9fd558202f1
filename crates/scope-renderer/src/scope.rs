//! The radar scope engine: one sweep, one return layer and one ring layer
//! driven from a single update loop.

use serde::Serialize;
use tracing::{debug, info, warn};

use scope_common::{Rgba8, ScopeConfig, SensorFrame};

use crate::returns::ReturnCompositor;
use crate::rings::{LabelAnchor, RingCompositor};
use crate::surface::Surface;
use crate::sweep::{SweepAdvance, SweepEvent, SweepRenderer};

/// Counters accumulated over the engine's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopeStats {
    pub ticks: u64,
    pub sweeps_completed: u64,
    pub frames_applied: u64,
    pub frames_skipped: u64,
    pub pixels_revealed: u64,
    pub decay_steps: u64,
    pub ring_redraws: u64,
}

/// Layer bytes that changed since the previous publish.
#[derive(Debug, Default)]
pub struct PublishedLayers<'a> {
    pub returns: Option<&'a [u8]>,
    pub rings: Option<&'a [u8]>,
    pub sweep: Option<&'a [u8]>,
}

impl PublishedLayers<'_> {
    pub fn any(&self) -> bool {
        self.returns.is_some() || self.rings.is_some() || self.sweep.is_some()
    }
}

pub struct RadarScope {
    config: ScopeConfig,
    sweep: SweepRenderer,
    returns: ReturnCompositor,
    rings: RingCompositor,
    /// Frame being revealed behind the sweep in progressive mode.
    current_frame: Option<SensorFrame>,
    stats: ScopeStats,
}

impl RadarScope {
    /// Build all layers from `config`. Out-of-range values are clamped and
    /// logged rather than rejected.
    pub fn initialize(config: &ScopeConfig) -> Self {
        let config = config.sanitized();
        info!(
            resolution = config.display_resolution,
            cycle_secs = config.sweep_cycle_duration_secs,
            persistence_secs = config.persistence_duration_secs,
            progressive = config.use_progressive_reveal,
            range_nm = config.range_nm,
            "Initializing radar scope"
        );

        let mut rings = RingCompositor::new(&config);
        rings.redraw();

        Self {
            sweep: SweepRenderer::new(&config),
            returns: ReturnCompositor::new(&config),
            rings,
            current_frame: None,
            stats: ScopeStats {
                ring_redraws: 1,
                ..ScopeStats::default()
            },
            config,
        }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Advance the scope by `dt` seconds.
    ///
    /// Order within a tick: sweep advance, sweep redraw, progressive reveal
    /// of the retained frame, decay, then ring redraw if the rings are dirty.
    pub fn tick(&mut self, dt: f32) -> SweepAdvance {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.stats.ticks += 1;

        let advance = self.sweep.advance(dt);
        self.stats.sweeps_completed += advance.completed as u64;
        self.sweep.draw();

        if self.config.use_progressive_reveal && advance.angle_changed {
            if let Some(frame) = &self.current_frame {
                let revealed = self.returns.reveal(self.sweep.angle(), frame);
                self.stats.pixels_revealed += revealed as u64;
            }
        }

        self.stats.decay_steps += self.returns.decay(dt) as u64;

        if self.rings.redraw() {
            self.stats.ring_redraws += 1;
        }

        advance
    }

    /// Accept a new sensor frame. In progressive mode the frame is retained
    /// and revealed behind the sweep from the current angle onward; otherwise
    /// it is applied to the whole display at once. Empty frames are skipped.
    pub fn on_sensor_frame(&mut self, frame: SensorFrame) {
        if frame.is_empty() {
            warn!("Skipping empty sensor frame");
            self.stats.frames_skipped += 1;
            return;
        }
        self.stats.frames_applied += 1;

        if self.config.use_progressive_reveal {
            debug!(width = frame.width(), height = frame.height(), "Retained frame for progressive reveal");
            self.returns.reset_reveal_origin(self.sweep.angle());
            self.current_frame = Some(frame);
        } else {
            let updated = self.returns.full_update(&frame);
            self.stats.pixels_revealed += updated as u64;
        }
    }

    pub fn on_range_changed(&mut self, range_nm: f32) {
        if self.rings.set_range(range_nm) {
            self.config.range_nm = range_nm;
        }
    }

    pub fn on_heading_changed(&mut self, heading_degrees: f32) {
        if self.rings.set_heading(heading_degrees) {
            self.config.heading_degrees = self.rings.geometry().heading_degrees;
        }
    }

    /// Register a sweep event observer.
    pub fn subscribe(&mut self, observer: impl FnMut(&SweepEvent) + 'static) {
        self.sweep.subscribe(observer);
    }

    pub fn angle(&self) -> f32 {
        self.sweep.angle()
    }

    pub fn sweep(&self) -> &SweepRenderer {
        &self.sweep
    }

    pub fn sweep_mut(&mut self) -> &mut SweepRenderer {
        &mut self.sweep
    }

    pub fn returns(&self) -> &ReturnCompositor {
        &self.returns
    }

    pub fn returns_mut(&mut self) -> &mut ReturnCompositor {
        &mut self.returns
    }

    pub fn rings(&self) -> &RingCompositor {
        &self.rings
    }

    pub fn label_anchors(&self) -> Vec<LabelAnchor> {
        self.rings.label_anchors()
    }

    pub fn stats(&self) -> ScopeStats {
        self.stats
    }

    /// Changed layer bytes for the display, bottom to top.
    pub fn publish(&mut self) -> PublishedLayers<'_> {
        PublishedLayers {
            returns: self.returns.surface_mut().publish(),
            rings: self.rings.surface_mut().publish(),
            sweep: self.sweep.surface_mut().publish(),
        }
    }

    /// Flatten the layers into `out` as RGBA: returns, then rings, then the
    /// sweep on top.
    pub fn composite_into(&self, out: &mut Vec<u8>) {
        let layers: [&Surface; 3] = [self.returns.surface(), self.rings.surface(), self.sweep.surface()];
        let len = layers[0].as_bytes().len();
        out.clear();
        out.resize(len, 0);

        for (i, dst) in out.chunks_exact_mut(4).enumerate() {
            let offset = i * 4;
            let mut color = Rgba8::TRANSPARENT;
            for layer in layers {
                let src = Rgba8::from_slice(&layer.as_bytes()[offset..offset + 4]);
                color = src.composite_onto(color);
            }
            dst.copy_from_slice(&color.to_bytes());
        }
    }

    /// Stop the engine and hand back its counters.
    pub fn shutdown(self) -> ScopeStats {
        info!(
            ticks = self.stats.ticks,
            sweeps = self.stats.sweeps_completed,
            frames = self.stats.frames_applied,
            skipped = self.stats.frames_skipped,
            decay_steps = self.stats.decay_steps,
            "Radar scope shut down"
        );
        self.stats
    }
}
