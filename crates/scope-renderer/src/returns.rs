//! Sensor returns with per-pixel persistence and timed decay.
//!
//! Each display pixel inside the mask carries an intensity and a persistence
//! value in `[0, 1]`. A pixel refreshed from a sensor frame starts at full
//! persistence and loses `decay_interval / persistence_duration` of it on
//! every decay step, blending its color back toward the background until it
//! is reset exactly to the background color.
//!
//! Frames are applied either all at once ([`ReturnCompositor::full_update`])
//! or progressively behind the sweep ([`ReturnCompositor::reveal`]), which
//! only resamples the sector the beam covered since the previous reveal.

use rayon::prelude::*;
use tracing::{debug, warn};

use scope_common::{Rgba8, Sample, ScopeConfig, SensorFrame};

use crate::colormap::{ColorLut, IntensityClassifier};
use crate::raster::{angle_in_sector, normalize_angle, polar_angle};
use crate::surface::Surface;

/// Persistence at or below this is treated as expired.
const PERSISTENCE_EPSILON: f32 = 0.01;

/// Slack when comparing the decay accumulator against the interval.
const ACCUMULATOR_SLACK: f64 = 1e-6;

const ANGLE_BUCKETS: usize = 360;

pub struct ReturnCompositor {
    surface: Surface,
    intensity: Vec<f32>,
    persistence: Vec<f32>,
    lut: ColorLut,
    classifier: IntensityClassifier,
    background: Rgba8,
    noise_floor: f32,
    gain: f32,
    persistence_duration: f32,
    decay_interval: f32,
    decay_accumulator: f64,
    reveal_buffer: f32,
    last_reveal_angle: Option<f32>,
    /// Polar angle of every pixel, indexed like `intensity`.
    pixel_angles: Vec<f32>,
    /// In-mask pixel indices grouped by integer degree of their polar angle.
    sectors: Vec<Vec<u32>>,
}

impl ReturnCompositor {
    pub fn new(config: &ScopeConfig) -> Self {
        Self::with_palette(config, ColorLut::precipitation(), IntensityClassifier::precipitation())
    }

    /// Build with a custom palette. Out-of-range configuration values are
    /// clamped first, so a compositor built outside [`crate::RadarScope`]
    /// never divides by a zero duration or allocates an empty raster.
    pub fn with_palette(config: &ScopeConfig, lut: ColorLut, classifier: IntensityClassifier) -> Self {
        let config = config.sanitized();
        let size = config.display_resolution;
        let mut surface = Surface::new(size);
        surface.fill_mask(config.background_color);

        let center = surface.center();
        let mut pixel_angles = vec![0.0f32; size * size];
        let mut sectors: Vec<Vec<u32>> = vec![Vec::new(); ANGLE_BUCKETS];
        for y in 0..size {
            for x in 0..size {
                if !surface.in_mask(x, y) {
                    continue;
                }
                let idx = y * size + x;
                let angle = polar_angle(x as f32 - center, y as f32 - center);
                pixel_angles[idx] = angle;
                sectors[(angle as usize).min(ANGLE_BUCKETS - 1)].push(idx as u32);
            }
        }

        Self {
            surface,
            intensity: vec![0.0; size * size],
            persistence: vec![0.0; size * size],
            lut,
            classifier,
            background: config.background_color,
            noise_floor: config.noise_floor,
            gain: config.gain,
            persistence_duration: config.persistence_duration_secs,
            decay_interval: config.decay_tick_interval_secs,
            decay_accumulator: 0.0,
            reveal_buffer: config.reveal_angle_buffer_degrees,
            last_reveal_angle: None,
            pixel_angles,
            sectors,
        }
    }

    pub fn size(&self) -> usize {
        self.surface.size()
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_finite() { gain.clamp(-1.0, 1.0) } else { 0.0 };
    }

    pub fn set_noise_floor(&mut self, noise_floor: f32) {
        if noise_floor.is_finite() {
            self.noise_floor = noise_floor.clamp(0.0, 0.99);
        }
    }

    pub fn lut(&self) -> &ColorLut {
        &self.lut
    }

    /// Resample every in-mask pixel from `frame`. Returns the number of
    /// pixels refreshed.
    pub fn full_update(&mut self, frame: &SensorFrame) -> usize {
        if frame.is_empty() {
            warn!("Empty sensor frame, keeping previous returns");
            return 0;
        }
        let size = self.size();
        let mut updated = 0;
        for y in 0..size {
            for x in 0..size {
                if self.surface.in_mask(x, y) && self.apply_sample(x, y, frame) {
                    updated += 1;
                }
            }
        }
        debug!(updated, width = frame.width(), height = frame.height(), "Applied full frame");
        updated
    }

    /// Resample the sector swept since the previous reveal, widened by the
    /// reveal buffer: every pixel with polar angle in
    /// `[angle - delta - buffer, angle]`.
    ///
    /// The first reveal (and any reveal whose angle is below the previous
    /// one, as after a wrap) uses a delta of zero.
    pub fn reveal(&mut self, sweep_angle: f32, frame: &SensorFrame) -> usize {
        let angle = normalize_angle(sweep_angle);
        let delta = match self.last_reveal_angle {
            Some(previous) => (angle - previous).max(0.0),
            None => 0.0,
        };
        self.last_reveal_angle = Some(angle);

        if frame.is_empty() {
            return 0;
        }

        let span = (delta + self.reveal_buffer).min(360.0);
        let size = self.size();
        let mut updated = 0;

        for bucket in sector_buckets(angle, span) {
            // Index loop: apply_sample needs &mut self while the bucket is borrowed.
            for i in 0..self.sectors[bucket].len() {
                let idx = self.sectors[bucket][i] as usize;
                if !angle_in_sector(self.pixel_angles[idx], angle, span) {
                    continue;
                }
                if self.apply_sample(idx % size, idx / size, frame) {
                    updated += 1;
                }
            }
        }
        updated
    }

    /// Restart progressive reveal from `angle` without sampling anything.
    pub fn reset_reveal_origin(&mut self, angle: f32) {
        self.last_reveal_angle = Some(normalize_angle(angle));
    }

    pub fn last_reveal_angle(&self) -> Option<f32> {
        self.last_reveal_angle
    }

    /// Write one fresh return at full persistence. Intensities at or below
    /// the noise floor are ignored.
    pub fn deposit(&mut self, x: usize, y: usize, intensity: f32) -> bool {
        if x >= self.size() || y >= self.size() || !self.surface.in_mask(x, y) {
            return false;
        }
        self.write_return(x, y, intensity)
    }

    fn apply_sample(&mut self, x: usize, y: usize, frame: &SensorFrame) -> bool {
        let raw = match frame.sample_nearest(x, y, self.size()) {
            Some(Sample::Color(c)) => self.classifier.classify(c),
            Some(Sample::Intensity(v)) if v.is_finite() => v,
            _ => return false,
        };
        self.write_return(x, y, raw + self.gain)
    }

    fn write_return(&mut self, x: usize, y: usize, intensity: f32) -> bool {
        let value = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 0.0 };
        if value <= self.noise_floor {
            return false;
        }
        let idx = y * self.size() + x;
        self.persistence[idx] = 1.0;
        self.intensity[idx] = value;
        let fg = self.lut.lookup(value);
        self.surface.put(x, y, Rgba8::over(fg, self.background, fg.alpha()))
    }

    /// Feed elapsed time to the decay clock and run one decay step per whole
    /// interval accumulated. Returns the number of steps run.
    pub fn decay(&mut self, elapsed: f32) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 || self.decay_interval <= 0.0 {
            return 0;
        }
        self.decay_accumulator += elapsed as f64;
        let interval = self.decay_interval as f64;

        let whole = ((self.decay_accumulator + ACCUMULATOR_SLACK) / interval).floor();
        if whole < 1.0 {
            return 0;
        }
        self.decay_accumulator = (self.decay_accumulator - whole * interval).max(0.0);

        // Past this many steps every return has expired anyway.
        let max_steps = (self.persistence_duration / self.decay_interval).ceil() as u32 + 1;
        let steps = whole.min(max_steps as f64) as u32;
        for _ in 0..steps {
            self.decay_step();
        }
        steps
    }

    /// One decay step over every pixel with live persistence.
    pub fn decay_step(&mut self) {
        let size = self.size();
        let step = self.decay_interval / self.persistence_duration;
        let background = self.background;
        let lut = &self.lut;
        let pixels = self.surface.bytes_mut();

        let touched = self
            .persistence
            .par_chunks_mut(size)
            .zip(self.intensity.par_chunks_mut(size))
            .zip(pixels.par_chunks_mut(size * 4))
            .map(|((persistence_row, intensity_row), pixel_row)| {
                let mut touched = false;
                for x in 0..size {
                    let p = persistence_row[x];
                    if p <= 0.0 {
                        continue;
                    }
                    let p = p - step;
                    let color = if p <= PERSISTENCE_EPSILON {
                        persistence_row[x] = 0.0;
                        intensity_row[x] = 0.0;
                        background
                    } else {
                        persistence_row[x] = p;
                        let fg = lut.lookup(intensity_row[x]);
                        Rgba8::over(fg, background, fg.alpha() * p)
                    };
                    pixel_row[x * 4..x * 4 + 4].copy_from_slice(&color.to_bytes());
                    touched = true;
                }
                touched
            })
            .reduce(|| false, |a, b| a || b);

        if touched {
            self.surface.mark_changed();
        }
    }

    pub fn persistence_at(&self, x: usize, y: usize) -> f32 {
        self.persistence.get(y * self.size() + x).copied().unwrap_or(0.0)
    }

    pub fn intensity_at(&self, x: usize, y: usize) -> f32 {
        self.intensity.get(y * self.size() + x).copied().unwrap_or(0.0)
    }

    /// Pixels that still carry a visible return.
    pub fn active_returns(&self) -> usize {
        self.persistence.iter().filter(|p| **p > 0.0).count()
    }

    /// Drop every return and repaint the background.
    pub fn clear(&mut self) {
        self.persistence.fill(0.0);
        self.intensity.fill(0.0);
        self.decay_accumulator = 0.0;
        self.last_reveal_angle = None;
        self.surface.fill_mask(self.background);
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
}

/// Integer-degree buckets that can hold pixels of the sector ending at
/// `end` and spanning `span` degrees.
fn sector_buckets(end: f32, span: f32) -> Vec<usize> {
    if span >= 360.0 {
        return (0..ANGLE_BUCKETS).collect();
    }
    let first = normalize_angle(end - span).floor() as i32;
    let mut last = end.floor() as i32;
    if last < first {
        last += ANGLE_BUCKETS as i32;
    }
    (first..=last)
        .map(|b| b.rem_euclid(ANGLE_BUCKETS as i32) as usize)
        .collect()
}
