//! Configuration for the radar scope engine.
//!
//! Values are layered: defaults, then an optional JSON file, then `SCOPE_*`
//! environment variables. The engine only ever runs on a [`ScopeConfig::sanitized`]
//! copy, so zero or negative durations never reach the renderers.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Rgba8;
use crate::error::ScopeResult;

pub const MIN_RESOLUTION: usize = 16;
pub const MAX_RESOLUTION: usize = 8192;
pub const MIN_DURATION_SECS: f32 = 0.01;
pub const MIN_DECAY_INTERVAL_SECS: f32 = 0.001;
pub const MAX_RING_COUNT: usize = 64;
pub const MAX_TICK_COUNT: usize = 360;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Side length of every square raster, in pixels.
    pub display_resolution: usize,

    /// Seconds per full 360° sweep.
    pub sweep_cycle_duration_secs: f32,

    /// Angular length of the fading trail behind the beam.
    pub trail_length_degrees: f32,

    /// Number of discrete beams drawn to build the trail.
    pub trail_steps: usize,

    pub beam_width_px: f32,

    /// Width of the soft fade at the rim of the beam.
    pub edge_fade_px: f32,

    /// Draw a wider low-alpha bloom pass under the head of the trail.
    pub glow_enabled: bool,

    /// Seconds for a return to fade from full persistence to nothing.
    pub persistence_duration_secs: f32,

    /// Wall-clock cadence of the decay pass.
    pub decay_tick_interval_secs: f32,

    pub ring_count: usize,
    pub major_tick_count: usize,
    pub minor_tick_count: usize,

    /// Reveal new returns sector by sector behind the sweep instead of all at once.
    pub use_progressive_reveal: bool,

    /// Extra trailing angle re-sampled on every reveal call.
    pub reveal_angle_buffer_degrees: f32,

    /// Sampled intensities at or below this are ignored.
    pub noise_floor: f32,

    /// Display range in nautical miles (outermost ring).
    pub range_nm: f32,

    /// Own heading; compass marks are drawn heading-up.
    pub heading_degrees: f32,

    /// Offset added to every sampled intensity before the noise floor test.
    pub gain: f32,

    pub background_color: Rgba8,
    pub sweep_head_color: Rgba8,
    pub sweep_tail_color: Rgba8,
    pub ring_color: Rgba8,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            display_resolution: 512,
            sweep_cycle_duration_secs: 4.0,
            trail_length_degrees: 45.0,
            trail_steps: 24,
            beam_width_px: 3.0,
            edge_fade_px: 8.0,
            glow_enabled: true,
            persistence_duration_secs: 8.0,
            decay_tick_interval_secs: 0.1,
            ring_count: 4,
            major_tick_count: 12,
            minor_tick_count: 72,
            use_progressive_reveal: true,
            reveal_angle_buffer_degrees: 5.0,
            noise_floor: 0.05,
            range_nm: 20.0,
            heading_degrees: 0.0,
            gain: 0.0,
            background_color: Rgba8::new(4, 16, 8, 255),
            sweep_head_color: Rgba8::new(140, 255, 160, 255),
            sweep_tail_color: Rgba8::new(0, 110, 40, 255),
            ring_color: Rgba8::new(150, 220, 170, 200),
        }
    }
}

impl ScopeConfig {
    /// Parse configuration from a JSON string. Missing keys take defaults.
    pub fn from_json(json: &str) -> ScopeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ScopeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `SCOPE_*` environment variables that parse.
    pub fn apply_env(&mut self) {
        env_override("SCOPE_DISPLAY_RESOLUTION", &mut self.display_resolution);
        env_override("SCOPE_SWEEP_CYCLE_SECS", &mut self.sweep_cycle_duration_secs);
        env_override("SCOPE_TRAIL_LENGTH_DEGREES", &mut self.trail_length_degrees);
        env_override("SCOPE_TRAIL_STEPS", &mut self.trail_steps);
        env_override("SCOPE_PERSISTENCE_SECS", &mut self.persistence_duration_secs);
        env_override("SCOPE_DECAY_INTERVAL_SECS", &mut self.decay_tick_interval_secs);
        env_override("SCOPE_RING_COUNT", &mut self.ring_count);
        env_override("SCOPE_MAJOR_TICKS", &mut self.major_tick_count);
        env_override("SCOPE_MINOR_TICKS", &mut self.minor_tick_count);
        env_override("SCOPE_REVEAL_BUFFER_DEGREES", &mut self.reveal_angle_buffer_degrees);
        env_override("SCOPE_NOISE_FLOOR", &mut self.noise_floor);
        env_override("SCOPE_RANGE_NM", &mut self.range_nm);
        env_override("SCOPE_HEADING_DEGREES", &mut self.heading_degrees);
        env_override("SCOPE_GAIN", &mut self.gain);

        if let Ok(val) = std::env::var("SCOPE_PROGRESSIVE_REVEAL") {
            self.use_progressive_reveal = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = std::env::var("SCOPE_GLOW") {
            self.glow_enabled = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Degrees per second implied by the sweep cycle duration.
    pub fn angular_velocity(&self) -> f32 {
        if self.sweep_cycle_duration_secs.is_finite() && self.sweep_cycle_duration_secs > 0.0 {
            360.0 / self.sweep_cycle_duration_secs
        } else {
            0.0
        }
    }

    /// List every value that [`sanitized`](Self::sanitized) would have to change.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&self.display_resolution) {
            problems.push(format!(
                "display_resolution must be {}-{}, got {}",
                MIN_RESOLUTION, MAX_RESOLUTION, self.display_resolution
            ));
        }
        check_min(&mut problems, "sweep_cycle_duration_secs", self.sweep_cycle_duration_secs, MIN_DURATION_SECS);
        check_min(&mut problems, "persistence_duration_secs", self.persistence_duration_secs, MIN_DURATION_SECS);
        check_min(&mut problems, "decay_tick_interval_secs", self.decay_tick_interval_secs, MIN_DECAY_INTERVAL_SECS);
        check_min(&mut problems, "beam_width_px", self.beam_width_px, 1.0);
        check_range(&mut problems, "trail_length_degrees", self.trail_length_degrees, 0.0, 360.0);
        check_range(&mut problems, "reveal_angle_buffer_degrees", self.reveal_angle_buffer_degrees, 0.0, 360.0);
        check_range(&mut problems, "edge_fade_px", self.edge_fade_px, 0.0, f32::MAX);
        check_range(&mut problems, "noise_floor", self.noise_floor, 0.0, 0.99);
        check_range(&mut problems, "gain", self.gain, -1.0, 1.0);

        if self.trail_steps == 0 {
            problems.push("trail_steps must be > 0".to_string());
        }
        if self.ring_count > MAX_RING_COUNT {
            problems.push(format!("ring_count must be <= {}", MAX_RING_COUNT));
        }
        if self.major_tick_count > MAX_TICK_COUNT || self.minor_tick_count > MAX_TICK_COUNT {
            problems.push(format!("tick counts must be <= {}", MAX_TICK_COUNT));
        }
        if !(self.range_nm.is_finite() && self.range_nm > 0.0) {
            problems.push(format!("range_nm must be > 0, got {}", self.range_nm));
        }
        if !self.heading_degrees.is_finite() {
            problems.push("heading_degrees must be finite".to_string());
        }

        problems
    }

    /// Copy with every out-of-range value clamped to a safe value.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut c = self.clone();

        c.display_resolution = clamp_logged(
            "display_resolution",
            c.display_resolution,
            MIN_RESOLUTION,
            MAX_RESOLUTION,
        );
        c.sweep_cycle_duration_secs = floor_logged("sweep_cycle_duration_secs", c.sweep_cycle_duration_secs, MIN_DURATION_SECS);
        c.persistence_duration_secs = floor_logged("persistence_duration_secs", c.persistence_duration_secs, MIN_DURATION_SECS);
        c.decay_tick_interval_secs =
            floor_logged("decay_tick_interval_secs", c.decay_tick_interval_secs, MIN_DECAY_INTERVAL_SECS);
        c.beam_width_px = floor_logged("beam_width_px", c.beam_width_px, 1.0);
        c.trail_length_degrees = clamp_f32_logged("trail_length_degrees", c.trail_length_degrees, 0.0, 360.0);
        c.reveal_angle_buffer_degrees =
            clamp_f32_logged("reveal_angle_buffer_degrees", c.reveal_angle_buffer_degrees, 0.0, 360.0);
        c.edge_fade_px = clamp_f32_logged("edge_fade_px", c.edge_fade_px, 0.0, f32::MAX);
        c.noise_floor = clamp_f32_logged("noise_floor", c.noise_floor, 0.0, 0.99);
        c.gain = clamp_f32_logged("gain", c.gain, -1.0, 1.0);
        c.trail_steps = clamp_logged("trail_steps", c.trail_steps, 1, usize::MAX);
        c.ring_count = clamp_logged("ring_count", c.ring_count, 0, MAX_RING_COUNT);
        c.major_tick_count = clamp_logged("major_tick_count", c.major_tick_count, 0, MAX_TICK_COUNT);
        c.minor_tick_count = clamp_logged("minor_tick_count", c.minor_tick_count, 0, MAX_TICK_COUNT);

        if !(c.range_nm.is_finite() && c.range_nm > 0.0) {
            warn!(value = c.range_nm, fallback = defaults.range_nm, "Invalid range_nm, using default");
            c.range_nm = defaults.range_nm;
        }
        if !c.heading_degrees.is_finite() {
            warn!("Non-finite heading_degrees, using 0");
            c.heading_degrees = 0.0;
        }

        c
    }
}

fn env_override<T: FromStr>(name: &str, field: &mut T) {
    if let Ok(val) = std::env::var(name) {
        match val.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => warn!(var = name, value = %val, "Ignoring unparsable environment override"),
        }
    }
}

fn check_min(problems: &mut Vec<String>, name: &str, value: f32, min: f32) {
    if !(value.is_finite() && value >= min) {
        problems.push(format!("{} must be >= {}, got {}", name, min, value));
    }
}

fn check_range(problems: &mut Vec<String>, name: &str, value: f32, min: f32, max: f32) {
    if !(value.is_finite() && value >= min && value <= max) {
        problems.push(format!("{} must be {}-{}, got {}", name, min, max, value));
    }
}

fn floor_logged(name: &str, value: f32, min: f32) -> f32 {
    if value.is_finite() && value >= min {
        return value;
    }
    warn!(field = name, value, clamped = min, "Configuration value below safe minimum");
    min
}

fn clamp_f32_logged(name: &str, value: f32, min: f32, max: f32) -> f32 {
    if !value.is_finite() {
        warn!(field = name, clamped = min, "Non-finite configuration value");
        return min;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(field = name, value, clamped, "Configuration value out of range");
    }
    clamped
}

fn clamp_logged(name: &str, value: usize, min: usize, max: usize) -> usize {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(field = name, value, clamped, "Configuration value out of range");
    }
    clamped
}
