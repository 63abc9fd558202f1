//! Common fixtures for radar scope tests.

use std::io::Write;

use scope_common::{Rgba8, ScopeConfig};
use tempfile::NamedTempFile;

/// Colors of an intensity-encoded precipitation product, weakest first.
pub mod palette {
    use scope_common::Rgba8;

    pub const LIGHT_GREEN: Rgba8 = Rgba8::rgb(0, 200, 0);
    pub const MODERATE_YELLOW: Rgba8 = Rgba8::rgb(255, 230, 0);
    pub const STRONG_ORANGE: Rgba8 = Rgba8::rgb(255, 140, 0);
    pub const HEAVY_RED: Rgba8 = Rgba8::rgb(230, 20, 20);
    pub const EXTREME_MAGENTA: Rgba8 = Rgba8::rgb(250, 40, 250);

    pub const ALL: [Rgba8; 5] = [LIGHT_GREEN, MODERATE_YELLOW, STRONG_ORANGE, HEAVY_RED, EXTREME_MAGENTA];
}

/// Opaque background used by the fixture configs.
pub const TEST_BACKGROUND: Rgba8 = Rgba8::rgb(0, 20, 0);

/// A small scope that renders quickly: no glow, 4 s cycle, 8 s persistence
/// with 0.1 s decay steps, 5° reveal buffer.
pub fn small_config(resolution: usize) -> ScopeConfig {
    ScopeConfig {
        display_resolution: resolution,
        sweep_cycle_duration_secs: 4.0,
        trail_length_degrees: 30.0,
        trail_steps: 8,
        beam_width_px: 2.0,
        edge_fade_px: 2.0,
        glow_enabled: false,
        persistence_duration_secs: 8.0,
        decay_tick_interval_secs: 0.1,
        reveal_angle_buffer_degrees: 5.0,
        noise_floor: 0.05,
        background_color: TEST_BACKGROUND,
        ..ScopeConfig::default()
    }
}

/// [`small_config`] that applies frames to the whole display at once.
pub fn full_update_config(resolution: usize) -> ScopeConfig {
    ScopeConfig {
        use_progressive_reveal: false,
        ..small_config(resolution)
    }
}

/// Write `json` to a temporary file that lives as long as the handle.
pub fn temp_config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(json.as_bytes()).expect("write temp config");
    file
}

/// JSON rendering of a config, for round-tripping through files.
pub fn config_json(config: &ScopeConfig) -> String {
    serde_json::to_string_pretty(config).expect("serialize config")
}
