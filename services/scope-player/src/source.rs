//! Procedural echo source.
//!
//! Generates intensity frames from a handful of drifting storm cells plus
//! low-level clutter, so the player can exercise the scope without a real
//! sensor feed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use scope_common::{ScopeResult, SensorFrame};

/// Cells drifting faster than this (fraction of frame width per second)
/// would smear across a single sweep.
const MAX_DRIFT: f32 = 0.01;

/// Peak intensity of the speckle clutter near the center.
const CLUTTER_PEAK: f32 = 0.12;

#[derive(Debug, Clone)]
struct Cell {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    radius: f32,
    peak: f32,
    /// Peak change per second; cells grow and collapse.
    growth: f32,
}

pub struct EchoSource {
    rng: StdRng,
    size: usize,
    cells: Vec<Cell>,
    frames_generated: u64,
}

impl EchoSource {
    pub fn new(size: usize, cell_count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = (0..cell_count).map(|_| random_cell(&mut rng)).collect();
        Self {
            rng,
            size: size.max(1),
            cells,
            frames_generated: 0,
        }
    }

    pub fn frames_generated(&self) -> u64 {
        self.frames_generated
    }

    /// Move the cells forward by `dt` seconds and render the next frame.
    pub fn next_frame(&mut self, dt: f32) -> ScopeResult<SensorFrame> {
        self.evolve(dt);

        let size = self.size;
        let mut values = vec![0.0f32; size * size];
        for (i, value) in values.iter_mut().enumerate() {
            let u = (i % size) as f32 / size as f32;
            let v = (i / size) as f32 / size as f32;

            let mut intensity = self.clutter(u, v);
            for cell in &self.cells {
                let d = ((u - cell.x).powi(2) + (v - cell.y).powi(2)).sqrt() / cell.radius;
                if d < 1.0 {
                    // Smooth falloff with a hot core.
                    intensity = intensity.max(cell.peak * (1.0 - d * d));
                }
            }
            *value = intensity.clamp(0.0, 1.0);
        }

        self.frames_generated += 1;
        debug!(
            frame = self.frames_generated,
            cells = self.cells.len(),
            "Generated echo frame"
        );
        SensorFrame::from_intensity(size, size, values)
    }

    fn evolve(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for i in 0..self.cells.len() {
            let cell = &mut self.cells[i];
            cell.x += cell.vx * dt;
            cell.y += cell.vy * dt;
            cell.peak += cell.growth * dt;
            if cell.peak >= 1.0 {
                cell.peak = 1.0;
                cell.growth = -cell.growth.abs();
            }

            let gone = cell.peak <= 0.1 || !(-0.2..=1.2).contains(&cell.x) || !(-0.2..=1.2).contains(&cell.y);
            if gone {
                self.cells[i] = random_cell(&mut self.rng);
            }
        }
    }

    /// Ground clutter: noisy, strongest at the center, gone by a quarter of
    /// the frame.
    fn clutter(&mut self, u: f32, v: f32) -> f32 {
        let r = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt();
        if r > 0.25 {
            return 0.0;
        }
        let falloff = 1.0 - r / 0.25;
        self.rng.gen_range(0.0..CLUTTER_PEAK) * falloff
    }
}

fn random_cell(rng: &mut StdRng) -> Cell {
    Cell {
        x: rng.gen_range(0.1..0.9),
        y: rng.gen_range(0.1..0.9),
        vx: rng.gen_range(-MAX_DRIFT..MAX_DRIFT),
        vy: rng.gen_range(-MAX_DRIFT..MAX_DRIFT),
        radius: rng.gen_range(0.03..0.12),
        peak: rng.gen_range(0.3..0.8),
        growth: rng.gen_range(-0.02..0.05),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_common::Sample;

    #[test]
    fn test_frames_are_deterministic_per_seed() {
        let mut a = EchoSource::new(32, 4, 42);
        let mut b = EchoSource::new(32, 4, 42);
        let fa = a.next_frame(1.0).unwrap();
        let fb = b.next_frame(1.0).unwrap();
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(fa.get(x, y), fb.get(x, y));
            }
        }
    }

    #[test]
    fn test_frame_values_in_range() {
        let mut source = EchoSource::new(48, 6, 7);
        for _ in 0..5 {
            let frame = source.next_frame(10.0).unwrap();
            assert_eq!(frame.width(), 48);
            for y in 0..48 {
                for x in 0..48 {
                    match frame.get(x, y) {
                        Some(Sample::Intensity(v)) => assert!((0.0..=1.0).contains(&v)),
                        other => panic!("unexpected sample {:?}", other),
                    }
                }
            }
        }
        assert_eq!(source.frames_generated(), 5);
    }

    #[test]
    fn test_cells_respawn_after_collapse() {
        let mut source = EchoSource::new(16, 3, 1);
        for cell in &mut source.cells {
            cell.peak = 0.05;
        }
        source.evolve(0.0);
        assert!(source.cells.iter().all(|c| c.peak >= 0.3));
    }
}
