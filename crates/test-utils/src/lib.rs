//! Shared test utilities for the radar scope workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic sensor frame generators
//! - Small scope configurations and palette colors
//! - Approximate-equality and mask assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two floats are within a tolerance (default `1e-4`).
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.1 + 0.2, 0.3);
/// assert_approx_eq!(180.0004, 180.0, 1e-3);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-4)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r, tol) = ($left as f64, $right as f64, $tol as f64);
        assert!(
            (l - r).abs() <= tol,
            "assertion failed: |{} - {}| = {} > {}",
            l,
            r,
            (l - r).abs(),
            tol
        );
    }};
}

/// Assert every pixel of an RGBA square outside the display disc is fully
/// transparent.
pub fn assert_mask_transparent(pixels: &[u8], size: usize) {
    let center = size as f32 / 2.0;
    let radius_sq = center * center;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if dx * dx + dy * dy > radius_sq {
                let alpha = pixels[(y * size + x) * 4 + 3];
                assert_eq!(alpha, 0, "pixel ({}, {}) outside mask has alpha {}", x, y, alpha);
            }
        }
    }
}
