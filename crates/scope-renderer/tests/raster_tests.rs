//! Tests for the anti-aliased primitives and angle helpers.

use scope_common::Rgba8;
use scope_renderer::raster::{
    angle_in_sector, draw_aa_line, draw_aa_ring, draw_radial_beam, normalize_angle, polar_angle,
    AngleTable,
};
use scope_renderer::Surface;
use test_utils::{assert_approx_eq, assert_mask_transparent};

const STROKE: Rgba8 = Rgba8::new(200, 255, 200, 255);

// ============================================================================
// Angle helpers
// ============================================================================

#[test]
fn test_normalize_angle_wraps() {
    assert_approx_eq!(normalize_angle(-90.0), 270.0);
    assert_approx_eq!(normalize_angle(720.0), 0.0);
    assert_approx_eq!(normalize_angle(359.5), 359.5);
    assert_approx_eq!(normalize_angle(-360.0), 0.0);
    assert_eq!(normalize_angle(f32::NAN), 0.0);
    assert_eq!(normalize_angle(f32::INFINITY), 0.0);
}

#[test]
fn test_normalize_angle_range_and_congruence() {
    let mut a = -1000.0f32;
    while a < 1000.0 {
        let n = normalize_angle(a);
        assert!((0.0..360.0).contains(&n), "normalize({}) = {}", a, n);
        let turns = (n - a) / 360.0;
        assert!((turns - turns.round()).abs() < 1e-3, "normalize({}) = {} not congruent", a, n);
        a += 7.3;
    }
}

#[test]
fn test_polar_angle_compass_convention() {
    assert_approx_eq!(polar_angle(0.0, -1.0), 0.0);
    assert_approx_eq!(polar_angle(1.0, 0.0), 90.0);
    assert_approx_eq!(polar_angle(0.0, 1.0), 180.0);
    assert_approx_eq!(polar_angle(-1.0, 0.0), 270.0);
    assert_approx_eq!(polar_angle(1.0, -1.0), 45.0);
    assert_eq!(polar_angle(0.0, 0.0), 0.0);
}

#[test]
fn test_angle_in_sector() {
    assert!(angle_in_sector(90.0, 100.0, 15.0));
    assert!(angle_in_sector(85.0, 100.0, 15.0));
    assert!(angle_in_sector(100.0, 100.0, 15.0));
    assert!(!angle_in_sector(84.0, 100.0, 15.0));
    assert!(!angle_in_sector(101.0, 100.0, 15.0));
    // Sector across north
    assert!(angle_in_sector(358.0, 3.0, 10.0));
    assert!(!angle_in_sector(350.0, 3.0, 10.0));
    assert!(angle_in_sector(200.0, 3.0, 360.0));
}

// ============================================================================
// Angle table
// ============================================================================

#[test]
fn test_angle_table_lookup() {
    let table = AngleTable::new();
    let (s, c) = table.sin_cos(90);
    assert_approx_eq!(s, 1.0);
    assert_approx_eq!(c, 0.0);
    assert_eq!(table.sin_cos(-90), table.sin_cos(270));
    assert_eq!(table.sin_cos(725), table.sin_cos(5));
}

#[test]
fn test_angle_table_direction() {
    let table = AngleTable::new();
    let (dx, dy) = table.direction(0.0);
    assert_approx_eq!(dx, 0.0);
    assert_approx_eq!(dy, -1.0);

    let (dx, dy) = table.direction(90.0);
    assert_approx_eq!(dx, 1.0);
    assert_approx_eq!(dy, 0.0);

    let (dx, dy) = table.direction(180.0);
    assert_approx_eq!(dx, 0.0);
    assert_approx_eq!(dy, 1.0);

    // Interpolated directions stay unit length and close to the exact value
    let (dx, dy) = table.direction(45.5);
    assert_approx_eq!(dx * dx + dy * dy, 1.0);
    assert_approx_eq!(dx, 45.5f32.to_radians().sin(), 1e-3);
}

// ============================================================================
// Lines
// ============================================================================

#[test]
fn test_line_center_full_alpha() {
    let mut surface = Surface::new(32);
    draw_aa_line(&mut surface, 8.0, 16.0, 24.0, 16.0, STROKE, 2.0);
    assert_eq!(surface.get(16, 16), STROKE);
    // Width 2 gives a half width of 1, so the next row is fully attenuated
    assert_eq!(surface.get(16, 17).a, 0);
}

#[test]
fn test_line_alpha_falls_off_with_distance() {
    let mut surface = Surface::new(32);
    draw_aa_line(&mut surface, 8.0, 16.0, 24.0, 16.0, STROKE, 4.0);
    assert_eq!(surface.get(16, 16).a, 255);
    assert_eq!(surface.get(16, 17).a, 128);
    assert_eq!(surface.get(16, 18).a, 0);
}

#[test]
fn test_line_max_alpha_keeps_stronger_stroke() {
    let mut surface = Surface::new(32);
    draw_aa_line(&mut surface, 8.0, 16.0, 24.0, 16.0, STROKE, 2.0);
    let weak = Rgba8::new(255, 0, 0, 40);
    draw_aa_line(&mut surface, 16.0, 8.0, 16.0, 24.0, weak, 2.0);
    // Crossing point keeps the stronger horizontal stroke
    assert_eq!(surface.get(16, 16), STROKE);
    // Elsewhere the weak stroke is visible
    assert_eq!(surface.get(16, 10), weak);
}

#[test]
fn test_line_respects_mask() {
    let mut surface = Surface::new(32);
    draw_aa_line(&mut surface, -50.0, -50.0, 80.0, 80.0, STROKE, 3.0);
    draw_aa_line(&mut surface, 0.0, 31.0, 31.0, 0.0, STROKE, 3.0);
    assert_mask_transparent(surface.as_bytes(), 32);
    assert!(surface.get(16, 16).a > 0);
}

#[test]
fn test_line_ignores_non_finite_endpoints() {
    let mut surface = Surface::new(16);
    surface.publish();
    draw_aa_line(&mut surface, f32::NAN, 0.0, 8.0, 8.0, STROKE, 2.0);
    draw_aa_line(&mut surface, 1e30, 0.0, -1e30, 8.0, STROKE, f32::INFINITY);
    assert!(surface.publish().is_none());
}

// ============================================================================
// Rings
// ============================================================================

#[test]
fn test_ring_pixels_on_radius() {
    let mut surface = Surface::new(32);
    draw_aa_ring(&mut surface, 16.0, 16.0, 10.0, STROKE, 2.0);
    assert_eq!(surface.get(26, 16).a, 255);
    assert_eq!(surface.get(16, 6).a, 255);
    assert_eq!(surface.get(16, 16).a, 0);
    assert_eq!(surface.get(27, 16).a, 0);
}

#[test]
fn test_ring_larger_than_mask_is_clipped() {
    let mut surface = Surface::new(32);
    draw_aa_ring(&mut surface, 16.0, 16.0, 20.0, STROKE, 3.0);
    assert_mask_transparent(surface.as_bytes(), 32);
}

// ============================================================================
// Radial beams
// ============================================================================

#[test]
fn test_beam_follows_angle() {
    let table = AngleTable::new();
    let mut surface = Surface::new(64);
    draw_radial_beam(&mut surface, &table, 32.0, 32.0, 32.0, 90.0, STROKE, 2.0, 8.0);

    assert_eq!(surface.get(48, 32).a, 255);
    assert_eq!(surface.get(32, 16).a, 0);
    assert_eq!(surface.get(16, 32).a, 0);
}

#[test]
fn test_beam_edge_fade() {
    let table = AngleTable::new();
    let mut surface = Surface::new(64);
    draw_radial_beam(&mut surface, &table, 32.0, 32.0, 32.0, 90.0, STROKE, 2.0, 8.0);

    let middle = surface.get(48, 32).a;
    let rim = surface.get(62, 32).a;
    assert!(rim > 0);
    assert!(rim < middle, "rim alpha {} should be below {}", rim, middle);
    assert_mask_transparent(surface.as_bytes(), 64);
}

#[test]
fn test_beam_without_fade_reaches_rim() {
    let table = AngleTable::new();
    let mut surface = Surface::new(64);
    draw_radial_beam(&mut surface, &table, 32.0, 32.0, 32.0, 180.0, STROKE, 2.0, 0.0);
    assert_eq!(surface.get(32, 63).a, 255);
}

#[test]
fn test_beam_with_huge_radius_stops_at_surface() {
    let table = AngleTable::new();
    let mut surface = Surface::new(32);
    draw_radial_beam(&mut surface, &table, 16.0, 16.0, 1.0e9, 90.0, STROKE, 2.0, 0.0);

    assert_eq!(surface.get(24, 16).a, 255);
    assert_eq!(surface.get(31, 16).a, 255);
    assert_mask_transparent(surface.as_bytes(), 32);
}

#[test]
fn test_beam_with_huge_width_is_bounded() {
    let table = AngleTable::new();
    let mut surface = Surface::new(32);
    draw_radial_beam(&mut surface, &table, 16.0, 16.0, 16.0, 0.0, STROKE, 1.0e9, 0.0);
    assert_mask_transparent(surface.as_bytes(), 32);
}

#[test]
fn test_beam_from_far_center_crosses_surface() {
    let table = AngleTable::new();
    let mut surface = Surface::new(32);
    // Center far to the left, beam pointing right (90°) along row 16
    draw_radial_beam(&mut surface, &table, -1.0e6, 16.0, 2.0e6, 90.0, STROKE, 2.0, 0.0);
    assert_eq!(surface.get(16, 16).a, 255);
    assert_eq!(surface.get(16, 8).a, 0);
}
