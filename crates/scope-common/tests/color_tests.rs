//! Tests for the RGBA value type and compositing helpers.

use scope_common::color::{parse_hex_color, Rgba8};

// ============================================================================
// over-blend tests
// ============================================================================

#[test]
fn test_over_opaque_background_matches_linear_mix() {
    let fg = Rgba8::rgb(200, 100, 0);
    let bg = Rgba8::rgb(0, 0, 100);
    let out = Rgba8::over(fg, bg, 0.5);
    assert_eq!(out, Rgba8::new(100, 50, 50, 255));
}

#[test]
fn test_over_full_alpha_is_foreground() {
    let fg = Rgba8::rgb(10, 20, 30);
    let out = Rgba8::over(fg, Rgba8::BLACK, 1.0);
    assert_eq!(out, fg);
}

#[test]
fn test_over_transparent_background_keeps_foreground_color() {
    let fg = Rgba8::rgb(255, 0, 0);
    let out = Rgba8::over(fg, Rgba8::TRANSPARENT, 0.5);
    assert_eq!((out.r, out.g, out.b), (255, 0, 0));
    assert_eq!(out.a, 128);
}

#[test]
fn test_over_clamps_alpha() {
    let fg = Rgba8::rgb(255, 255, 255);
    let bg = Rgba8::BLACK;
    assert_eq!(Rgba8::over(fg, bg, 4.0), fg);
    assert_eq!(Rgba8::over(fg, bg, -1.0), bg);
    assert_eq!(Rgba8::over(fg, bg, f32::NAN), bg);
}

#[test]
fn test_composite_onto_uses_own_alpha() {
    let top = Rgba8::new(255, 255, 255, 0);
    let below = Rgba8::rgb(1, 2, 3);
    assert_eq!(top.composite_onto(below), below);

    let top = Rgba8::new(200, 0, 0, 255);
    assert_eq!(top.composite_onto(below), Rgba8::rgb(200, 0, 0));
}

// ============================================================================
// max-alpha tests
// ============================================================================

#[test]
fn test_max_alpha_keeps_stronger_existing() {
    let strong = Rgba8::new(255, 0, 0, 200);
    let weak = Rgba8::new(0, 255, 0, 100);
    assert_eq!(Rgba8::max_alpha(strong, weak), strong);
}

#[test]
fn test_max_alpha_candidate_wins_ties() {
    let a = Rgba8::new(255, 0, 0, 128);
    let b = Rgba8::new(0, 0, 255, 128);
    assert_eq!(Rgba8::max_alpha(a, b), b);
}

// ============================================================================
// lerp / alpha scaling tests
// ============================================================================

#[test]
fn test_lerp_endpoints_and_midpoint() {
    let a = Rgba8::new(0, 0, 0, 0);
    let b = Rgba8::new(200, 100, 50, 255);
    assert_eq!(Rgba8::lerp(a, b, 0.0), a);
    assert_eq!(Rgba8::lerp(a, b, 1.0), b);
    assert_eq!(Rgba8::lerp(a, b, 0.5), Rgba8::new(100, 50, 25, 128));
}

#[test]
fn test_scale_alpha() {
    let c = Rgba8::new(9, 9, 9, 200);
    assert_eq!(c.scale_alpha(0.5).a, 100);
    assert_eq!(c.scale_alpha(0.0).a, 0);
    assert_eq!(c.scale_alpha(2.0).a, 200);
}

// ============================================================================
// hex parsing tests
// ============================================================================

#[test]
fn test_parse_hex_color() {
    assert_eq!(parse_hex_color("#FF8000"), Some(Rgba8::rgb(255, 128, 0)));
    assert_eq!(parse_hex_color("00ff0080"), Some(Rgba8::new(0, 255, 0, 128)));
    assert_eq!(parse_hex_color("#FFF"), None);
    assert_eq!(parse_hex_color("#GGGGGG"), None);
}

#[test]
fn test_serde_as_array() {
    let c: Rgba8 = serde_json::from_str("[1, 2, 3, 4]").unwrap();
    assert_eq!(c, Rgba8::new(1, 2, 3, 4));
    assert_eq!(serde_json::to_string(&c).unwrap(), "[1,2,3,4]");
}
