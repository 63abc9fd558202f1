//! Tests for the intensity LUT and the color classifier.

use scope_common::{Rgba8, ScopeError};
use scope_renderer::colormap::{LUT_SIZE, RuleValue};
use scope_renderer::{ColorLut, IntensityClassifier, LutBand};
use test_utils::{assert_approx_eq, palette};

// ============================================================================
// Default precipitation LUT
// ============================================================================

#[test]
fn test_precipitation_lut_below_threshold_is_transparent() {
    let lut = ColorLut::precipitation();
    assert_eq!(lut.lookup(0.0), Rgba8::TRANSPARENT);
    assert_eq!(lut.lookup(0.04), Rgba8::TRANSPARENT);
    assert_eq!(lut.lookup(-3.0), Rgba8::TRANSPARENT);
}

#[test]
fn test_precipitation_lut_bands() {
    let lut = ColorLut::precipitation();

    let green = lut.lookup(0.3);
    assert!(green.g > 150 && green.r == 0 && green.b == 0, "{:?}", green);

    let yellow = lut.lookup(0.5);
    assert!(yellow.r == 255 && yellow.g > 200 && yellow.b == 0, "{:?}", yellow);

    let orange = lut.lookup(0.75);
    assert!(orange.r == 255 && (90..=165).contains(&orange.g), "{:?}", orange);

    let red = lut.lookup(0.9);
    assert!(red.r > 200 && red.g == 0, "{:?}", red);

    let magenta = lut.lookup(1.0);
    assert!(magenta.r > 200 && magenta.b > 200, "{:?}", magenta);
    assert_eq!(lut.lookup(7.0), magenta);
}

#[test]
fn test_precipitation_lut_is_monotone_in_severity() {
    let lut = ColorLut::precipitation();
    let classifier = IntensityClassifier::precipitation();
    let ranks: Vec<u8> = lut.entries().iter().map(|c| classifier.severity(*c)).collect();

    for (i, pair) in ranks.windows(2).enumerate() {
        assert!(pair[0] <= pair[1], "severity drops between entries {} and {}: {:?}", i, i + 1, pair);
    }
    assert_eq!(ranks[0], 0);
    assert_eq!(ranks[LUT_SIZE - 1], 5);
}

// ============================================================================
// Custom LUTs
// ============================================================================

#[test]
fn test_from_bands_interpolates() {
    let lut = ColorLut::from_bands(&[LutBand::new(0.0, 1.0, Rgba8::BLACK, Rgba8::WHITE)]).unwrap();
    assert_eq!(lut.lookup(0.0), Rgba8::BLACK);
    assert_eq!(lut.lookup(1.0), Rgba8::WHITE);
    let mid = lut.lookup(0.5);
    assert!((127..=129).contains(&mid.r));
}

#[test]
fn test_from_bands_gaps_are_transparent() {
    let lut = ColorLut::from_bands(&[LutBand::new(0.5, 1.0, Rgba8::BLACK, Rgba8::WHITE)]).unwrap();
    assert_eq!(lut.lookup(0.25), Rgba8::TRANSPARENT);
    assert_eq!(lut.lookup(0.75).a, 255);
}

#[test]
fn test_from_bands_rejects_overlap() {
    let result = ColorLut::from_bands(&[
        LutBand::new(0.0, 0.6, Rgba8::BLACK, Rgba8::WHITE),
        LutBand::new(0.5, 1.0, Rgba8::BLACK, Rgba8::WHITE),
    ]);
    assert!(matches!(result, Err(ScopeError::InvalidParameter { .. })));
}

#[test]
fn test_from_bands_rejects_out_of_range() {
    let result = ColorLut::from_bands(&[LutBand::new(0.5, 1.5, Rgba8::BLACK, Rgba8::WHITE)]);
    assert!(result.is_err());
}

#[test]
fn test_from_json_hex_palette() {
    let json = r##"{
        "bands": [
            {"start": 0.1, "end": 0.5, "from": "#003300", "to": "#00ff00"},
            {"start": 0.5, "end": 1.0, "from": "#ff000080", "to": "#ff0000"}
        ]
    }"##;
    let lut = ColorLut::from_json(json).unwrap();
    assert_eq!(lut.lookup(0.05), Rgba8::TRANSPARENT);
    // Entries are quantized to 1/255 steps, so band starts land just inside
    let low = lut.lookup(0.1);
    assert!(low.r == 0 && (0x33..=0x35).contains(&low.g), "{:?}", low);
    let translucent = lut.lookup(0.5);
    assert!(translucent.r == 255 && (0x80..=0x82).contains(&translucent.a), "{:?}", translucent);
    assert_eq!(lut.lookup(1.0), Rgba8::rgb(255, 0, 0));
}

#[test]
fn test_from_json_bad_color() {
    let json = r##"{"bands": [{"start": 0.0, "end": 1.0, "from": "green", "to": "#00ff00"}]}"##;
    let err = ColorLut::from_json(json).unwrap_err();
    assert!(matches!(err, ScopeError::InvalidParameter { ref param, .. } if param == "from"));
}

#[test]
fn test_from_json_malformed() {
    assert!(matches!(ColorLut::from_json("{bands"), Err(ScopeError::InvalidConfig(_))));
}

// ============================================================================
// Classifier
// ============================================================================

#[test]
fn test_classify_palette_colors() {
    let classifier = IntensityClassifier::precipitation();
    assert_approx_eq!(classifier.classify(palette::LIGHT_GREEN), 0.25 + 0.25 * 200.0 / 255.0);
    assert_approx_eq!(classifier.classify(palette::MODERATE_YELLOW), 0.45);
    assert_approx_eq!(classifier.classify(palette::STRONG_ORANGE), 0.65);
    assert_approx_eq!(classifier.classify(palette::HEAVY_RED), 0.85);
    assert_approx_eq!(classifier.classify(palette::EXTREME_MAGENTA), 1.0);
}

#[test]
fn test_classify_fallback_and_transparent() {
    let classifier = IntensityClassifier::precipitation();
    assert_approx_eq!(classifier.classify(Rgba8::rgb(128, 128, 128)), 128.0 / 255.0);
    assert_approx_eq!(classifier.classify(Rgba8::new(128, 128, 128, 51)), 128.0 / 255.0 * 0.2);
    assert_eq!(classifier.classify(Rgba8::new(255, 0, 0, 0)), 0.0);
    assert_eq!(classifier.classify(Rgba8::BLACK), 0.0);
}

#[test]
fn test_classify_lut_colors_by_band() {
    let lut = ColorLut::precipitation();
    let classifier = IntensityClassifier::precipitation();
    assert_approx_eq!(classifier.classify(lut.lookup(0.55)), 0.45);
    assert_approx_eq!(classifier.classify(lut.lookup(0.7)), 0.65);
    assert_approx_eq!(classifier.classify(lut.lookup(0.9)), 0.85);
    assert_approx_eq!(classifier.classify(lut.lookup(0.97)), 1.0);
}

#[test]
fn test_classifier_rules_are_ordered_by_severity() {
    let classifier = IntensityClassifier::precipitation();
    let ranks: Vec<u8> = classifier.rules().iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![5, 4, 3, 2, 1]);
    assert!(matches!(classifier.rules()[4].value, RuleValue::GreenScaled { .. }));
}

#[test]
fn test_custom_classifier() {
    fn is_blue(c: Rgba8) -> bool {
        c.b > 200
    }
    let classifier = IntensityClassifier::new(vec![scope_renderer::colormap::ClassifierRule {
        name: "blue",
        rank: 1,
        matches: is_blue,
        value: RuleValue::Fixed(0.3),
    }]);
    assert_approx_eq!(classifier.classify(Rgba8::rgb(0, 0, 255)), 0.3);
    assert_eq!(classifier.severity(Rgba8::rgb(0, 0, 255)), 1);
    assert_eq!(classifier.severity(Rgba8::rgb(255, 0, 0)), 0);
}
