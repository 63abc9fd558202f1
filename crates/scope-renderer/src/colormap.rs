//! Intensity color lookup and the color-to-intensity classifier.
//!
//! The LUT maps a normalized intensity in `[0, 1]` to one of 256 display
//! colors built from piecewise-linear bands. The classifier goes the other
//! way: it recovers an approximate intensity from an intensity-encoded sensor
//! color using an ordered list of channel-threshold rules.

use serde::Deserialize;
use tracing::debug;

use scope_common::{parse_hex_color, Rgba8, ScopeError, ScopeResult};

/// Number of LUT entries.
pub const LUT_SIZE: usize = 256;

/// Alpha shared by the default precipitation bands.
const PRECIP_ALPHA: u8 = 230;

/// One linear segment of the LUT: intensities in `[start, end)` ramp from
/// `from` to `to`. A band ending at 1.0 also covers 1.0 itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LutBand {
    pub start: f32,
    pub end: f32,
    pub from: Rgba8,
    pub to: Rgba8,
}

impl LutBand {
    pub const fn new(start: f32, end: f32, from: Rgba8, to: Rgba8) -> Self {
        Self { start, end, from, to }
    }

    fn contains(&self, v: f32) -> bool {
        v >= self.start && (v < self.end || (self.end >= 1.0 && v <= 1.0))
    }
}

/// Palette file band with hex color strings.
#[derive(Debug, Deserialize)]
struct BandDef {
    start: f32,
    end: f32,
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct PaletteDef {
    bands: Vec<BandDef>,
}

/// 256-entry intensity-to-color table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLut {
    entries: [Rgba8; LUT_SIZE],
}

impl ColorLut {
    /// Build a LUT from ascending, non-overlapping bands inside `[0, 1]`.
    /// Intensities not covered by any band are transparent.
    pub fn from_bands(bands: &[LutBand]) -> ScopeResult<Self> {
        let mut prev_end = 0.0f32;
        for (i, band) in bands.iter().enumerate() {
            let valid = band.start.is_finite()
                && band.end.is_finite()
                && band.start >= prev_end
                && band.end > band.start
                && band.end <= 1.0;
            if !valid {
                return Err(ScopeError::invalid_parameter(
                    "bands",
                    format!("band {} [{}, {}) is out of order or outside 0-1", i, band.start, band.end),
                ));
            }
            prev_end = band.end;
        }

        Ok(Self {
            entries: fill_entries(bands),
        })
    }

    /// Parse a palette from JSON: `{"bands": [{"start": 0.05, "end": 0.45,
    /// "from": "#006e00e6", "to": "#00ff00e6"}, ...]}`.
    pub fn from_json(json: &str) -> ScopeResult<Self> {
        let def: PaletteDef = serde_json::from_str(json)?;
        let mut bands = Vec::with_capacity(def.bands.len());
        for band in def.bands {
            let from = parse_hex_color(&band.from)
                .ok_or_else(|| ScopeError::invalid_parameter("from", format!("bad color '{}'", band.from)))?;
            let to = parse_hex_color(&band.to)
                .ok_or_else(|| ScopeError::invalid_parameter("to", format!("bad color '{}'", band.to)))?;
            bands.push(LutBand::new(band.start, band.end, from, to));
        }
        debug!(bands = bands.len(), "Loaded color palette");
        Self::from_bands(&bands)
    }

    /// The default weather-radar ramp: green, yellow, orange, red, magenta.
    pub fn precipitation() -> Self {
        let a = PRECIP_ALPHA;
        let bands = [
            LutBand::new(0.05, 0.45, Rgba8::new(0, 110, 0, a), Rgba8::new(0, 255, 0, a)),
            LutBand::new(0.45, 0.65, Rgba8::new(255, 255, 0, a), Rgba8::new(255, 190, 0, a)),
            LutBand::new(0.65, 0.85, Rgba8::new(255, 165, 0, a), Rgba8::new(255, 90, 0, a)),
            LutBand::new(0.85, 0.95, Rgba8::new(255, 0, 0, a), Rgba8::new(210, 0, 30, a)),
            LutBand::new(0.95, 1.0, Rgba8::new(240, 0, 240, a), Rgba8::new(255, 100, 255, a)),
        ];
        Self {
            entries: fill_entries(&bands),
        }
    }

    /// LUT index for an intensity: `round(clamp(i, 0, 1) * 255)`.
    #[inline]
    pub fn index_for(intensity: f32) -> usize {
        if !intensity.is_finite() {
            return 0;
        }
        (intensity.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32).round() as usize
    }

    #[inline]
    pub fn lookup(&self, intensity: f32) -> Rgba8 {
        self.entries[Self::index_for(intensity)]
    }

    pub fn entries(&self) -> &[Rgba8; LUT_SIZE] {
        &self.entries
    }
}

fn fill_entries(bands: &[LutBand]) -> [Rgba8; LUT_SIZE] {
    let mut entries = [Rgba8::TRANSPARENT; LUT_SIZE];
    for (i, entry) in entries.iter_mut().enumerate() {
        let v = i as f32 / (LUT_SIZE - 1) as f32;
        if let Some(band) = bands.iter().find(|b| b.contains(v)) {
            let t = (v - band.start) / (band.end - band.start);
            *entry = Rgba8::lerp(band.from, band.to, t);
        }
    }
    entries
}

impl Default for ColorLut {
    fn default() -> Self {
        Self::precipitation()
    }
}

/// How a matched rule turns a color into an intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleValue {
    Fixed(f32),
    /// `min + (max - min) * green / 255`
    GreenScaled { min: f32, max: f32 },
}

/// One classifier rule. Rules are tried in order; the first match wins.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierRule {
    pub name: &'static str,
    /// Severity rank, higher is stronger.
    pub rank: u8,
    pub matches: fn(Rgba8) -> bool,
    pub value: RuleValue,
}

fn is_extreme(c: Rgba8) -> bool {
    c.r > 200 && c.b > 150 && c.g < 150
}

fn is_heavy(c: Rgba8) -> bool {
    c.r > 200 && c.g < 80 && c.b < 80
}

fn is_strong(c: Rgba8) -> bool {
    c.r > 200 && (80..180).contains(&c.g) && c.b < 80
}

fn is_moderate(c: Rgba8) -> bool {
    c.r > 200 && c.g >= 180 && c.b < 100
}

fn is_light(c: Rgba8) -> bool {
    c.g > 100 && c.r < 100 && c.b < 100
}

const PRECIPITATION_RULES: &[ClassifierRule] = &[
    ClassifierRule { name: "extreme", rank: 5, matches: is_extreme, value: RuleValue::Fixed(1.0) },
    ClassifierRule { name: "heavy", rank: 4, matches: is_heavy, value: RuleValue::Fixed(0.85) },
    ClassifierRule { name: "strong", rank: 3, matches: is_strong, value: RuleValue::Fixed(0.65) },
    ClassifierRule { name: "moderate", rank: 2, matches: is_moderate, value: RuleValue::Fixed(0.45) },
    ClassifierRule {
        name: "light",
        rank: 1,
        matches: is_light,
        value: RuleValue::GreenScaled { min: 0.25, max: 0.5 },
    },
];

/// Color-to-intensity heuristic for intensity-encoded sensor frames.
#[derive(Debug, Clone)]
pub struct IntensityClassifier {
    rules: Vec<ClassifierRule>,
}

impl IntensityClassifier {
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    /// Rules tuned for the standard precipitation palette.
    pub fn precipitation() -> Self {
        Self::new(PRECIPITATION_RULES.to_vec())
    }

    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    /// Approximate intensity of `color`. Fully transparent colors are 0;
    /// colors no rule matches fall back to brightness times alpha.
    pub fn classify(&self, color: Rgba8) -> f32 {
        if color.a == 0 {
            return 0.0;
        }
        match self.rules.iter().find(|rule| (rule.matches)(color)) {
            Some(rule) => match rule.value {
                RuleValue::Fixed(v) => v,
                RuleValue::GreenScaled { min, max } => min + (max - min) * color.g as f32 / 255.0,
            },
            None => {
                let brightness = color.r.max(color.g).max(color.b) as f32 / 255.0;
                brightness * color.alpha()
            }
        }
    }

    /// Severity rank of the first matching rule, 0 when none match.
    pub fn severity(&self, color: Rgba8) -> u8 {
        if color.a == 0 {
            return 0;
        }
        self.rules
            .iter()
            .find(|rule| (rule.matches)(color))
            .map_or(0, |rule| rule.rank)
    }
}

impl Default for IntensityClassifier {
    fn default() -> Self {
        Self::precipitation()
    }
}
