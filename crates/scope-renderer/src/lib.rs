//! Raster compositing for a rotating radar scope display.
//!
//! The display is three square RGBA layers sharing one circular mask:
//! - [`returns`]: sensor returns with persistence decay
//! - [`rings`]: range rings, bearing ticks and the heading marker
//! - [`sweep`]: the rotating beam and its fading trail
//!
//! [`scope::RadarScope`] drives all three from a single `tick(dt)` loop.

pub mod colormap;
pub mod png;
pub mod raster;
pub mod returns;
pub mod rings;
pub mod scope;
pub mod surface;
pub mod sweep;

pub use colormap::{ColorLut, IntensityClassifier, LutBand};
pub use returns::ReturnCompositor;
pub use rings::{LabelAnchor, RingCompositor, RingGeometry};
pub use scope::{PublishedLayers, RadarScope, ScopeStats};
pub use surface::Surface;
pub use sweep::{SweepAdvance, SweepEvent, SweepRenderer, SweepState, SweepStyle};
