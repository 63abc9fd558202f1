//! Common types shared by the radar scope renderer and its hosts.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;

pub use color::{parse_hex_color, Rgba8};
pub use config::ScopeConfig;
pub use error::{ScopeError, ScopeResult};
pub use frame::{FramePayload, Sample, SensorFrame};
