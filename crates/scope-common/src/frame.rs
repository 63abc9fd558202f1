//! Sensor frames handed to the return compositor by an external data source.

use crate::color::Rgba8;
use crate::error::{ScopeError, ScopeResult};

/// Pixel payload of a sensor frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    /// Intensity-encoded RGBA colors (4 bytes per pixel), classified on sampling.
    Color(Vec<u8>),
    /// Normalized intensities (one `f32` per pixel), used as-is.
    Intensity(Vec<f32>),
}

/// A single sampled value from a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Color(Rgba8),
    Intensity(f32),
}

/// An immutable rectangular sensor image of arbitrary resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFrame {
    width: usize,
    height: usize,
    payload: FramePayload,
}

impl SensorFrame {
    /// Build a frame from RGBA bytes in row-major order.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> ScopeResult<Self> {
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(ScopeError::InvalidFrame(format!(
                "{}x{} RGBA frame needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            payload: FramePayload::Color(pixels),
        })
    }

    /// Build a frame from normalized intensities in row-major order.
    pub fn from_intensity(width: usize, height: usize, values: Vec<f32>) -> ScopeResult<Self> {
        let expected = width * height;
        if values.len() != expected {
            return Err(ScopeError::InvalidFrame(format!(
                "{}x{} intensity frame needs {} values, got {}",
                width,
                height,
                expected,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            payload: FramePayload::Intensity(values),
        })
    }

    /// A zero-sized frame. Compositors treat it as a no-op.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            payload: FramePayload::Color(Vec::new()),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn payload(&self) -> &FramePayload {
        &self.payload
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read the frame pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<Sample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        match &self.payload {
            FramePayload::Color(px) => px.get(idx * 4..idx * 4 + 4).map(|c| Sample::Color(Rgba8::from_slice(c))),
            FramePayload::Intensity(v) => v.get(idx).copied().map(Sample::Intensity),
        }
    }

    /// Nearest-neighbor sample for display pixel `(x, y)` of a `target`-sized
    /// square raster, scaling each axis independently by frame size / target.
    ///
    /// Coordinates are clamped into the frame, so mismatched aspect ratios
    /// never index out of bounds.
    pub fn sample_nearest(&self, x: usize, y: usize, target: usize) -> Option<Sample> {
        if self.is_empty() || target == 0 {
            return None;
        }
        let sx = scale_coord(x, self.width, target);
        let sy = scale_coord(y, self.height, target);
        self.get(sx, sy)
    }
}

#[inline]
fn scale_coord(coord: usize, frame_extent: usize, target: usize) -> usize {
    let scaled = (coord as u64 * frame_extent as u64 / target as u64) as usize;
    scaled.min(frame_extent - 1)
}
