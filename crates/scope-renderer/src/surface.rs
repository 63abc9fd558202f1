//! Fixed-size square RGBA raster with a circular display mask.
//!
//! Every renderer owns exactly one `Surface`. Writes that land outside the
//! disc of radius `size / 2` centered at `(size / 2, size / 2)` are dropped,
//! so those pixels hold alpha 0 for the lifetime of the surface.
//!
//! Displays read a surface through [`Surface::publish`], which only hands out
//! the bytes when something changed since the previous publish.

use scope_common::Rgba8;

pub struct Surface {
    size: usize,
    pixels: Vec<u8>,
    center: f32,
    radius_sq: f32,
    changed: bool,
}

impl Surface {
    /// Allocate a fully transparent `size x size` surface.
    pub fn new(size: usize) -> Self {
        let center = size as f32 / 2.0;
        Self {
            size,
            pixels: vec![0u8; size * size * 4],
            center,
            radius_sq: center * center,
            changed: true,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Center coordinate shared by both axes.
    #[inline]
    pub fn center(&self) -> f32 {
        self.center
    }

    /// Radius of the display mask.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.center
    }

    /// Whether `(x, y)` lies on the display disc.
    #[inline]
    pub fn in_mask(&self, x: usize, y: usize) -> bool {
        let dx = x as f32 - self.center;
        let dy = y as f32 - self.center;
        dx * dx + dy * dy <= self.radius_sq
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.size + x) * 4
    }

    /// Pixel at `(x, y)`, transparent when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Rgba8 {
        if x >= self.size || y >= self.size {
            return Rgba8::TRANSPARENT;
        }
        let i = self.offset(x, y);
        Rgba8::from_slice(&self.pixels[i..i + 4])
    }

    /// Overwrite a pixel. Returns false if it is outside the mask.
    pub fn put(&mut self, x: usize, y: usize, color: Rgba8) -> bool {
        if x >= self.size || y >= self.size || !self.in_mask(x, y) {
            return false;
        }
        let i = self.offset(x, y);
        self.pixels[i..i + 4].copy_from_slice(&color.to_bytes());
        self.changed = true;
        true
    }

    /// Keep-higher-alpha write at signed coordinates, as used by the
    /// anti-aliased primitives.
    #[inline]
    pub fn blend_max(&mut self, x: i32, y: i32, color: Rgba8) {
        if color.a == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.size || y >= self.size || !self.in_mask(x, y) {
            return;
        }
        let i = self.offset(x, y);
        let existing = Rgba8::from_slice(&self.pixels[i..i + 4]);
        let out = Rgba8::max_alpha(existing, color);
        if out != existing {
            self.pixels[i..i + 4].copy_from_slice(&out.to_bytes());
            self.changed = true;
        }
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.changed = true;
    }

    /// Fill the disc with `color`, leaving the corners transparent.
    pub fn fill_mask(&mut self, color: Rgba8) {
        let bytes = color.to_bytes();
        for y in 0..self.size {
            for x in 0..self.size {
                let i = self.offset(x, y);
                let px = if self.in_mask(x, y) { bytes } else { [0; 4] };
                self.pixels[i..i + 4].copy_from_slice(&px);
            }
        }
        self.changed = true;
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw bytes for bulk passes. Callers must only touch pixels
    /// inside the mask and must call [`mark_changed`](Self::mark_changed).
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Hand the bytes to the display layer if they changed since the last
    /// publish.
    pub fn publish(&mut self) -> Option<&[u8]> {
        if !self.changed {
            return None;
        }
        self.changed = false;
        Some(&self.pixels)
    }
}
