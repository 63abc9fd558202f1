//! PNG snapshots of scope surfaces.
//!
//! Two encodings are produced:
//! - **Indexed (color type 3)** when the image has at most 256 distinct
//!   colors. Scope layers usually do: background, a LUT's worth of return
//!   colors and the anti-aliased ring strokes.
//! - **RGBA (color type 6)** otherwise, e.g. for flattened composites with
//!   heavy trail blending.
//!
//! [`encode_auto`] picks between them.

use std::collections::HashMap;
use std::io::Write;

use rayon::prelude::*;

use scope_common::{Rgba8, ScopeError, ScopeResult};

use crate::surface::Surface;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const MAX_PALETTE_SIZE: usize = 256;

/// Images with at least this many pixels scan for colors in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// Encode a surface, choosing indexed or RGBA output.
pub fn encode_surface(surface: &Surface) -> ScopeResult<Vec<u8>> {
    encode_auto(surface.as_bytes(), surface.size(), surface.size())
}

/// Encode RGBA bytes as indexed PNG when the colors fit in a palette,
/// RGBA PNG otherwise.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> ScopeResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let palette = if width * height >= PARALLEL_THRESHOLD {
        build_palette_parallel(pixels)
    } else {
        build_palette(pixels)
    };

    match palette {
        Some((colors, indices)) => encode_indexed(width, height, &colors, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode RGBA bytes as a truecolor-with-alpha PNG.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> ScopeResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::with_capacity(pixels.len() / 2);
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, 6));

    let idat = deflate_rows(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode palette indices as an indexed PNG, adding a tRNS chunk when any
/// palette entry is translucent.
pub fn encode_indexed(width: usize, height: usize, palette: &[Rgba8], indices: &[u8]) -> ScopeResult<Vec<u8>> {
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(ScopeError::EncodeError(format!(
            "palette must have 1-{} entries, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }
    if indices.len() != width * height {
        return Err(ScopeError::EncodeError(format!(
            "expected {} indices for {}x{}, got {}",
            width * height,
            width,
            height,
            indices.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c.a < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c.a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_rows(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> ScopeResult<()> {
    if width == 0 || height == 0 {
        return Err(ScopeError::EncodeError(format!("empty image {}x{}", width, height)));
    }
    if pixels.len() != width * height * 4 {
        return Err(ScopeError::EncodeError(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        )));
    }
    Ok(())
}

/// IHDR payload: 8-bit depth, no interlace.
fn header(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8;
    ihdr[9] = color_type;
    ihdr
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

#[inline(always)]
fn unpack(packed: u32) -> Rgba8 {
    Rgba8::from(packed.to_le_bytes())
}

/// Palette and per-pixel indices, or `None` past 256 colors.
fn build_palette(pixels: &[u8]) -> Option<(Vec<Rgba8>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push(unpack(key));
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel variant of [`build_palette`]: per-chunk color sets are merged,
/// then pixels are mapped to indices in parallel.
fn build_palette_parallel(pixels: &[u8]) -> Option<(Vec<Rgba8>, Vec<u8>)> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let local_sets: Vec<Vec<u32>> = pixels
        .par_chunks(chunk_pixels * 4)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            seen.into_keys().collect()
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for key in local_sets.into_iter().flatten() {
        if lookup.contains_key(&key) {
            continue;
        }
        if palette.len() >= MAX_PALETTE_SIZE {
            return None;
        }
        lookup.insert(key, palette.len() as u8);
        palette.push(unpack(key));
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(chunk_pixels)
        .zip(pixels.par_chunks(chunk_pixels * 4))
        .for_each(|(out, chunk)| {
            for (slot, px) in out.iter_mut().zip(chunk.chunks_exact(4)) {
                *slot = lookup.get(&pack(px)).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Zlib-compress scanlines of `stride` bytes, each prefixed with filter 0.
fn deflate_rows(data: &[u8], stride: usize, height: usize) -> ScopeResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (stride + 1));
    for row in data.chunks_exact(stride).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| ScopeError::EncodeError(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ScopeError::EncodeError(format!("IDAT compression failed: {}", e)))
}
