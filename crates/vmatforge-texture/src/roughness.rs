//! Roughness map synthesis from a base color texture.
//!
//! The legacy assets carry no microsurface data, so roughness is
//! approximated as inverted albedo luminance: dark, matte-looking texels end
//! up rough, bright texels end up smooth. An operator-provided darkness
//! setting scales the result toward zero.

use crate::buffer::{GrayBuffer, RgbBuffer};

/// Default darkness setting when the operator does not override it.
pub const DEFAULT_DARKNESS: u8 = 128;

/// Pixels below this value are clamped to zero by the shiny-surface pass.
pub const SHINY_FLOOR_THRESHOLD: u8 = 30;

/// Integer ITU-R 601 luminance, matching the grayscale conversion the
/// reference pipeline used.
#[inline]
pub fn luminance(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb;
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Derives a roughness map from a base color texture.
///
/// Per pixel: luminance, inverted, then scaled by
/// `(255 - darkness) / 255` with round-to-nearest. `darkness = 0` is a plain
/// invert; `darkness = 255` collapses the whole map to zero.
pub fn roughness_from_albedo(albedo: &RgbBuffer, darkness: u8) -> GrayBuffer {
    let factor = 255 - darkness as u32;
    let data = albedo
        .pixels()
        .map(|rgb| {
            let inverted = 255 - luminance(rgb) as u32;
            ((inverted * factor + 127) / 255) as u8
        })
        .collect();
    GrayBuffer::from_raw(albedo.width, albedo.height, data)
}

/// Shiny-surface pass: clamps any pixel below [`SHINY_FLOOR_THRESHOLD`] to
/// zero, exaggerating near-specular regions. Idempotent: every qualifying
/// pixel is already zero after one application.
pub fn apply_shiny_floor(map: &mut GrayBuffer) {
    for value in &mut map.data {
        if *value < SHINY_FLOOR_THRESHOLD {
            *value = 0;
        }
    }
}
