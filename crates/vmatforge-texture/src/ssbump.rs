//! SSBump to normal/height map conversion.
//!
//! A self-shadowed bump map stores, per pixel, light response along three
//! fixed tetrahedral basis directions instead of a direct surface normal.
//! Projecting the pixel vector back through the transposed basis recovers a
//! tangent-space normal.
//!
//! The published converter variants disagree on the blend constant (0.5 vs
//! 0.55); this implementation canonicalizes on [`NORMAL_BLEND`] = 0.5.

use crate::buffer::{GrayBuffer, RgbBuffer};

const OO_SQRT_3: f64 = 0.577_350_258_827_209_47;

/// Transposed orthonormal tetrahedral bump basis. Row `i` produces output
/// channel `i` of the normal map.
pub const BUMP_BASIS_TRANSPOSE: [[f64; 3]; 3] = [
    [
        0.816_496_610_641_479_49,
        -0.408_248_335_123_062_13,
        -0.408_248_335_123_062_13,
    ],
    [0.0, 0.707_106_769_084_930_42, -0.707_106_828_689_575_2],
    [OO_SQRT_3, OO_SQRT_3, OO_SQRT_3],
];

/// Blend constant applied to the basis projection before biasing into the
/// [0, 255] channel range.
pub const NORMAL_BLEND: f64 = 0.5;

#[inline]
fn project(pixel: [f64; 3], basis: &[f64; 3]) -> u8 {
    let dot = pixel[0] * basis[0] + pixel[1] * basis[1] + pixel[2] * basis[2];
    (((dot * NORMAL_BLEND) + 0.5) * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Converts one SSBump pixel to a normal map pixel.
///
/// Pure: the result depends only on the input triple, so rows or files may
/// be converted in any order or in parallel.
#[inline]
pub fn normal_from_ssbump_pixel(rgb: [u8; 3]) -> [u8; 3] {
    let pixel = [
        rgb[0] as f64 / 255.0,
        rgb[1] as f64 / 255.0,
        rgb[2] as f64 / 255.0,
    ];
    [
        project(pixel, &BUMP_BASIS_TRANSPOSE[0]),
        project(pixel, &BUMP_BASIS_TRANSPOSE[1]),
        project(pixel, &BUMP_BASIS_TRANSPOSE[2]),
    ]
}

/// Converts a whole SSBump map to a tangent-space normal map.
pub fn ssbump_to_normal(ssbump: &RgbBuffer) -> RgbBuffer {
    let data = ssbump
        .pixels()
        .flat_map(normal_from_ssbump_pixel)
        .collect();
    RgbBuffer::from_raw(ssbump.width, ssbump.height, data)
}

/// Derives a height map from an SSBump map.
///
/// Per pixel: `255 * (1 - red / 255)`, which reduces to inverting the red
/// channel.
pub fn ssbump_to_height(ssbump: &RgbBuffer) -> GrayBuffer {
    let data = ssbump.pixels().map(|rgb| 255 - rgb[0]).collect();
    GrayBuffer::from_raw(ssbump.width, ssbump.height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_pixel_maps_to_neutral_normal() {
        // A zero vector projects to the bias point on every axis.
        assert_eq!(normal_from_ssbump_pixel([0, 0, 0]), [128, 128, 128]);
    }

    #[test]
    fn test_white_pixel_saturates_blue() {
        // dot with the OO_SQRT_3 row is sqrt(3) > 1, so blue clamps to 255.
        let [_, _, b] = normal_from_ssbump_pixel([255, 255, 255]);
        assert_eq!(b, 255);
    }

    #[test]
    fn test_transform_is_pure() {
        let pixel = [200, 90, 31];
        let expected = normal_from_ssbump_pixel(pixel);

        // The same triple in different surroundings and positions must
        // produce the same output.
        let mut ssbump = RgbBuffer::new(3, 2);
        ssbump.set(0, 0, pixel);
        ssbump.set(2, 1, pixel);
        ssbump.set(1, 0, [255, 255, 255]);

        let normal = ssbump_to_normal(&ssbump);
        assert_eq!(normal.get(0, 0), expected);
        assert_eq!(normal.get(2, 1), expected);
    }

    #[test]
    fn test_output_dimensions_match_input() {
        let ssbump = RgbBuffer::new(7, 3);
        assert_eq!(ssbump_to_normal(&ssbump).width, 7);
        assert_eq!(ssbump_to_height(&ssbump).height, 3);
    }

    #[test]
    fn test_height_inverts_red_channel() {
        let mut ssbump = RgbBuffer::new(2, 1);
        ssbump.set(0, 0, [0, 10, 20]);
        ssbump.set(1, 0, [200, 10, 20]);

        let height = ssbump_to_height(&ssbump);
        assert_eq!(height.get(0, 0), 255);
        assert_eq!(height.get(1, 0), 55);
    }
}
