//! 8-bit pixel grids the derivation transforms operate on.

/// Buffer length in bytes, widened before multiplying so dimensions whose
/// product exceeds `u32::MAX` do not wrap.
fn byte_len(width: u32, height: u32, channels: usize) -> usize {
    width as usize * height as usize * channels
}

/// A single-channel, row-major 8-bit buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data, one byte per pixel, row-major.
    pub data: Vec<u8>,
}

impl GrayBuffer {
    /// Creates a buffer filled with zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height, 1)],
        }
    }

    /// Wraps raw pixel data. Panics if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), byte_len(width, height, 1));
        Self {
            width,
            height,
            data,
        }
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.data[y as usize * self.width as usize + x as usize] = value;
    }
}

/// A three-channel, row-major 8-bit buffer (RGB interleaved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data, three bytes per pixel, row-major.
    pub data: Vec<u8>,
}

impl RgbBuffer {
    /// Creates a buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height, 3)],
        }
    }

    /// Wraps raw interleaved RGB data. Panics if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), byte_len(width, height, 3));
        Self {
            width,
            height,
            data,
        }
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Iterates pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }
}
