//! Texture decode and deterministic encode.
//!
//! Decoding accepts any of the formats the resolver probes for (png, tga,
//! jpg, jpeg, bmp) via the `image` crate. PNG output uses fixed compression
//! settings so identical inputs produce byte-identical files across runs.

use std::io::Write;
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use thiserror::Error;

use crate::buffer::{GrayBuffer, RgbBuffer};

/// Errors from texture I/O.
#[derive(Debug, Error)]
pub enum TextureIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// Output container for derived textures.
///
/// PNG is the canonical default; TGA remains available for pipelines that
/// still expect the legacy format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Tga,
}

impl OutputFormat {
    /// The file extension (without dot) for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Tga => "tga",
        }
    }

    /// Parses an extension string (case-insensitive, optional leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "tga" => Some(OutputFormat::Tga),
            _ => None,
        }
    }
}

/// Decodes a texture file into an RGB buffer, flattening any alpha.
pub fn load_rgb(path: &Path) -> Result<RgbBuffer, TextureIoError> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok(RgbBuffer::from_raw(width, height, img.into_raw()))
}

/// Writes an RGB buffer in the requested output format.
pub fn write_rgb(
    buffer: &RgbBuffer,
    path: &Path,
    format: OutputFormat,
) -> Result<(), TextureIoError> {
    match format {
        OutputFormat::Png => write_png(path, &buffer.data, buffer.width, buffer.height, ColorType::Rgb),
        OutputFormat::Tga => {
            image::save_buffer_with_format(
                path,
                &buffer.data,
                buffer.width,
                buffer.height,
                image::ExtendedColorType::Rgb8,
                image::ImageFormat::Tga,
            )?;
            Ok(())
        }
    }
}

/// Writes a grayscale buffer in the requested output format.
pub fn write_gray(
    buffer: &GrayBuffer,
    path: &Path,
    format: OutputFormat,
) -> Result<(), TextureIoError> {
    match format {
        OutputFormat::Png => write_png(
            path,
            &buffer.data,
            buffer.width,
            buffer.height,
            ColorType::Grayscale,
        ),
        OutputFormat::Tga => {
            image::save_buffer_with_format(
                path,
                &buffer.data,
                buffer.width,
                buffer.height,
                image::ExtendedColorType::L8,
                image::ImageFormat::Tga,
            )?;
            Ok(())
        }
    }
}

/// Deterministic PNG encode: fixed compression level, no filtering, no
/// variable metadata.
fn write_png(
    path: &Path,
    data: &[u8],
    width: u32,
    height: u32,
    color: ColorType,
) -> Result<(), TextureIoError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);

    let mut encoder = Encoder::new(&mut writer, width, height);
    encoder.set_color(color);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(Compression::Default);
    encoder.set_filter(FilterType::NoFilter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(data)?;
    png_writer.finish()?;

    writer.flush()?;
    Ok(())
}
