//! Texture Derivation Engine
//!
//! Pure per-pixel transforms used by the VMT converter to synthesize the
//! maps the VMAT format expects but the legacy assets lack:
//!
//! - **Roughness-from-albedo**: inverted luminance with an operator-tunable
//!   darkness scale and an optional shiny-surface floor.
//! - **SSBump-to-normal/height**: projects self-shadowed bump pixels onto a
//!   fixed orthonormal tetrahedral basis to recover a tangent-space normal
//!   map, and derives a height map from the red channel.
//!
//! Both transforms are deterministic and stateless: identical input pixels
//! always yield identical output pixels, independent of surrounding pixels
//! or processing order, so callers may parallelize freely.
//!
//! Decoding goes through the `image` crate (png/tga/jpeg/bmp); PNG output
//! uses fixed encoder settings so re-runs produce byte-identical files.

pub mod buffer;
pub mod io;
pub mod roughness;
pub mod ssbump;

// Re-export main types for convenience
pub use buffer::{GrayBuffer, RgbBuffer};
pub use io::{load_rgb, write_gray, write_rgb, OutputFormat, TextureIoError};
pub use roughness::{apply_shiny_floor, roughness_from_albedo, DEFAULT_DARKNESS};
pub use ssbump::{ssbump_to_height, ssbump_to_normal};
