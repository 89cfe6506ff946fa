//! Conversion run configuration.

use std::path::PathBuf;
use std::time::Duration;

use vmatforge_texture::io::OutputFormat;
use vmatforge_texture::roughness::DEFAULT_DARKNESS;

/// Upper bound on the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 4;

/// Options for one batch conversion run, collected from the CLI.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Root of the material tree to convert (descriptors and textures).
    pub source_root: PathBuf,
    /// Where original descriptors are mirrored before conversion. `None`
    /// disables backups.
    pub backup_root: Option<PathBuf>,
    /// Container format for derived textures.
    pub output_format: OutputFormat,
    /// Roughness darkness setting, 0-255.
    pub darkness: u8,
    /// Whether to synthesize roughness maps from base color textures.
    pub generate_roughness: bool,
    /// Whether to synthesize height maps from SSBump textures.
    pub generate_height: bool,
    /// Whether to apply the shiny-surface floor to roughness maps.
    pub shiny_boost: bool,
    /// Whether to re-export resolved color textures in the output format.
    pub reexport_textures: bool,
    /// Whether to delete the original descriptor after a successful backup.
    pub remove_originals: bool,
    /// Worker pool size.
    pub workers: usize,
    /// Delay between transfer retries on a locked file.
    pub retry_delay: Duration,
}

impl ConvertConfig {
    /// Creates a config with defaults for everything but the source root.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            backup_root: None,
            output_format: OutputFormat::Png,
            darkness: DEFAULT_DARKNESS,
            generate_roughness: true,
            generate_height: true,
            shiny_boost: false,
            reexport_textures: false,
            remove_originals: false,
            workers: default_workers(),
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Default pool size: `min(4, available parallelism)`.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS)
}
