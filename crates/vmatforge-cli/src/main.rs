//! VMatForge CLI - batch VMT to VMAT material conversion
//!
//! This binary converts legacy VMT material descriptors into VMAT documents,
//! synthesizing the texture maps the new format expects along the way.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vmatforge_cli::commands;
use vmatforge_cli::config::{default_workers, ConvertConfig};
use vmatforge_texture::io::OutputFormat;
use vmatforge_texture::roughness::DEFAULT_DARKNESS;

/// VMatForge - VMT to VMAT Material Converter
#[derive(Parser)]
#[command(name = "vmatforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every VMT descriptor under a material tree
    Convert {
        /// Root directory of the material tree (descriptors and textures)
        #[arg(short, long)]
        source: String,

        /// Mirror original descriptors into this directory before converting
        #[arg(short, long)]
        backup: Option<String>,

        /// Output format for derived textures (png, tga)
        #[arg(long, default_value = "png", value_parser = ["png", "tga"])]
        format: String,

        /// Roughness darkness setting, 0-255 (higher means darker maps)
        #[arg(long, default_value_t = DEFAULT_DARKNESS)]
        darkness: u8,

        /// Skip roughness map synthesis
        #[arg(long)]
        no_roughness: bool,

        /// Skip height map synthesis from SSBump textures
        #[arg(long)]
        no_height: bool,

        /// Clamp near-specular roughness values to zero
        #[arg(long)]
        shiny_boost: bool,

        /// Re-export base color textures in the output format
        #[arg(long)]
        reexport_textures: bool,

        /// Delete original descriptors after a successful conversion
        #[arg(long, requires = "backup")]
        remove_originals: bool,

        /// Worker pool size (default: min(4, available cores))
        #[arg(short, long)]
        workers: Option<usize>,

        /// Write a JSON run summary to this path
        #[arg(long)]
        summary: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Parse one descriptor and print its conversion plan without writing
    Inspect {
        /// Path to the VMT descriptor
        #[arg(short, long)]
        descriptor: String,

        /// Material root for texture resolution (default: descriptor's directory)
        #[arg(short, long)]
        root: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            source,
            backup,
            format,
            darkness,
            no_roughness,
            no_height,
            shiny_boost,
            reexport_textures,
            remove_originals,
            workers,
            summary,
            json,
        } => {
            let mut config = ConvertConfig::new(&source);
            config.backup_root = backup.map(PathBuf::from);
            config.output_format =
                OutputFormat::from_extension(&format).expect("clap should have validated format");
            config.darkness = darkness;
            config.generate_roughness = !no_roughness;
            config.generate_height = !no_height;
            config.shiny_boost = shiny_boost;
            config.reexport_textures = reexport_textures;
            config.remove_originals = remove_originals;
            config.workers = workers.unwrap_or_else(default_workers);
            let summary = summary.map(PathBuf::from);
            commands::convert::run(config, summary.as_deref(), json)
        }
        Commands::Inspect {
            descriptor,
            root,
            json,
        } => {
            let root = root.map(PathBuf::from);
            commands::inspect::run(&PathBuf::from(descriptor), root.as_deref(), json)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
