//! Attribute/texture mapping: descriptor attributes to a VMAT plan.
//!
//! The mapper decides which output fields and derived textures a job needs,
//! resolves declared texture names against the material tree, and rewrites
//! every emitted path to a material-relative forward-slash form. Missing
//! prerequisites are warnings, never failures: the dependent output fields
//! are simply omitted.

use std::path::{Path, PathBuf};

use vmatforge_vmt::{MaterialDescriptor, TextureRole, VmatDocument};

use crate::config::ConvertConfig;
use crate::job::Diagnostic;

/// Extension probe order for resolving declared texture names.
pub const EXTENSION_PRIORITY: [&str; 5] = ["png", "tga", "jpg", "jpeg", "bmp"];

/// Case-insensitive marker routing a bump map to the SSBump transform.
const SSBUMP_MARKER: &str = "ssbump";

/// Descriptor parameters whose absence is worth a log warning.
const EXPECTED_PARAMS: [&str; 7] = [
    "$basetexture",
    "$detail",
    "$detailscale",
    "$detailblendmode",
    "$detailblendfactor",
    "$surfaceprop",
    "%keywords",
];

/// Resolved texture role paths for one job. Populated once during mapping
/// and never mutated afterwards. Derived roles (roughness, normal-from-
/// SSBump, height) hold the planned output path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureReferences {
    pub color: Option<PathBuf>,
    pub normal: Option<PathBuf>,
    pub roughness: Option<PathBuf>,
    pub height: Option<PathBuf>,
    pub selfillum: Option<PathBuf>,
}

/// A texture the derivation engine or transfer utility must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// Synthesize a roughness map from the resolved color texture.
    Roughness { source: PathBuf, output: PathBuf },
    /// Convert an SSBump map into a normal map and optionally a height map.
    SsbumpMaps {
        source: PathBuf,
        normal: PathBuf,
        height: Option<PathBuf>,
    },
    /// Re-encode the color texture into the configured output format.
    Reexport { source: PathBuf, output: PathBuf },
}

/// Everything the runner needs to execute one job.
#[derive(Debug)]
pub struct JobPlan {
    pub vmat: VmatDocument,
    pub textures: TextureReferences,
    pub derivations: Vec<Derivation>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the conversion plan for one parsed descriptor.
pub fn plan_job(descriptor: &MaterialDescriptor, config: &ConvertConfig) -> JobPlan {
    let root = &config.source_root;
    let out_ext = config.output_format.extension();

    let mut vmat = VmatDocument::for_shader(descriptor.shader);
    let mut textures = TextureReferences::default();
    let mut derivations = Vec::new();
    let mut diagnostics = Vec::new();

    let missing: Vec<&str> = EXPECTED_PARAMS
        .iter()
        .copied()
        .filter(|param| descriptor.get(param).map_or(true, str::is_empty))
        .collect();
    if !missing.is_empty() {
        diagnostics.push(Diagnostic::warning(format!(
            "Missing parameters: {}",
            missing.join(", ")
        )));
    }

    // Base color, and roughness derived from it.
    match declared(descriptor, "$basetexture") {
        Some(name) => match resolve_texture(root, name) {
            Some(color_path) => {
                diagnostics.push(Diagnostic::info(format!(
                    "base texture found: {}",
                    color_path.display()
                )));
                vmat.set_texture(TextureRole::Color, material_relative(root, &color_path));

                if config.generate_roughness {
                    let output = derived_sibling(&color_path, "_roughness", out_ext);
                    vmat.set_texture(TextureRole::Roughness, material_relative(root, &output));
                    derivations.push(Derivation::Roughness {
                        source: color_path.clone(),
                        output: output.clone(),
                    });
                    textures.roughness = Some(output);
                }

                if config.reexport_textures && !has_extension(&color_path, out_ext) {
                    let output = color_path.with_extension(out_ext);
                    derivations.push(Derivation::Reexport {
                        source: color_path.clone(),
                        output,
                    });
                }

                if descriptor.attributes.contains("$selfillum") {
                    vmat.set_texture(
                        TextureRole::SelfIllum,
                        material_relative(root, &color_path),
                    );
                    textures.selfillum = Some(color_path.clone());
                }

                textures.color = Some(color_path);
            }
            None => diagnostics.push(Diagnostic::warning(format!(
                "texture file for '{}' not found",
                name
            ))),
        },
        None => diagnostics.push(Diagnostic::info("no $basetexture declared")),
    }

    // Bump map: either routed through the SSBump transform or used directly.
    let bump = declared(descriptor, "$bumpmap").or_else(|| declared(descriptor, "$normalmap"));
    match bump {
        Some(name) => match resolve_texture(root, name) {
            Some(bump_path) => {
                if is_ssbump(&bump_path) {
                    let stem = stripped_stem(&bump_path);
                    let normal = sibling(&bump_path, &format!("{}_normal.{}", stem, out_ext));
                    vmat.set_texture(TextureRole::Normal, material_relative(root, &normal));

                    let height = if config.generate_height {
                        let height = sibling(&bump_path, &format!("{}_height.{}", stem, out_ext));
                        vmat.set_texture(TextureRole::Height, material_relative(root, &height));
                        Some(height)
                    } else {
                        None
                    };

                    diagnostics.push(Diagnostic::info(format!(
                        "self-shadowed bump map found: {}",
                        bump_path.display()
                    )));
                    textures.normal = Some(normal.clone());
                    textures.height = height.clone();
                    derivations.push(Derivation::SsbumpMaps {
                        source: bump_path,
                        normal,
                        height,
                    });
                } else {
                    diagnostics.push(Diagnostic::info(format!(
                        "bump map found: {}",
                        bump_path.display()
                    )));
                    vmat.set_texture(TextureRole::Normal, material_relative(root, &bump_path));
                    textures.normal = Some(bump_path);
                }
            }
            None => diagnostics.push(Diagnostic::warning(format!(
                "bump map file for '{}' not found",
                name
            ))),
        },
        None => diagnostics.push(Diagnostic::info("no bump map declared")),
    }

    if descriptor.get("$phong") == Some("1") {
        vmat.set_param("g_flMetalness", "0.5");
    }

    if !descriptor.proxies.is_empty() {
        diagnostics.push(Diagnostic::info(format!(
            "{} proxy record(s) carried through unconverted",
            descriptor.proxies.len()
        )));
    }

    JobPlan {
        vmat,
        textures,
        derivations,
        diagnostics,
    }
}

/// Returns the attribute value if declared non-empty.
fn declared<'a>(descriptor: &'a MaterialDescriptor, key: &str) -> Option<&'a str> {
    descriptor.get(key).filter(|v| !v.trim().is_empty())
}

/// Resolves a declared texture name against the material root by probing
/// the fixed extension priority list. First existing file wins.
pub fn resolve_texture(root: &Path, name: &str) -> Option<PathBuf> {
    let mut cleaned = name.trim().trim_matches('"').replace('\\', "/");
    if cleaned.to_ascii_lowercase().ends_with(".vtf") {
        cleaned.truncate(cleaned.len() - 4);
    }

    EXTENSION_PRIORITY
        .iter()
        .map(|ext| root.join(format!("{}.{}", cleaned, ext)))
        .find(|candidate| candidate.is_file())
}

/// Rewrites an on-disk path to the material-relative form used in VMAT
/// fields: `materials/<relative path>` with forward slashes.
pub fn material_relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let joined: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("materials/{}", joined.join("/"))
}

fn is_ssbump(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|n| n.contains(SSBUMP_MARKER))
}

/// File stem with the `-ssbump` and `_height` markers removed.
fn stripped_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    remove_marker(&remove_marker(&stem, "-ssbump"), "_height")
}

fn remove_marker(s: &str, marker: &str) -> String {
    match s.to_ascii_lowercase().find(marker) {
        Some(idx) => {
            let mut out = String::from(&s[..idx]);
            out.push_str(&s[idx + marker.len()..]);
            out
        }
        None => s.to_string(),
    }
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// `<stem><suffix>.<ext>` next to the source file.
fn derived_sibling(path: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sibling(path, &format!("{}{}.{}", stem, suffix, ext))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
