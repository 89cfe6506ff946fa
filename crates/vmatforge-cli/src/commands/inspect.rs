//! Dry-run inspection of a single descriptor.
//!
//! Parses one VMT file and prints the conversion plan without writing any
//! outputs. Useful for checking shader mapping and texture resolution before
//! committing to a batch run.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use vmatforge_vmt::parse_file;

use crate::config::ConvertConfig;
use crate::job::Severity;
use crate::mapper::{plan_job, Derivation};

/// Inspects a descriptor against the given material root.
pub fn run(descriptor_path: &Path, root: Option<&Path>, json: bool) -> Result<ExitCode> {
    let descriptor = parse_file(descriptor_path)
        .with_context(|| format!("failed to parse {}", descriptor_path.display()))?;

    // Without an explicit root, resolve textures relative to the
    // descriptor's own directory.
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => descriptor_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf(),
    };
    let config = ConvertConfig::new(&root);
    let plan = plan_job(&descriptor, &config);

    if json {
        let derivations: Vec<serde_json::Value> = plan
            .derivations
            .iter()
            .map(|d| match d {
                Derivation::Roughness { source, output } => json!({
                    "kind": "roughness",
                    "source": source,
                    "output": output,
                }),
                Derivation::SsbumpMaps {
                    source,
                    normal,
                    height,
                } => json!({
                    "kind": "ssbump",
                    "source": source,
                    "normal": normal,
                    "height": height,
                }),
                Derivation::Reexport { source, output } => json!({
                    "kind": "reexport",
                    "source": source,
                    "output": output,
                }),
            })
            .collect();
        let warnings: Vec<&str> = plan
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| d.message.as_str())
            .collect();

        let attributes: Vec<serde_json::Value> = descriptor
            .attributes
            .iter()
            .map(|(k, v)| json!({ "key": k, "value": v }))
            .collect();
        let proxies: Vec<serde_json::Value> = descriptor
            .proxies
            .iter()
            .map(|p| json!({ "type": p.proxy_type, "variable": p.variable, "value": p.value }))
            .collect();

        let report = json!({
            "descriptor": descriptor_path,
            "shader": plan.vmat.shader,
            "attributes": attributes,
            "proxies": proxies,
            "derivations": derivations,
            "warnings": warnings,
            "vmat": plan.vmat.serialize(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} {}",
        "Inspecting".cyan().bold(),
        descriptor_path.display()
    );
    println!("  shader: {}", plan.vmat.shader.bold());
    for (key, value) in descriptor.attributes.iter() {
        println!("  {} = {:?}", key, value);
    }
    for proxy in &descriptor.proxies {
        println!(
            "  proxy {}: {} <- {}",
            proxy.proxy_type, proxy.variable, proxy.value
        );
    }

    for derivation in &plan.derivations {
        match derivation {
            Derivation::Roughness { source, output } => {
                println!(
                    "  roughness: {} -> {}",
                    source.display(),
                    output.display()
                );
            }
            Derivation::SsbumpMaps {
                source,
                normal,
                height,
            } => {
                println!("  ssbump: {} -> {}", source.display(), normal.display());
                if let Some(height) = height {
                    println!("  height: {}", height.display());
                }
            }
            Derivation::Reexport { source, output } => {
                println!("  reexport: {} -> {}", source.display(), output.display());
            }
        }
    }

    for diag in &plan.diagnostics {
        match diag.severity {
            Severity::Warning => println!("  {} {}", "warning:".yellow().bold(), diag.message),
            Severity::Error => println!("  {} {}", "error:".red().bold(), diag.message),
            Severity::Info => println!("  {}", diag.message.dimmed()),
        }
    }

    println!();
    print!("{}", plan.vmat.serialize());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("gone.vmt"), None, true).is_err());
    }

    #[test]
    fn test_inspect_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.vmt");
        std::fs::write(
            &path,
            "\"LightmappedGeneric\"\n{\n\"$basetexture\" \"wall\"\n}\n",
        )
        .unwrap();

        run(&path, None, true).unwrap();
        assert!(!dir.path().join("wall.vmat").exists());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
