//! VMAT output document model and serializer.
//!
//! The output format is a single top-level `"Layer0" { ... }` block: a
//! `shader` string, flat `key "value"` parameter pairs, texture-role fields
//! holding material-relative forward-slash paths, and a nested
//! `"Compiled Textures"` block listing the compiled sampler bindings for the
//! roles that resolved.

use std::io::Write;
use std::path::Path;

use crate::descriptor::Shader;
use crate::error::VmtError;

/// Logical texture roles carried by a VMAT document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    Color,
    Normal,
    Roughness,
    Height,
    SelfIllum,
}

impl TextureRole {
    /// The VMAT field name for this role.
    pub fn field_name(&self) -> &'static str {
        match self {
            TextureRole::Color => "TextureColor",
            TextureRole::Normal => "TextureNormal",
            TextureRole::Roughness => "TextureRoughness",
            TextureRole::Height => "TextureHeight",
            TextureRole::SelfIllum => "TextureSelfIllum",
        }
    }

    /// The compiled sampler binding, for the roles the engine compiles.
    pub fn compiled_name(&self) -> Option<&'static str> {
        match self {
            TextureRole::Color => Some("g_tColor"),
            TextureRole::Normal => Some("g_tNormal"),
            TextureRole::Roughness => Some("g_tRoughness"),
            TextureRole::Height | TextureRole::SelfIllum => None,
        }
    }

    /// All roles in serialization order.
    pub const ALL: [TextureRole; 5] = [
        TextureRole::Color,
        TextureRole::Normal,
        TextureRole::Roughness,
        TextureRole::Height,
        TextureRole::SelfIllum,
    ];
}

/// Fixed scalar parameters every converted material starts from.
const DEFAULT_PARAMS: &[(&str, &str)] = &[
    ("F_DETAIL_TEXTURE", "2"),
    ("g_bFogEnabled", "1"),
    ("g_nScaleTexCoordUByModelScaleAxis", "0"),
    ("g_nScaleTexCoordVByModelScaleAxis", "0"),
    ("g_nTextureAddressModeU", "0"),
    ("g_nTextureAddressModeV", "0"),
    ("g_flDetailBlendFactor", "1"),
    ("g_flDetailBlendToFull", "0"),
    ("g_flMetalness", "0"),
    ("g_flModelTintAmount", "1"),
];

/// A VMAT document ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmatDocument {
    /// Target shader file name (e.g. `csgo_complex.vfx`).
    pub shader: String,
    params: Vec<(String, String)>,
    textures: Vec<(TextureRole, String)>,
}

impl VmatDocument {
    /// Creates a document for the given legacy shader, pre-populated with the
    /// default parameter table.
    ///
    /// Lightmapped-family shaders map to `csgo_complex.vfx`, model shaders to
    /// `csgo_simple.vfx`. Unknown shaders are flagged for manual review.
    pub fn for_shader(shader: Shader) -> Self {
        let target = match shader {
            Shader::LightmappedGeneric | Shader::WorldVertexTransition => "csgo_complex.vfx",
            Shader::VertexLitGeneric | Shader::UnlitGeneric => "csgo_simple.vfx",
            Shader::Unknown => "needs_manual_conversion",
        };
        Self {
            shader: target.to_string(),
            params: DEFAULT_PARAMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            textures: Vec::new(),
        }
    }

    /// Sets a scalar parameter, replacing any existing value for the key.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// Looks up a scalar parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Assigns a material-relative texture path to a role.
    pub fn set_texture(&mut self, role: TextureRole, path: impl Into<String>) {
        let path = path.into();
        match self.textures.iter_mut().find(|(r, _)| *r == role) {
            Some(entry) => entry.1 = path,
            None => self.textures.push((role, path)),
        }
    }

    /// Returns the path assigned to a role, if any.
    pub fn texture(&self, role: TextureRole) -> Option<&str> {
        self.textures
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, p)| p.as_str())
    }

    /// Serializes the document into VMAT text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        out.push_str("\"Layer0\"\n{\n");
        out.push_str(&format!("    \"shader\"    \"{}\"\n", self.shader));

        for (key, value) in &self.params {
            out.push_str(&format!("    \"{}\"    \"{}\"\n", key, value));
        }

        for role in TextureRole::ALL {
            if let Some(path) = self.texture(role) {
                out.push_str(&format!("    \"{}\"    \"{}\"\n", role.field_name(), path));
            }
        }

        let compiled: Vec<(&'static str, &str)> = TextureRole::ALL
            .iter()
            .filter_map(|role| {
                let name = role.compiled_name()?;
                let path = self.texture(*role)?;
                Some((name, path))
            })
            .collect();
        if !compiled.is_empty() {
            out.push_str("    \"Compiled Textures\"\n    {\n");
            for (name, path) in compiled {
                out.push_str(&format!("        \"{}\"    \"{}\"\n", name, path));
            }
            out.push_str("    }\n");
        }

        out.push_str("}\n");
        out
    }

    /// Writes the serialized document to a file.
    pub fn write_to(&self, path: &Path) -> Result<(), VmtError> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        file.write_all(self.serialize().as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shader_mapping() {
        assert_eq!(
            VmatDocument::for_shader(Shader::LightmappedGeneric).shader,
            "csgo_complex.vfx"
        );
        assert_eq!(
            VmatDocument::for_shader(Shader::VertexLitGeneric).shader,
            "csgo_simple.vfx"
        );
        assert_eq!(
            VmatDocument::for_shader(Shader::Unknown).shader,
            "needs_manual_conversion"
        );
    }

    #[test]
    fn test_default_params_present() {
        let doc = VmatDocument::for_shader(Shader::LightmappedGeneric);
        assert_eq!(doc.param("g_flMetalness"), Some("0"));
        assert_eq!(doc.param("F_DETAIL_TEXTURE"), Some("2"));
    }

    #[test]
    fn test_set_param_replaces() {
        let mut doc = VmatDocument::for_shader(Shader::VertexLitGeneric);
        doc.set_param("g_flMetalness", "0.5");
        assert_eq!(doc.param("g_flMetalness"), Some("0.5"));
        // No duplicate key in serialized output.
        let text = doc.serialize();
        assert_eq!(text.matches("g_flMetalness").count(), 1);
    }

    #[test]
    fn test_serialize_layout() {
        let mut doc = VmatDocument::for_shader(Shader::LightmappedGeneric);
        doc.set_texture(TextureRole::Color, "materials/brick/wall01.png");
        doc.set_texture(TextureRole::Roughness, "materials/brick/wall01_roughness.png");

        let text = doc.serialize();
        assert!(text.starts_with("\"Layer0\"\n{\n    \"shader\"    \"csgo_complex.vfx\"\n"));
        assert!(text.contains("\"TextureColor\"    \"materials/brick/wall01.png\""));
        assert!(text.contains("\"Compiled Textures\""));
        assert!(text.contains("\"g_tColor\"    \"materials/brick/wall01.png\""));
        assert!(text.contains("\"g_tRoughness\"    \"materials/brick/wall01_roughness.png\""));
        // Normal never resolved, so it must not be compiled.
        assert!(!text.contains("g_tNormal"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_no_compiled_block_without_textures() {
        let doc = VmatDocument::for_shader(Shader::Unknown);
        assert!(!doc.serialize().contains("Compiled Textures"));
    }
}
