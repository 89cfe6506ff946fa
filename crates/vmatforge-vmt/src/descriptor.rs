//! Parsed material descriptor types.

/// The closed set of shader identifiers recognized on the first line of a
/// descriptor. Anything else normalizes to [`Shader::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shader {
    VertexLitGeneric,
    LightmappedGeneric,
    UnlitGeneric,
    WorldVertexTransition,
    Unknown,
}

impl Shader {
    /// Normalizes a raw first-line token to a known shader.
    ///
    /// The legacy format allows suffixed variants (`lightmappedgeneric_dx9`
    /// and friends), so matching is by prefix on the lower-cased token.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim().trim_matches('"').to_ascii_lowercase();
        if token.starts_with("vertexlitgeneric") {
            Shader::VertexLitGeneric
        } else if token.starts_with("lightmappedgeneric") {
            Shader::LightmappedGeneric
        } else if token.starts_with("unlitgeneric") {
            Shader::UnlitGeneric
        } else if token.starts_with("worldvertextransition") {
            Shader::WorldVertexTransition
        } else {
            Shader::Unknown
        }
    }

    /// Returns the lower-cased legacy identifier, or `"unknown"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shader::VertexLitGeneric => "vertexlitgeneric",
            Shader::LightmappedGeneric => "lightmappedgeneric",
            Shader::UnlitGeneric => "unlitgeneric",
            Shader::WorldVertexTransition => "worldvertextransition",
            Shader::Unknown => "unknown",
        }
    }
}

/// An ordered attribute map with case-insensitive, lower-cased keys.
///
/// Insertion order is preserved; inserting an existing key replaces its
/// value in place (last occurrence wins), which is the scope-merge rule the
/// parser relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key/value pair. The key is lower-cased. If the key already
    /// exists its value is replaced in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a value by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the key is present, even with an empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges `child` into `self`, child keys overriding on conflict.
    /// Used when the parser pops a nested scope.
    pub fn merge(&mut self, child: AttributeMap) {
        for (key, value) in child.entries {
            self.insert(key, value);
        }
    }
}

/// One `"<var>" "<value>"` record inside a proxy block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRecord {
    /// The proxy type name (e.g. `texturetransform`).
    pub proxy_type: String,
    /// The variable being driven.
    pub variable: String,
    /// The driving value, `$` prefix stripped.
    pub value: String,
}

/// A fully parsed material descriptor. Built once per source file and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDescriptor {
    /// Normalized shader identifier from the first non-blank line.
    pub shader: Shader,
    /// All key/value attributes, nested scopes merged upward.
    pub attributes: AttributeMap,
    /// Proxy records in document order. Carried through structurally; the
    /// converter does not translate their semantics.
    pub proxies: Vec<ProxyRecord>,
}

impl MaterialDescriptor {
    /// Shorthand for attribute lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// Proxy records of the given type, in document order.
    pub fn proxies_of(&self, proxy_type: &str) -> impl Iterator<Item = &ProxyRecord> {
        let wanted = proxy_type.to_ascii_lowercase();
        self.proxies
            .iter()
            .filter(move |p| p.proxy_type.to_ascii_lowercase() == wanted)
    }
}
