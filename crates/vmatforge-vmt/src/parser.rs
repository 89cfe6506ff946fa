//! Line-oriented VMT descriptor parser.
//!
//! The first non-blank line names the shader. The body is processed with an
//! explicit scope stack: `{` pushes a fresh attribute frame, `}` merges the
//! frame into its parent (child keys win on conflict). A `"proxies"` line
//! switches to proxy-record parsing until its block closes.

use std::path::Path;

use crate::descriptor::{AttributeMap, MaterialDescriptor, ProxyRecord, Shader};
use crate::error::VmtError;

/// Parses descriptor text into a [`MaterialDescriptor`].
///
/// This function is pure and total: malformed lines are skipped rather than
/// rejected, matching how the legacy format is consumed in the wild.
/// Parsing the same text twice yields structurally equal descriptors.
pub fn parse_str(text: &str) -> MaterialDescriptor {
    let mut lines = text.lines();

    let mut shader = Shader::Unknown;
    for line in lines.by_ref() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        shader = Shader::from_token(line);
        break;
    }

    // Scope stack: index 0 is the root frame, never popped.
    let mut scopes: Vec<AttributeMap> = vec![AttributeMap::new()];
    let mut proxies: Vec<ProxyRecord> = Vec::new();
    // Some(depth) while inside the "proxies" block; depth counts its braces.
    let mut proxy_depth: Option<u32> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if let Some(depth) = proxy_depth {
            match line {
                "{" => proxy_depth = Some(depth + 1),
                "}" => {
                    proxy_depth = if depth <= 1 { None } else { Some(depth - 1) };
                }
                _ => {
                    if let Some(record) = parse_proxy_line(line) {
                        proxies.push(record);
                    }
                }
            }
            continue;
        }

        match line {
            "{" => scopes.push(AttributeMap::new()),
            "}" => pop_and_merge(&mut scopes),
            _ => {
                if strip_quotes(line).eq_ignore_ascii_case("proxies") {
                    proxy_depth = Some(0);
                } else if let Some(scope) = scopes.last_mut() {
                    parse_attribute_line(line, scope);
                }
            }
        }
    }

    // Unbalanced input: fold any frames left open into the root.
    while scopes.len() > 1 {
        pop_and_merge(&mut scopes);
    }

    MaterialDescriptor {
        shader,
        attributes: scopes.pop().unwrap_or_default(),
        proxies,
    }
}

/// Reads and parses a descriptor file.
///
/// An I/O failure here is terminal for the job that owns this file: the
/// scheduler logs it and marks the job failed without requeueing.
pub fn parse_file(path: &Path) -> Result<MaterialDescriptor, VmtError> {
    let text = std::fs::read_to_string(path).map_err(|source| VmtError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_str(&text))
}

fn pop_and_merge(scopes: &mut Vec<AttributeMap>) {
    if scopes.len() > 1 {
        if let Some(child) = scopes.pop() {
            if let Some(parent) = scopes.last_mut() {
                parent.merge(child);
            }
        }
    }
}

fn strip_quotes(token: &str) -> &str {
    token.trim_matches('"')
}

/// Parses one key/value or bare-flag line into the current scope.
fn parse_attribute_line(line: &str, scope: &mut AttributeMap) {
    match line.split_once(char::is_whitespace) {
        Some((raw_key, raw_value)) => {
            let key = strip_quotes(raw_key.trim());
            if key.is_empty() {
                return;
            }
            // Truncate at an inline comment, then strip quotes.
            let value = match raw_value.find("//") {
                Some(idx) => &raw_value[..idx],
                None => raw_value,
            };
            let value = strip_quotes(value.trim()).trim();
            scope.insert(key, value);
        }
        None => {
            // No whitespace at all: a bare flag, recorded with an empty value.
            let key = strip_quotes(line);
            if !key.is_empty() {
                scope.insert(key, "");
            }
        }
    }
}

/// Matches the single-line proxy pattern `"<type>" { "<var>" "<value>" }`.
/// Lines inside a proxies block that do not match are ignored.
fn parse_proxy_line(line: &str) -> Option<ProxyRecord> {
    if !line.contains('{') {
        return None;
    }

    let mut tokens: Vec<&str> = Vec::new();
    let mut rest = line;
    while let Some(start) = rest.find('"') {
        let after = &rest[start + 1..];
        let end = after.find('"')?;
        tokens.push(&after[..end]);
        rest = &after[end + 1..];
    }

    if tokens.len() < 3 {
        return None;
    }
    Some(ProxyRecord {
        proxy_type: tokens[0].to_string(),
        variable: tokens[1].to_string(),
        value: tokens[2].trim_start_matches('$').to_string(),
    })
}
