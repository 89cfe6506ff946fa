//! VMT Material Descriptor Library
//!
//! This crate provides the data model and parser for legacy VMT material
//! descriptors, plus the VMAT output document model and serializer.
//!
//! # Overview
//!
//! A VMT file is a line-oriented key/value format: the first non-blank line
//! names the shader, the body holds `{`/`}`-delimited scopes of
//! `"$key" "value"` pairs, `//` starts a comment, and an optional
//! `"proxies"` scope carries parameter-animation records.
//!
//! # Example
//!
//! ```
//! use vmatforge_vmt::parse_str;
//!
//! let descriptor = parse_str(r#"
//! "LightmappedGeneric"
//! {
//!     "$basetexture" "brick/wall01"
//!     "$bumpmap" "brick/wall01-ssbump"
//! }
//! "#);
//!
//! assert_eq!(descriptor.get("$basetexture"), Some("brick/wall01"));
//! ```
//!
//! # Modules
//!
//! - [`descriptor`]: The parsed material descriptor and proxy records
//! - [`parser`]: The VMT text parser
//! - [`vmat`]: The VMAT output document and serializer
//! - [`error`]: Error types

pub mod descriptor;
pub mod error;
pub mod parser;
pub mod vmat;

// Re-export commonly used types at the crate root
pub use descriptor::{AttributeMap, MaterialDescriptor, ProxyRecord, Shader};
pub use error::VmtError;
pub use parser::{parse_file, parse_str};
pub use vmat::{TextureRole, VmatDocument};
