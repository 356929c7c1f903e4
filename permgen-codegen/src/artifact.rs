//! # Generated Artifacts
//!
//! Reads a generated permission enum back into its ordered cases, so the
//! reconciler can consume exactly what was emitted without compiling it.
//!
//! A file is loadable when it declares the expected enum and carries the
//! `all_values` accessor. Cases are
//! read from the `permission_enum!` invocation when one is present, else from
//! the whole file.

use regex::Regex;
use std::path::Path;
use tracing::debug;

use permgen_rbac::CanonicalPermission;

use crate::error::{ArtifactError, ArtifactResult};

const CASE_PATTERN: &str = r#"(?m)^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*"((?:[^"\\]|\\.)*)"\s*;\s*$"#;
const INVOCATION_MARKER: &str = "permission_enum! {";
const VALUES_ACCESSOR: &str = "fn all_values";

/// A generated enum, read back from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    type_name: String,
    cases: Vec<CanonicalPermission>,
}

impl GeneratedArtifact {
    /// Parse generated source.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::Unloadable`] when the source does not declare
    /// `pub enum {type_name}`, lacks the `all_values` accessor or holds an
    /// undecodable value.
    pub fn parse(type_name: impl Into<String>, source: &str) -> ArtifactResult<Self> {
        let type_name = type_name.into();
        if !source.contains(VALUES_ACCESSOR) {
            return Err(ArtifactError::Unloadable {
                type_name,
                reason: "no all_values() accessor".to_string(),
            });
        }

        let declaration = format!(r"\bpub\s+enum\s+{}\b", regex::escape(&type_name));
        let declares_type = Regex::new(&declaration).map_err(|e| ArtifactError::Unloadable {
            type_name: type_name.clone(),
            reason: format!("declaration pattern: {e}"),
        })?;
        if !declares_type.is_match(source) {
            return Err(ArtifactError::Unloadable {
                reason: format!("no `pub enum {type_name}` declaration"),
                type_name,
            });
        }

        let pattern = Regex::new(CASE_PATTERN).map_err(|e| ArtifactError::Unloadable {
            type_name: type_name.clone(),
            reason: format!("case pattern: {e}"),
        })?;

        let body = match source.rfind(INVOCATION_MARKER) {
            Some(start) => &source[start + INVOCATION_MARKER.len()..],
            None => source,
        };

        let mut cases = Vec::new();
        for capture in pattern.captures_iter(body) {
            let name = &capture[1];
            let value = unescape(&capture[2]).ok_or_else(|| ArtifactError::Unloadable {
                type_name: type_name.clone(),
                reason: format!("invalid escape in value of {name}"),
            })?;
            cases.push(CanonicalPermission::new(name, value));
        }

        debug!(type_name = %type_name, cases = cases.len(), "parsed generated enum");
        Ok(Self { type_name, cases })
    }

    /// Read and parse a generated enum from disk.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::Read`] when the file cannot be read, otherwise as
    /// [`GeneratedArtifact::parse`].
    pub fn load(path: &Path, type_name: impl Into<String>) -> ArtifactResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(type_name, &source)
    }

    /// Type name the artifact was loaded as.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Cases in declaration order.
    pub fn cases(&self) -> &[CanonicalPermission] {
        &self.cases
    }

    /// Permission strings in declaration order.
    pub fn all_values(&self) -> Vec<String> {
        self.cases.iter().map(|case| case.value.clone()).collect()
    }

    /// Symbolic names in declaration order.
    pub fn all_names(&self) -> Vec<String> {
        self.cases.iter().map(|case| case.name.clone()).collect()
    }

    /// Whether the artifact declares no permissions.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Decode a Rust string literal body.
fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let hex: String = chars.by_ref().take_while(|&c| c != '}').collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}
