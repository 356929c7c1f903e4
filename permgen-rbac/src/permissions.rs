//! # Permissions
//!
//! Canonical permission entries and the ordered map that holds them.
//! A permission pairs an uppercase symbolic name with a dotted permission
//! string such as `posts.view_any`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resources::upper_snake;

/// A canonical permission: symbolic name plus permission string.
///
/// # Example
///
/// ```
/// use permgen_rbac::permissions::CanonicalPermission;
///
/// let perm = CanonicalPermission::new("POST_VIEW_ANY", "posts.view_any");
/// assert_eq!(perm.to_string(), "POST_VIEW_ANY = posts.view_any");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPermission {
    /// Uppercase snake_case identifier.
    pub name: String,
    /// Permission string stored in the permission store.
    pub value: String,
}

impl CanonicalPermission {
    /// Create a new canonical permission.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for CanonicalPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// A standalone permission that is not derived from a resource.
///
/// The declared name is normalized to UPPER_SNAKE_CASE when merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomPermission {
    /// Declared symbolic name (any case).
    pub name: String,
    /// Literal permission string.
    pub value: String,
}

impl CustomPermission {
    /// Create a new custom permission.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Symbolic name in UPPER_SNAKE_CASE, before sanitization.
    pub fn symbol(&self) -> String {
        upper_snake(&self.name)
    }
}

/// Reasons a composed symbolic name cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolRejection {
    /// Nothing is left after removing invalid characters.
    Empty,
    /// The sanitized name starts with a digit.
    LeadingDigit(String),
}

/// Sanitize a composed symbolic name.
///
/// Removes every character outside `[A-Z0-9_]`.
///
/// # Returns
///
/// The sanitized name, or the reason it must be skipped.
///
/// # Example
///
/// ```
/// use permgen_rbac::permissions::{sanitize_symbol, SymbolRejection};
///
/// assert_eq!(sanitize_symbol("ADMIN.DASHBOARD_VIEW"), Ok("ADMINDASHBOARD_VIEW".to_string()));
/// assert_eq!(
///     sanitize_symbol("2FA_MANAGE"),
///     Err(SymbolRejection::LeadingDigit("2FA_MANAGE".to_string()))
/// );
/// assert_eq!(sanitize_symbol("..."), Err(SymbolRejection::Empty));
/// ```
pub fn sanitize_symbol(name: &str) -> Result<String, SymbolRejection> {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
        .collect();

    match sanitized.chars().next() {
        None => Err(SymbolRejection::Empty),
        Some(c) if c.is_ascii_digit() => Err(SymbolRejection::LeadingDigit(sanitized)),
        Some(_) => Ok(sanitized),
    }
}

/// Ordered mapping of symbolic name to permission string.
///
/// Iteration is lexicographic by symbolic name. Inserting an existing name
/// replaces its value, so the last declaration wins.
///
/// # Example
///
/// ```
/// use permgen_rbac::permissions::PermissionMap;
///
/// let mut map = PermissionMap::new();
/// map.insert("POST_VIEW", "posts.view");
/// map.insert("POST_CREATE", "posts.create");
/// map.insert("POST_VIEW", "articles.view");
///
/// assert_eq!(map.names(), vec!["POST_CREATE", "POST_VIEW"]);
/// assert_eq!(map.get("POST_VIEW"), Some("articles.view"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMap {
    entries: BTreeMap<String, String>,
}

impl PermissionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert an entry, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    /// Look up a permission string by symbolic name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Check if a symbolic name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate entries in symbolic-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All symbolic names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// All permission strings, in symbolic-name order.
    pub fn values(&self) -> Vec<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    /// The entries as canonical permissions.
    pub fn to_permissions(&self) -> Vec<CanonicalPermission> {
        self.iter()
            .map(|(name, value)| CanonicalPermission::new(name, value))
            .collect()
    }

    /// Get the count of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<CanonicalPermission> for PermissionMap {
    fn from_iter<T: IntoIterator<Item = CanonicalPermission>>(iter: T) -> Self {
        let mut map = PermissionMap::new();
        for perm in iter {
            map.insert(perm.name, perm.value);
        }
        map
    }
}
