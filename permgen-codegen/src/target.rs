//! Artifact identity: where the enum is written, which module it becomes,
//! and what its type is called.

use std::path::{Component, Path, PathBuf};

/// Root module path of a Rust crate.
pub const CRATE_ROOT: &str = "crate";

/// Destination and identity of the generated enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTarget {
    /// File the artifact is written to.
    pub path: PathBuf,
    /// Module path of the artifact inside the host crate.
    pub namespace: String,
    /// Name of the generated enum type.
    pub type_name: String,
}

impl ArtifactTarget {
    /// Describe an artifact.
    ///
    /// # Arguments
    ///
    /// * `path` - Output file
    /// * `source_root` - Host project source root (usually `src`)
    /// * `enum_class` - Configured type path; its last segment names the type
    ///
    /// # Example
    ///
    /// ```
    /// use permgen_codegen::target::ArtifactTarget;
    ///
    /// let target = ArtifactTarget::new("app/src/auth/permission_enum.rs", "app/src", None);
    /// assert_eq!(target.namespace, "crate::auth::permission_enum");
    /// assert_eq!(target.type_name, "PermissionEnum");
    ///
    /// let target = ArtifactTarget::new(
    ///     "app/src/auth/permissions.rs",
    ///     "app/src",
    ///     Some("crate::auth::permissions::Permission"),
    /// );
    /// assert_eq!(target.type_name, "Permission");
    /// ```
    pub fn new(path: impl Into<PathBuf>, source_root: impl AsRef<Path>, enum_class: Option<&str>) -> Self {
        let path = path.into();
        let namespace = derive_namespace(&path, source_root.as_ref());
        let type_name = type_name_for(&path, enum_class);
        Self {
            path,
            namespace,
            type_name,
        }
    }
}

/// Derive the module path of a source file relative to the source root.
///
/// `lib.rs`, `main.rs` and `mod.rs` name their directory's module. A file
/// outside the source root maps to the crate root.
pub fn derive_namespace(path: &Path, source_root: &Path) -> String {
    let relative = match path.strip_prefix(source_root) {
        Ok(relative) => relative,
        Err(_) => return CRATE_ROOT.to_string(),
    };

    let mut segments = vec![CRATE_ROOT.to_string()];
    let parts: Vec<&Path> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(Path::new(part)),
            _ => None,
        })
        .collect();

    if let Some((file, dirs)) = parts.split_last() {
        segments.extend(dirs.iter().map(|dir| dir.to_string_lossy().into_owned()));
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !matches!(stem.as_str(), "" | "lib" | "main" | "mod") {
            segments.push(stem);
        }
    }

    segments.join("::")
}

/// Name of the generated type.
///
/// Uses the last segment of `enum_class` when given, else the PascalCase of
/// the output file stem.
pub fn type_name_for(path: &Path, enum_class: Option<&str>) -> String {
    if let Some(last) = enum_class
        .and_then(|class| class.rsplit("::").next())
        .filter(|last| !last.is_empty())
    {
        return last.to_string();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    pascal_case(&stem)
}

/// Convert a snake_case or kebab-case identifier to PascalCase.
pub fn pascal_case(value: &str) -> String {
    value
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
