//! Generator configuration
//!
//! Loaded once per invocation from `permissions.toml` and passed explicitly
//! to every stage. Relative paths resolve against the directory holding the
//! configuration file.
//!
//! ```toml
//! output_enum = "src/auth/permissions.rs"
//! enum_class = "crate::auth::permissions::Permission"
//! super_admin_role = "super-admin"
//! remove_stale_permissions = false
//! guards = ["web", "api"]
//!
//! [resources]
//! post = ["view_scoped", { standard = "create" }, "publish"]
//! report = [{ custom = "approve_scoped" }]
//!
//! [custom_permissions]
//! ACCESS_ADMIN_DASHBOARD = "admin.dashboard.access"
//!
//! [store]
//! path = "storage/permissions.json"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use permgen_codegen::ArtifactTarget;
use permgen_rbac::{ActionSpec, CustomPermission, DeclaredAction, ResourceDeclaration};
use permgen_sync::{ReconcilerSettings, TableNames, DEFAULT_GUARD};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "permissions.toml";

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Configuration file '{}' not found. Create it or pass --config.", .0.display())]
    NotFound(PathBuf),

    /// Failed to read config file.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{}': {source}", .path.display())]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Output path missing or empty.
    #[error("The 'output_enum' path is not defined in {}.", .0.display())]
    MissingOutputEnum(PathBuf),

    /// A resource entry is not an action list.
    #[error("Resource '{resource}' must list its actions as an array, found {kind}.")]
    InvalidResource { resource: String, kind: String },

    /// A custom permission value is not a string.
    #[error("Custom permission '{name}' must be a string, found {kind}.")]
    InvalidCustomPermission { name: String, kind: String },

    /// The default guard is not one of the configured guards.
    #[error("Default guard '{guard}' is not listed in guards [{}].", .guards.join(", "))]
    UnknownDefaultGuard { guard: String, guards: Vec<String> },
}

impl ConfigError {
    /// Creates a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse TOML error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }
}

/// Store section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Snapshot path, resolved
    pub path: PathBuf,
    /// Relation names
    pub table_names: TableNames,
}

/// Fully resolved generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory holding the configuration file
    pub base_dir: PathBuf,
    /// Artifact path, resolved
    pub output_enum: PathBuf,
    /// Fully-qualified artifact type path
    pub enum_class: Option<String>,
    /// Host project source root, resolved
    pub source_root: PathBuf,
    /// Explicit template path, relative to `base_dir`
    pub template: Option<PathBuf>,
    /// Resources in declaration order
    pub resources: Vec<ResourceDeclaration>,
    /// Custom permissions in declaration order
    pub custom_permissions: Vec<CustomPermission>,
    /// Role auto-granted every permission
    pub super_admin_role: Option<String>,
    /// Remove stored permissions no longer defined
    pub remove_stale_permissions: bool,
    /// Configured guards
    pub guards: Vec<String>,
    /// Guard used when none is given or selected
    pub default_guard: String,
    /// Permission store
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    output_enum: Option<PathBuf>,
    enum_class: Option<String>,
    #[serde(default = "default_source_root")]
    source_root: PathBuf,
    template: Option<PathBuf>,
    #[serde(default)]
    resources: toml::Table,
    #[serde(default)]
    custom_permissions: toml::Table,
    super_admin_role: Option<String>,
    #[serde(default)]
    remove_stale_permissions: bool,
    #[serde(default = "default_guards")]
    guards: Vec<String>,
    #[serde(default = "default_guard")]
    default_guard: String,
    #[serde(default)]
    store: RawStoreConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawStoreConfig {
    path: PathBuf,
    table_names: TableNames,
}

impl Default for RawStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("storage/permissions.json"),
            table_names: TableNames::default(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

fn default_guards() -> Vec<String> {
    vec![DEFAULT_GUARD.to_string()]
}

fn default_guard() -> String {
    DEFAULT_GUARD.to_string()
}

impl GeneratorConfig {
    /// Load and resolve a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let config = Self::from_toml(&content, path, base_dir)?;
        debug!(
            path = %path.display(),
            resources = config.resources.len(),
            custom_permissions = config.custom_permissions.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse configuration text, resolving paths against `base_dir`.
    ///
    /// `origin` only names the source in error messages.
    pub fn from_toml(content: &str, origin: &Path, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::parse_toml(origin, e))?;

        let output_enum = raw
            .output_enum
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ConfigError::MissingOutputEnum(origin.to_path_buf()))?;

        if !raw.guards.contains(&raw.default_guard) {
            return Err(ConfigError::UnknownDefaultGuard {
                guard: raw.default_guard,
                guards: raw.guards,
            });
        }

        Ok(Self {
            output_enum: base_dir.join(output_enum),
            enum_class: raw.enum_class.filter(|c| !c.is_empty()),
            source_root: base_dir.join(raw.source_root),
            template: raw.template,
            resources: parse_resources(&raw.resources)?,
            custom_permissions: parse_custom_permissions(&raw.custom_permissions)?,
            super_admin_role: raw.super_admin_role.filter(|r| !r.is_empty()),
            remove_stale_permissions: raw.remove_stale_permissions,
            guards: raw.guards,
            default_guard: raw.default_guard,
            store: StoreConfig {
                path: base_dir.join(raw.store.path),
                table_names: raw.store.table_names,
            },
            base_dir,
        })
    }

    /// Identity of the generated enum.
    pub fn artifact_target(&self) -> ArtifactTarget {
        ArtifactTarget::new(&self.output_enum, &self.source_root, self.enum_class.as_deref())
    }

    /// Reconciler settings.
    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            guards: self.guards.clone(),
            default_guard: self.default_guard.clone(),
            super_admin_role: self.super_admin_role.clone(),
            remove_stale_permissions: self.remove_stale_permissions,
        }
    }
}

/// Convert the `[resources]` table, keeping declaration order.
///
/// Action entries that are not a string, `{ standard = .. }` or
/// `{ custom = .. }` are kept as unsupported so expansion can warn about them.
fn parse_resources(table: &toml::Table) -> Result<Vec<ResourceDeclaration>, ConfigError> {
    table
        .iter()
        .map(|(resource, actions)| {
            let actions = actions.as_array().ok_or_else(|| ConfigError::InvalidResource {
                resource: resource.clone(),
                kind: actions.type_str().to_string(),
            })?;
            let declared = actions.iter().map(|value| {
                value
                    .clone()
                    .try_into::<ActionSpec>()
                    .map(DeclaredAction::from)
                    .unwrap_or_else(|_| DeclaredAction::unsupported(value.type_str()))
            });
            Ok(ResourceDeclaration::with_actions(resource.as_str(), declared))
        })
        .collect()
}

fn parse_custom_permissions(table: &toml::Table) -> Result<Vec<CustomPermission>, ConfigError> {
    table
        .iter()
        .map(|(name, value)| match value.as_str() {
            Some(permission) => Ok(CustomPermission::new(name.as_str(), permission)),
            None => Err(ConfigError::InvalidCustomPermission {
                name: name.clone(),
                kind: value.type_str().to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use permgen_rbac::{OpaqueValue, StandardAction};
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<GeneratorConfig, ConfigError> {
        GeneratorConfig::from_toml(content, Path::new("permissions.toml"), PathBuf::from("/project"))
    }

    #[test]
    fn test_default_guard_must_be_configured() {
        let err = parse(
            r#"
            output_enum = "src/permissions.rs"
            guards = ["api"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDefaultGuard { ref guard, .. } if guard == "web"));
        assert_eq!(err.to_string(), "Default guard 'web' is not listed in guards [api].");

        let config = parse(
            r#"
            output_enum = "src/permissions.rs"
            guards = ["api"]
            default_guard = "api"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_guard, "api");
    }

    #[test]
    fn test_defaults() {
        let config = parse(r#"output_enum = "src/permissions.rs""#).unwrap();
        assert_eq!(config.output_enum, PathBuf::from("/project/src/permissions.rs"));
        assert_eq!(config.source_root, PathBuf::from("/project/src"));
        assert_eq!(config.guards, vec!["web"]);
        assert_eq!(config.default_guard, "web");
        assert_eq!(config.store.path, PathBuf::from("/project/storage/permissions.json"));
        assert_eq!(config.store.table_names, TableNames::default());
        assert!(config.resources.is_empty());
        assert!(config.super_admin_role.is_none());
        assert!(!config.remove_stale_permissions);
    }

    #[test]
    fn test_missing_output_enum() {
        assert!(matches!(parse(""), Err(ConfigError::MissingOutputEnum(_))));
        assert!(matches!(
            parse(r#"output_enum = """#),
            Err(ConfigError::MissingOutputEnum(_))
        ));
    }

    #[test]
    fn test_resources_keep_order_and_action_kinds() {
        let config = parse(
            r#"
            output_enum = "src/permissions.rs"

            [resources]
            user_profile = ["view"]
            post = ["view_scoped", { standard = "update_scoped" }, { custom = "approve_scoped" }, { custom = 7 }, true, 1.5]
            "#,
        )
        .unwrap();

        let names: Vec<_> = config.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["user_profile", "post"]);

        let post = &config.resources[1];
        assert_eq!(
            post.actions,
            vec![
                DeclaredAction::from("view_scoped"),
                DeclaredAction::from(StandardAction::UpdateScoped),
                DeclaredAction::from(ActionSpec::Opaque {
                    custom: OpaqueValue::Str("approve_scoped".to_string())
                }),
                DeclaredAction::from(ActionSpec::Opaque {
                    custom: OpaqueValue::Int(7)
                }),
                DeclaredAction::unsupported("boolean"),
                DeclaredAction::unsupported("float"),
            ]
        );
    }

    #[test]
    fn test_resource_must_be_array() {
        let err = parse(
            r#"
            output_enum = "src/permissions.rs"
            [resources]
            post = "view"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidResource { ref resource, .. } if resource == "post"));
    }

    #[test]
    fn test_custom_permissions_and_settings() {
        let config = parse(
            r#"
            output_enum = "src/permissions.rs"
            enum_class = "crate::permissions::Permission"
            super_admin_role = "super-admin"
            remove_stale_permissions = true
            guards = ["web", "api"]
            default_guard = "api"

            [custom_permissions]
            ACCESS_ADMIN_DASHBOARD = "admin.dashboard.access"

            [store]
            path = "/var/lib/permgen.json"

            [store.table_names]
            permissions = "acl_permissions"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.custom_permissions,
            vec![CustomPermission::new("ACCESS_ADMIN_DASHBOARD", "admin.dashboard.access")]
        );
        assert_eq!(config.store.path, PathBuf::from("/var/lib/permgen.json"));
        assert_eq!(config.store.table_names.permissions, "acl_permissions");
        assert_eq!(config.store.table_names.role_has_permissions, "role_has_permissions");

        let settings = config.reconciler_settings();
        assert_eq!(settings.super_admin_role.as_deref(), Some("super-admin"));
        assert_eq!(settings.default_guard, "api");
        assert!(settings.remove_stale_permissions);

        let target = config.artifact_target();
        assert_eq!(target.namespace, "crate::permissions");
        assert_eq!(target.type_name, "Permission");
    }

    #[test]
    fn test_empty_super_admin_role_disables() {
        let config = parse(
            r#"
            output_enum = "src/permissions.rs"
            super_admin_role = ""
            "#,
        )
        .unwrap();
        assert!(config.super_admin_role.is_none());
    }

    #[test]
    fn test_load_resolves_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, r#"output_enum = "src/permissions.rs""#).unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.base_dir, dir.path());
        assert_eq!(config.output_enum, dir.path().join("src/permissions.rs"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GeneratorConfig::load(Path::new("/nonexistent/permissions.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
