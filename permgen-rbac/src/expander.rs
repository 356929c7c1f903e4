//! # Expander
//!
//! Turns resource declarations and custom permissions into the canonical,
//! sorted permission map. Expansion is pure: the same input always yields the
//! same map and the same warnings.
//!
//! ```text
//! post: [view_scoped, publish]
//!   POST_VIEW_ANY -> posts.view_any
//!   POST_VIEW     -> posts.view
//!   POST_PUBLISH  -> posts.publish
//! ```

use thiserror::Error;
use tracing::warn;

use crate::actions::DeclaredAction;
use crate::permissions::{sanitize_symbol, CustomPermission, PermissionMap, SymbolRejection};
use crate::resources::{upper_snake, ResourceDeclaration};

/// Recoverable problems found while expanding.
///
/// The offending entry is skipped and expansion continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionWarning {
    /// An action entry of a type that cannot name an action.
    #[error("Skipping invalid action type for resource '{resource}': {kind}")]
    InvalidActionType {
        /// Resource the entry was declared under.
        resource: String,
        /// Type of the offending value.
        kind: String,
    },

    /// An action that resolved to an empty string.
    #[error("Skipping empty action for resource '{resource}'")]
    EmptyAction {
        /// Resource the entry was declared under.
        resource: String,
    },

    /// A scoped action with nothing before the `_scoped` suffix.
    #[error("Skipping scoped action without a base name for resource '{resource}'")]
    EmptyScopedBase {
        /// Resource the entry was declared under.
        resource: String,
    },

    /// A symbolic name with no valid characters.
    #[error("Skipping symbolic name '{name}': no valid characters remain")]
    EmptySymbol {
        /// The composed name before sanitization.
        name: String,
    },

    /// A symbolic name that starts with a digit.
    #[error("Skipping symbolic name starting with a digit: {name}")]
    LeadingDigit {
        /// The sanitized name.
        name: String,
    },

    /// Nothing was generated at all.
    #[error("No permissions were generated. Check your configuration.")]
    NoPermissions,
}

/// Result of an expansion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Canonical permissions, sorted by symbolic name.
    pub permissions: PermissionMap,
    /// Warnings raised while expanding, in the order they occurred.
    pub warnings: Vec<ExpansionWarning>,
}

impl Expansion {
    /// Check if the run produced no permissions.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

/// Expand resource declarations and custom permissions.
///
/// Resource entries are inserted first, in declaration order, followed by the
/// custom permissions. A later entry with the same symbolic name replaces an
/// earlier one.
///
/// # Arguments
///
/// * `resources` - Resource declarations, in declaration order
/// * `custom_permissions` - Standalone permissions, in declaration order
///
/// # Returns
///
/// The sorted permission map together with every warning raised
///
/// # Example
///
/// ```
/// use permgen_rbac::expander::expand;
/// use permgen_rbac::resources::ResourceDeclaration;
///
/// let post = ResourceDeclaration::with_actions("post", ["view_scoped", "publish"]);
/// let expansion = expand(&[post], &[]);
///
/// assert_eq!(
///     expansion.permissions.names(),
///     vec!["POST_PUBLISH", "POST_VIEW", "POST_VIEW_ANY"]
/// );
/// assert_eq!(expansion.permissions.get("POST_VIEW_ANY"), Some("posts.view_any"));
/// assert!(expansion.warnings.is_empty());
/// ```
pub fn expand(resources: &[ResourceDeclaration], custom_permissions: &[CustomPermission]) -> Expansion {
    let mut expander = Expander::default();

    for resource in resources {
        expander.expand_resource(resource);
    }

    for custom in custom_permissions {
        expander.insert(custom.symbol(), custom.value.clone());
    }

    if expander.permissions.is_empty() {
        expander.warn(ExpansionWarning::NoPermissions);
    }

    Expansion {
        permissions: expander.permissions,
        warnings: expander.warnings,
    }
}

#[derive(Default)]
struct Expander {
    permissions: PermissionMap,
    warnings: Vec<ExpansionWarning>,
}

impl Expander {
    fn expand_resource(&mut self, resource: &ResourceDeclaration) {
        let resource_upper = resource.symbol_prefix();
        let resource_slug = resource.slug();

        for declared in &resource.actions {
            let action = match declared {
                DeclaredAction::Spec(action) => action,
                DeclaredAction::Unsupported { kind } => {
                    self.warn(ExpansionWarning::InvalidActionType {
                        resource: resource.name.clone(),
                        kind: kind.clone(),
                    });
                    continue;
                }
            };

            let Some(value) = action.resolve() else {
                self.warn(ExpansionWarning::EmptyAction {
                    resource: resource.name.clone(),
                });
                continue;
            };

            match action.scoped_base() {
                Some(base) if base.is_empty() => {
                    self.warn(ExpansionWarning::EmptyScopedBase {
                        resource: resource.name.clone(),
                    });
                }
                Some(base) => {
                    let base_upper = upper_snake(&base);
                    self.insert(
                        format!("{}_{}_ANY", resource_upper, base_upper),
                        format!("{}.{}_any", resource_slug, base),
                    );
                    self.insert(
                        format!("{}_{}", resource_upper, base_upper),
                        format!("{}.{}", resource_slug, base),
                    );
                }
                None => self.insert(
                    format!("{}_{}", resource_upper, upper_snake(&value)),
                    format!("{}.{}", resource_slug, value),
                ),
            }
        }
    }

    fn insert(&mut self, name: String, value: String) {
        match sanitize_symbol(&name) {
            Ok(symbol) => {
                self.permissions.insert(symbol, value);
            }
            Err(SymbolRejection::Empty) => self.warn(ExpansionWarning::EmptySymbol { name }),
            Err(SymbolRejection::LeadingDigit(name)) => self.warn(ExpansionWarning::LeadingDigit { name }),
        }
    }

    fn warn(&mut self, warning: ExpansionWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}
