//! # permgen RBAC
//!
//! This crate holds the declarative side of permgen: resources, the actions
//! declared on them, and the expansion that turns both into canonical
//! permission strings.
//!
//! ## Overview
//!
//! The permgen-rbac crate handles:
//! - **Resources**: Free-form identifiers, normalized to a symbolic prefix and a plural slug
//! - **Actions**: Plain strings, the standard vocabulary, or opaque caller constants
//! - **Permissions**: Symbolic name + permission string pairs, kept in sorted order
//! - **Expansion**: The pure mapping from declarations to permissions
//!
//! ## Architecture
//!
//! ```text
//! Permission = {resource_slug}.{action}
//!
//! Scoped actions expand twice:
//!   post: view_scoped   ->  POST_VIEW_ANY = "posts.view_any"
//!                           POST_VIEW     = "posts.view"
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use permgen_rbac::{expand, ActionSpec, CustomPermission, ResourceDeclaration, StandardAction};
//!
//! let resources = vec![
//!     ResourceDeclaration::new("user")
//!         .with_action(StandardAction::ViewScoped)
//!         .with_action("manage_roles")
//!         .with_action(ActionSpec::opaque("impersonate")),
//! ];
//! let custom = vec![CustomPermission::new("ACCESS_ADMIN_DASHBOARD", "admin.dashboard.access")];
//!
//! let expansion = expand(&resources, &custom);
//! assert_eq!(expansion.permissions.get("USER_VIEW_ANY"), Some("users.view_any"));
//! assert_eq!(expansion.permissions.get("USER_IMPERSONATE"), Some("users.impersonate"));
//! assert_eq!(expansion.permissions.len(), 5);
//! ```
//!
//! ## Scoped Expansion
//!
//! Only plain and standard actions are split on the `_scoped` suffix. Opaque
//! caller constants keep their literal value, so `{ custom = "approve_scoped" }`
//! yields the single permission `resource.approve_scoped`.

pub mod actions;
pub mod expander;
pub mod permissions;
pub mod resources;

// Re-export main types for convenience
pub use actions::{ActionSpec, DeclaredAction, OpaqueValue, StandardAction};
pub use expander::{expand, Expansion, ExpansionWarning};
pub use permissions::{CanonicalPermission, CustomPermission, PermissionMap};
pub use resources::ResourceDeclaration;
