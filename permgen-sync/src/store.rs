//! Permission store abstraction
//!
//! The store owns three relations: permissions keyed by (name, guard),
//! role-permission associations and direct model-permission grants. Their
//! physical names are configurable through [`TableNames`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreResult;

/// A stored permission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPermission {
    /// Row ID
    pub id: Uuid,
    /// Permission string
    pub name: String,
    /// Guard the permission belongs to
    pub guard_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl StoredPermission {
    /// Create a new row with a fresh ID.
    pub fn new(name: impl Into<String>, guard_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            guard_name: guard_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A stored role row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRole {
    /// Row ID
    pub id: Uuid,
    /// Role name
    pub name: String,
    /// Guard the role belongs to
    pub guard_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl StoredRole {
    /// Create a new row with a fresh ID.
    pub fn new(name: impl Into<String>, guard_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            guard_name: guard_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Role-permission association row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    /// Role ID
    pub role_id: Uuid,
    /// Permission ID
    pub permission_id: Uuid,
}

/// Direct model-permission grant row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPermission {
    /// Permission ID
    pub permission_id: Uuid,
    /// Model type, e.g. `user`
    pub model_type: String,
    /// Model key
    pub model_id: String,
}

/// Result of a find-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOrCreate {
    /// A new row was inserted.
    Created(StoredPermission),
    /// The row already existed.
    Existing(StoredPermission),
}

impl FindOrCreate {
    /// Whether a new row was inserted.
    pub fn was_created(&self) -> bool {
        matches!(self, FindOrCreate::Created(_))
    }

    /// The permission row.
    pub fn permission(&self) -> &StoredPermission {
        match self {
            FindOrCreate::Created(p) | FindOrCreate::Existing(p) => p,
        }
    }
}

/// The relations a permission store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Permission rows
    Permissions,
    /// Role-permission associations
    RoleHasPermissions,
    /// Model-permission grants
    ModelHasPermissions,
}

impl Relation {
    /// Wipe order: associations before the rows they reference.
    pub const WIPE_ORDER: [Relation; 3] = [
        Relation::RoleHasPermissions,
        Relation::ModelHasPermissions,
        Relation::Permissions,
    ];
}

/// Configured relation names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    /// Permission rows
    pub permissions: String,
    /// Role-permission associations
    pub role_has_permissions: String,
    /// Model-permission grants
    pub model_has_permissions: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            permissions: "permissions".to_string(),
            role_has_permissions: "role_has_permissions".to_string(),
            model_has_permissions: "model_has_permissions".to_string(),
        }
    }
}

impl TableNames {
    /// Configured name of a relation.
    pub fn name(&self, relation: Relation) -> &str {
        match relation {
            Relation::Permissions => &self.permissions,
            Relation::RoleHasPermissions => &self.role_has_permissions,
            Relation::ModelHasPermissions => &self.model_has_permissions,
        }
    }
}

/// Permission store trait.
///
/// Calls are awaited one at a time by the reconciler; implementations need
/// not order concurrent writers.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Configured relation names.
    fn table_names(&self) -> &TableNames;

    /// Find a permission by (name, guard), inserting it when absent.
    async fn find_or_create_permission(&self, name: &str, guard: &str) -> StoreResult<FindOrCreate>;

    /// All permissions of a guard, in insertion order.
    async fn permissions_for_guard(&self, guard: &str) -> StoreResult<Vec<StoredPermission>>;

    /// Delete a permission and every association referencing it.
    async fn delete_permission(&self, permission: &StoredPermission) -> StoreResult<()>;

    /// Find a role by (name, guard).
    async fn find_role(&self, name: &str, guard: &str) -> StoreResult<Option<StoredRole>>;

    /// Replace the permissions granted to a role.
    async fn sync_role_permissions(&self, role: &StoredRole, permissions: &[StoredPermission]) -> StoreResult<()>;

    /// Enable or disable referential checks.
    async fn set_constraint_checks(&self, enabled: bool) -> StoreResult<()>;

    /// Delete every row of a relation, returning the number removed.
    async fn truncate(&self, relation: Relation) -> StoreResult<u64>;

    /// Drop any cached permission data.
    async fn invalidate_cache(&self) -> StoreResult<()>;
}
