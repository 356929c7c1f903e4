//! Relation state shared by the bundled stores.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{
    FindOrCreate, ModelPermission, Relation, RolePermission, StoredPermission, StoredRole, TableNames,
};

/// Contents of all store relations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    /// Permission rows
    pub permissions: Vec<StoredPermission>,
    /// Role rows
    pub roles: Vec<StoredRole>,
    /// Role-permission associations
    pub role_has_permissions: Vec<RolePermission>,
    /// Model-permission grants
    pub model_has_permissions: Vec<ModelPermission>,
}

impl StoreSnapshot {
    pub(crate) fn find_or_create_permission(&mut self, name: &str, guard: &str) -> FindOrCreate {
        if let Some(existing) = self
            .permissions
            .iter()
            .find(|p| p.name == name && p.guard_name == guard)
        {
            return FindOrCreate::Existing(existing.clone());
        }

        let permission = StoredPermission::new(name, guard);
        self.permissions.push(permission.clone());
        FindOrCreate::Created(permission)
    }

    pub(crate) fn permissions_for_guard(&self, guard: &str) -> Vec<StoredPermission> {
        self.permissions
            .iter()
            .filter(|p| p.guard_name == guard)
            .cloned()
            .collect()
    }

    pub(crate) fn delete_permission(&mut self, id: Uuid) -> StoreResult<()> {
        let before = self.permissions.len();
        self.permissions.retain(|p| p.id != id);
        if self.permissions.len() == before {
            return Err(StoreError::NotFound(format!("permission {id}")));
        }
        self.role_has_permissions.retain(|rp| rp.permission_id != id);
        self.model_has_permissions.retain(|mp| mp.permission_id != id);
        Ok(())
    }

    pub(crate) fn find_role(&self, name: &str, guard: &str) -> Option<StoredRole> {
        self.roles
            .iter()
            .find(|r| r.name == name && r.guard_name == guard)
            .cloned()
    }

    pub(crate) fn create_role(&mut self, name: &str, guard: &str) -> StoredRole {
        if let Some(role) = self.find_role(name, guard) {
            return role;
        }
        let role = StoredRole::new(name, guard);
        self.roles.push(role.clone());
        role
    }

    pub(crate) fn sync_role_permissions(&mut self, role_id: Uuid, permission_ids: &[Uuid]) -> StoreResult<()> {
        if !self.roles.iter().any(|r| r.id == role_id) {
            return Err(StoreError::NotFound(format!("role {role_id}")));
        }
        if let Some(missing) = permission_ids
            .iter()
            .find(|id| !self.permissions.iter().any(|p| p.id == **id))
        {
            return Err(StoreError::NotFound(format!("permission {missing}")));
        }

        self.role_has_permissions.retain(|rp| rp.role_id != role_id);
        for permission_id in permission_ids {
            self.role_has_permissions.push(RolePermission {
                role_id,
                permission_id: *permission_id,
            });
        }
        Ok(())
    }

    pub(crate) fn role_permission_names(&self, role_id: Uuid) -> Vec<String> {
        self.role_has_permissions
            .iter()
            .filter(|rp| rp.role_id == role_id)
            .filter_map(|rp| self.permissions.iter().find(|p| p.id == rp.permission_id))
            .map(|p| p.name.clone())
            .collect()
    }

    pub(crate) fn grant_to_model(&mut self, permission_id: Uuid, model_type: &str, model_id: &str) -> StoreResult<()> {
        if !self.permissions.iter().any(|p| p.id == permission_id) {
            return Err(StoreError::NotFound(format!("permission {permission_id}")));
        }
        self.model_has_permissions.push(ModelPermission {
            permission_id,
            model_type: model_type.to_string(),
            model_id: model_id.to_string(),
        });
        Ok(())
    }

    /// Remove every row of `relation`.
    ///
    /// With checks enabled, permission rows still referenced by an
    /// association cannot be removed.
    pub(crate) fn truncate(&mut self, relation: Relation, checks_enabled: bool, names: &TableNames) -> StoreResult<u64> {
        let removed = match relation {
            Relation::Permissions => {
                if checks_enabled {
                    let referenced = self.role_has_permissions.len() + self.model_has_permissions.len();
                    if referenced > 0 {
                        return Err(StoreError::ConstraintViolation {
                            table: names.name(relation).to_string(),
                            reason: format!("{referenced} association rows still reference permissions"),
                        });
                    }
                }
                std::mem::take(&mut self.permissions).len()
            }
            Relation::RoleHasPermissions => std::mem::take(&mut self.role_has_permissions).len(),
            Relation::ModelHasPermissions => std::mem::take(&mut self.model_has_permissions).len(),
        };
        Ok(removed as u64)
    }
}
