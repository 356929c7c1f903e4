//! In-memory permission store.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreResult;
use crate::snapshot::StoreSnapshot;
use crate::store::{FindOrCreate, PermissionStore, Relation, StoredPermission, StoredRole, TableNames};

/// In-memory permission store.
///
/// This is suitable for tests and dry runs. Referential checks are enforced
/// while enabled, and cache invalidations are counted.
pub struct MemoryPermissionStore {
    /// Relation contents
    state: Arc<RwLock<StoreSnapshot>>,
    /// Relation names
    table_names: TableNames,
    /// Referential checks flag
    constraint_checks: AtomicBool,
    /// Cache invalidations so far
    cache_invalidations: AtomicU64,
}

impl std::fmt::Debug for MemoryPermissionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPermissionStore")
            .field("table_names", &self.table_names)
            .field("constraint_checks", &self.constraint_checks.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryPermissionStore {
    /// Create an empty store with default relation names.
    pub fn new() -> Self {
        Self::with_table_names(TableNames::default())
    }

    /// Create an empty store with custom relation names.
    pub fn with_table_names(table_names: TableNames) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreSnapshot::default())),
            table_names,
            constraint_checks: AtomicBool::new(true),
            cache_invalidations: AtomicU64::new(0),
        }
    }

    /// Create a role, or return the existing one.
    pub async fn create_role(&self, name: &str, guard: &str) -> StoredRole {
        self.state.write().await.create_role(name, guard)
    }

    /// Grant a permission directly to a model.
    pub async fn grant_to_model(
        &self,
        permission: &StoredPermission,
        model_type: &str,
        model_id: &str,
    ) -> StoreResult<()> {
        self.state
            .write()
            .await
            .grant_to_model(permission.id, model_type, model_id)
    }

    /// Names of the permissions granted to a role.
    pub async fn role_permission_names(&self, role: &StoredRole) -> Vec<String> {
        self.state.read().await.role_permission_names(role.id)
    }

    /// Copy of the current relation contents.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    /// Number of cache invalidations so far.
    pub fn cache_invalidations(&self) -> u64 {
        self.cache_invalidations.load(Ordering::Relaxed)
    }

    /// Whether referential checks are enabled.
    pub fn constraint_checks_enabled(&self) -> bool {
        self.constraint_checks.load(Ordering::Relaxed)
    }
}

impl Default for MemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    fn table_names(&self) -> &TableNames {
        &self.table_names
    }

    async fn find_or_create_permission(&self, name: &str, guard: &str) -> StoreResult<FindOrCreate> {
        Ok(self.state.write().await.find_or_create_permission(name, guard))
    }

    async fn permissions_for_guard(&self, guard: &str) -> StoreResult<Vec<StoredPermission>> {
        Ok(self.state.read().await.permissions_for_guard(guard))
    }

    async fn delete_permission(&self, permission: &StoredPermission) -> StoreResult<()> {
        self.state.write().await.delete_permission(permission.id)
    }

    async fn find_role(&self, name: &str, guard: &str) -> StoreResult<Option<StoredRole>> {
        Ok(self.state.read().await.find_role(name, guard))
    }

    async fn sync_role_permissions(&self, role: &StoredRole, permissions: &[StoredPermission]) -> StoreResult<()> {
        let ids: Vec<_> = permissions.iter().map(|p| p.id).collect();
        self.state.write().await.sync_role_permissions(role.id, &ids)
    }

    async fn set_constraint_checks(&self, enabled: bool) -> StoreResult<()> {
        self.constraint_checks.store(enabled, Ordering::Relaxed);
        debug!(enabled, "constraint checks toggled");
        Ok(())
    }

    async fn truncate(&self, relation: Relation) -> StoreResult<u64> {
        let checks = self.constraint_checks_enabled();
        self.state
            .write()
            .await
            .truncate(relation, checks, &self.table_names)
    }

    async fn invalidate_cache(&self) -> StoreResult<()> {
        self.cache_invalidations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
