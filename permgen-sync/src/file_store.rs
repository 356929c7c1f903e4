//! JSON file permission store.
//!
//! Keeps all relations in memory and writes a pretty-printed snapshot back
//! to disk after every mutation. A missing file is an empty store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::snapshot::StoreSnapshot;
use crate::store::{FindOrCreate, PermissionStore, Relation, StoredPermission, StoredRole, TableNames};

/// Permission store persisted as a JSON document.
pub struct JsonFileStore {
    /// Snapshot location
    path: PathBuf,
    /// Relation contents
    state: RwLock<StoreSnapshot>,
    /// Relation names
    table_names: TableNames,
    /// Referential checks flag
    constraint_checks: AtomicBool,
    /// Cache invalidations so far
    cache_invalidations: AtomicU64,
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .field("table_names", &self.table_names)
            .finish()
    }
}

impl JsonFileStore {
    /// Open a store, loading the snapshot at `path` when it exists.
    pub async fn open(path: impl Into<PathBuf>, table_names: TableNames) -> StoreResult<Self> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(e) => {
                return Err(StoreError::Persistence(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), "opened permission store");
        Ok(Self {
            path,
            state: RwLock::new(state),
            table_names,
            constraint_checks: AtomicBool::new(true),
            cache_invalidations: AtomicU64::new(0),
        })
    }

    /// Snapshot location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a role, or return the existing one.
    pub async fn create_role(&self, name: &str, guard: &str) -> StoreResult<StoredRole> {
        self.commit(|state| Ok(state.create_role(name, guard))).await
    }

    /// Names of the permissions granted to a role.
    pub async fn role_permission_names(&self, role: &StoredRole) -> Vec<String> {
        self.state.read().await.role_permission_names(role.id)
    }

    /// Number of cache invalidations so far.
    pub fn cache_invalidations(&self) -> u64 {
        self.cache_invalidations.load(Ordering::Relaxed)
    }

    /// Apply `change` to a copy of the state and swap it in once written.
    ///
    /// A failed write leaves the in-memory state untouched.
    async fn commit<T>(&self, change: impl FnOnce(&mut StoreSnapshot) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let value = change(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(value)
    }

    async fn persist(&self, state: &StoreSnapshot) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Persistence(format!("failed to create {}: {e}", parent.display())))?;
        }
        let bytes = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| StoreError::Persistence(format!("failed to write {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl PermissionStore for JsonFileStore {
    fn table_names(&self) -> &TableNames {
        &self.table_names
    }

    async fn find_or_create_permission(&self, name: &str, guard: &str) -> StoreResult<FindOrCreate> {
        if let Some(existing) = self
            .state
            .read()
            .await
            .permissions
            .iter()
            .find(|p| p.name == name && p.guard_name == guard)
        {
            return Ok(FindOrCreate::Existing(existing.clone()));
        }
        self.commit(|state| Ok(state.find_or_create_permission(name, guard))).await
    }

    async fn permissions_for_guard(&self, guard: &str) -> StoreResult<Vec<StoredPermission>> {
        Ok(self.state.read().await.permissions_for_guard(guard))
    }

    async fn delete_permission(&self, permission: &StoredPermission) -> StoreResult<()> {
        self.commit(|state| state.delete_permission(permission.id)).await
    }

    async fn find_role(&self, name: &str, guard: &str) -> StoreResult<Option<StoredRole>> {
        Ok(self.state.read().await.find_role(name, guard))
    }

    async fn sync_role_permissions(&self, role: &StoredRole, permissions: &[StoredPermission]) -> StoreResult<()> {
        let ids: Vec<_> = permissions.iter().map(|p| p.id).collect();
        self.commit(|state| state.sync_role_permissions(role.id, &ids)).await
    }

    async fn set_constraint_checks(&self, enabled: bool) -> StoreResult<()> {
        self.constraint_checks.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    async fn truncate(&self, relation: Relation) -> StoreResult<u64> {
        let checks = self.constraint_checks.load(Ordering::Relaxed);
        self.commit(|state| state.truncate(relation, checks, &self.table_names)).await
    }

    async fn invalidate_cache(&self) -> StoreResult<()> {
        self.cache_invalidations.fetch_add(1, Ordering::Relaxed);
        debug!(path = %self.path.display(), "permission cache invalidated");
        Ok(())
    }
}
