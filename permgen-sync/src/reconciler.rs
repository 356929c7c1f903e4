//! # Reconciler
//!
//! Brings the permission store in line with the defined permission list.
//!
//! ## Flow
//!
//! ```text
//! load names ── empty ──> NothingToSync
//!     │
//!     ├─ fresh + confirmed ──> wipe (checks off, truncate, checks on, invalidate)
//!     │
//! resolve guard (explicit | select | default), must be configured
//!     │
//! find-or-create each name ── created > 0 ──> invalidate cache
//!     │                                      └─> super-admin role sync
//!     │
//! stale removal enabled ──> confirm ──> delete each, invalidate cache
//! ```
//!
//! Per-item store failures, including stale-removal cache invalidation, are
//! collected in the [`SyncReport`]. Only source, guard and wipe failures abort.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{StoreError, SyncError, SyncResult};
use crate::prompt::OperatorPrompt;
use crate::source::PermissionSource;
use crate::store::{PermissionStore, Relation, StoredPermission};

/// Guard used when none is configured.
pub const DEFAULT_GUARD: &str = "web";

const FRESH_CONFIRMATION: &str =
    "Are you sure you want to delete ALL permissions? This affects all roles and users and cannot be undone.";
const GUARD_SELECTION: &str = "Select guard for permissions";

/// Reconciler settings, taken from the generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Configured guards
    pub guards: Vec<String>,
    /// Guard used when none is given or selected
    pub default_guard: String,
    /// Role granted every permission when new ones are created
    pub super_admin_role: Option<String>,
    /// Whether stored permissions missing from the list are removed
    pub remove_stale_permissions: bool,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            guards: vec![DEFAULT_GUARD.to_string()],
            default_guard: DEFAULT_GUARD.to_string(),
            super_admin_role: None,
            remove_stale_permissions: false,
        }
    }
}

/// Per-invocation options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Guard to sync under; prompts when absent
    pub guard: Option<String>,
    /// Wipe all permissions and associations first
    pub fresh: bool,
    /// Skip confirmation prompts
    pub assume_yes: bool,
}

/// A permission the store rejected.
#[derive(Debug)]
pub struct ItemFailure {
    /// Permission string
    pub permission: String,
    /// Store error
    pub error: StoreError,
}

/// Counts from find-or-create.
#[derive(Debug, Default)]
pub struct SyncTally {
    /// Rows inserted
    pub created: usize,
    /// Rows already present
    pub existing: usize,
    /// Rows the store rejected
    pub failures: Vec<ItemFailure>,
}

/// What happened to a fresh-wipe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WipeOutcome {
    /// `fresh` was not set.
    NotRequested,
    /// The operator declined.
    Declined,
    /// All three relations were emptied.
    Wiped {
        /// Rows removed across relations
        removed: u64,
    },
}

/// What happened to the super-admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSync {
    /// No super-admin role configured.
    NotConfigured,
    /// Nothing was created, so the role was left alone.
    Unchanged,
    /// The role now holds every permission of the guard.
    Synced {
        /// Role name
        role: String,
        /// Permissions granted
        permissions: usize,
    },
    /// The role does not exist under the guard.
    NotFound {
        /// Role name
        role: String,
    },
    /// The store failed while syncing the role.
    Failed {
        /// Role name
        role: String,
        /// Error message
        error: String,
    },
}

/// What happened during stale removal.
#[derive(Debug)]
pub enum StaleOutcome {
    /// Stale removal is disabled.
    Disabled,
    /// Nothing stale was found.
    NoneFound,
    /// The operator declined removal.
    Declined {
        /// Stale permission strings
        stale: Vec<String>,
    },
    /// Removal ran.
    Removed {
        /// Permission strings deleted
        removed: Vec<String>,
        /// Deletes the store rejected
        failures: Vec<ItemFailure>,
        /// Cache invalidation failure after the deletes
        cache_error: Option<StoreError>,
    },
    /// Stale permissions could not be listed.
    Failed(StoreError),
}

/// Report of a completed sync.
#[derive(Debug)]
pub struct SyncReport {
    /// Guard the sync ran under
    pub guard: String,
    /// Fresh-wipe outcome
    pub wipe: WipeOutcome,
    /// Rows inserted
    pub created: usize,
    /// Rows already present
    pub existing: usize,
    /// Rows the store rejected
    pub failures: Vec<ItemFailure>,
    /// Super-admin role outcome
    pub super_admin: RoleSync,
    /// Stale removal outcome
    pub stale: StaleOutcome,
}

/// Result of a reconcile call.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The permission list was empty; the store was not touched.
    NothingToSync,
    /// The sync ran.
    Synced(SyncReport),
}

/// Reconciles a permission list with a store.
pub struct Reconciler {
    store: Arc<dyn PermissionStore>,
    prompt: Arc<dyn OperatorPrompt>,
    settings: ReconcilerSettings,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("settings", &self.settings)
            .finish()
    }
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(
        store: Arc<dyn PermissionStore>,
        prompt: Arc<dyn OperatorPrompt>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            store,
            prompt,
            settings,
        }
    }

    /// Reconciler settings.
    pub fn settings(&self) -> &ReconcilerSettings {
        &self.settings
    }

    /// Run a full sync.
    ///
    /// # Errors
    ///
    /// [`SyncError::Source`] when the list cannot be loaded,
    /// [`SyncError::Wipe`] when a confirmed wipe fails,
    /// [`SyncError::GuardNotConfigured`] for an unknown guard.
    pub async fn reconcile<S>(&self, source: &S, options: &SyncOptions) -> SyncResult<SyncOutcome>
    where
        S: PermissionSource + ?Sized,
    {
        info!("Starting permission sync...");

        let defined = source.permission_names()?;
        if defined.is_empty() {
            warn!("No permissions found in the generated enum. Sync aborted.");
            return Ok(SyncOutcome::NothingToSync);
        }

        let wipe = if options.fresh {
            if options.assume_yes || self.prompt.confirm(FRESH_CONFIRMATION, false) {
                let removed = self.wipe().await?;
                WipeOutcome::Wiped { removed }
            } else {
                info!("Fresh sync aborted.");
                WipeOutcome::Declined
            }
        } else {
            WipeOutcome::NotRequested
        };

        let guard = self.resolve_guard(options.guard.as_deref())?;

        let tally = self.sync_permissions(&defined, &guard).await;
        info!(
            guard = %guard,
            "Sync complete. Found {} existing permissions. Created {} new permissions.",
            tally.existing,
            tally.created
        );

        if tally.created > 0 {
            self.store.invalidate_cache().await?;
        }

        let super_admin = match self.settings.super_admin_role.as_deref().filter(|r| !r.is_empty()) {
            None => RoleSync::NotConfigured,
            Some(_) if tally.created == 0 => RoleSync::Unchanged,
            Some(role) => self.sync_super_admin_role(role, &guard).await,
        };

        let stale = if self.settings.remove_stale_permissions {
            self.remove_stale_permissions(&defined, &guard, options.assume_yes).await
        } else {
            StaleOutcome::Disabled
        };

        Ok(SyncOutcome::Synced(SyncReport {
            guard,
            wipe,
            created: tally.created,
            existing: tally.existing,
            failures: tally.failures,
            super_admin,
            stale,
        }))
    }

    /// Find-or-create every defined permission under `guard`.
    ///
    /// Empty names are skipped. Store failures are logged and collected.
    pub async fn sync_permissions(&self, defined: &[String], guard: &str) -> SyncTally {
        let mut tally = SyncTally::default();
        info!(guard = %guard, "Using guard: {}", guard);

        for name in defined.iter().filter(|name| !name.is_empty()) {
            match self.store.find_or_create_permission(name, guard).await {
                Ok(found) if found.was_created() => {
                    info!(permission = %name, "- Created: {}", name);
                    tally.created += 1;
                }
                Ok(_) => tally.existing += 1,
                Err(e) => {
                    error!(permission = %name, error = %e, "Error processing permission '{}'", name);
                    tally.failures.push(ItemFailure {
                        permission: name.clone(),
                        error: e,
                    });
                }
            }
        }

        tally
    }

    /// Resolve the guard: explicit, else selected, else the default.
    fn resolve_guard(&self, explicit: Option<&str>) -> SyncResult<String> {
        let guards = &self.settings.guards;
        let guard = match explicit {
            Some(guard) => guard.to_string(),
            None => {
                let default_index = guards
                    .iter()
                    .position(|g| *g == self.settings.default_guard)
                    .unwrap_or(0);
                self.prompt
                    .select(GUARD_SELECTION, guards, default_index)
                    .unwrap_or_else(|| self.settings.default_guard.clone())
            }
        };

        if !guards.contains(&guard) {
            error!(guard = %guard, "Guard not found in the configuration");
            return Err(SyncError::GuardNotConfigured(guard));
        }
        Ok(guard)
    }

    /// Empty all three relations with referential checks disabled.
    ///
    /// Checks are re-enabled whether or not the deletes succeed.
    async fn wipe(&self) -> SyncResult<u64> {
        warn!("Starting fresh sync: Deleting existing permissions and role/model associations!");

        let deleted = match self.store.set_constraint_checks(false).await {
            Ok(()) => self.truncate_all().await,
            Err(e) => Err(e),
        };
        let restored = self.store.set_constraint_checks(true).await;

        let removed = deleted.map_err(SyncError::Wipe)?;
        restored.map_err(SyncError::Wipe)?;

        info!(removed, "Existing permissions and associations deleted.");
        self.store.invalidate_cache().await?;
        Ok(removed)
    }

    async fn truncate_all(&self) -> Result<u64, StoreError> {
        let mut removed = 0;
        for relation in Relation::WIPE_ORDER {
            let count = self.store.truncate(relation).await?;
            info!(table = %self.store.table_names().name(relation), rows = count, "relation truncated");
            removed += count;
        }
        Ok(removed)
    }

    async fn sync_super_admin_role(&self, role_name: &str, guard: &str) -> RoleSync {
        match self.grant_all_permissions(role_name, guard).await {
            Ok(Some(permissions)) => {
                info!(role = %role_name, permissions, "Role '{}' synced with all permissions.", role_name);
                RoleSync::Synced {
                    role: role_name.to_string(),
                    permissions,
                }
            }
            Ok(None) => {
                warn!(
                    role = %role_name,
                    guard = %guard,
                    "Super Admin role '{}' with guard '{}' not found. Skipping auto-sync for this role.",
                    role_name,
                    guard
                );
                RoleSync::NotFound {
                    role: role_name.to_string(),
                }
            }
            Err(e) => {
                error!(role = %role_name, error = %e, "Error syncing super-admin role '{}'", role_name);
                RoleSync::Failed {
                    role: role_name.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Grant a role every permission of the guard. `None` when the role is absent.
    async fn grant_all_permissions(&self, role_name: &str, guard: &str) -> Result<Option<usize>, StoreError> {
        let Some(role) = self.store.find_role(role_name, guard).await? else {
            return Ok(None);
        };
        info!(role = %role_name, "Syncing all permissions to '{}' role...", role_name);
        let permissions = self.store.permissions_for_guard(guard).await?;
        self.store.sync_role_permissions(&role, &permissions).await?;
        Ok(Some(permissions.len()))
    }

    async fn remove_stale_permissions(
        &self,
        defined: &[String],
        guard: &str,
        assume_yes: bool,
    ) -> StaleOutcome {
        info!("Checking for stale permissions to remove...");

        let stored = match self.store.permissions_for_guard(guard).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "Error checking/removing stale permissions");
                return StaleOutcome::Failed(e);
            }
        };

        let defined: HashSet<&str> = defined.iter().map(String::as_str).collect();
        let stale: Vec<StoredPermission> = stored
            .into_iter()
            .filter(|p| !defined.contains(p.name.as_str()))
            .collect();

        if stale.is_empty() {
            info!("No stale permissions found.");
            return StaleOutcome::NoneFound;
        }

        let stale_names: Vec<String> = stale.iter().map(|p| p.name.clone()).collect();
        let message = format!(
            "Found stale permissions in store: [{}]. Remove them? (Associations will also be removed)",
            stale_names.join(", ")
        );
        if !(assume_yes || self.prompt.confirm(&message, false)) {
            info!("Stale permissions were not removed.");
            return StaleOutcome::Declined { stale: stale_names };
        }

        let mut removed = Vec::new();
        let mut failures = Vec::new();
        for permission in stale {
            match self.store.delete_permission(&permission).await {
                Ok(()) => {
                    info!(permission = %permission.name, "- Deleted stale permission: {}", permission.name);
                    removed.push(permission.name);
                }
                Err(e) => {
                    error!(
                        permission = %permission.name,
                        error = %e,
                        "Error deleting stale permission '{}'",
                        permission.name
                    );
                    failures.push(ItemFailure {
                        permission: permission.name,
                        error: e,
                    });
                }
            }
        }

        let mut cache_error = None;
        if removed.is_empty() {
            info!("No stale permissions were removed due to errors.");
        } else {
            if let Err(e) = self.store.invalidate_cache().await {
                error!(error = %e, "Error invalidating the permission cache after stale removal");
                cache_error = Some(e);
            }
            info!("{} stale permissions removed.", removed.len());
        }

        StaleOutcome::Removed {
            removed,
            failures,
            cache_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPermissionStore;
    use crate::prompt::{AssumeYes, ScriptedPrompt};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn settings(guards: &[&str]) -> ReconcilerSettings {
        ReconcilerSettings {
            guards: names(guards),
            ..ReconcilerSettings::default()
        }
    }

    #[test]
    fn test_resolve_explicit_guard() {
        let reconciler = Reconciler::new(
            Arc::new(MemoryPermissionStore::new()),
            Arc::new(AssumeYes),
            settings(&["web", "api"]),
        );
        assert_eq!(reconciler.resolve_guard(Some("api")).unwrap(), "api");
        assert!(matches!(
            reconciler.resolve_guard(Some("admin")),
            Err(SyncError::GuardNotConfigured(g)) if g == "admin"
        ));
    }

    #[test]
    fn test_resolve_selected_guard() {
        let prompt = Arc::new(ScriptedPrompt::new().with_selection(Some("api")));
        let reconciler = Reconciler::new(
            Arc::new(MemoryPermissionStore::new()),
            prompt.clone(),
            settings(&["web", "api"]),
        );
        assert_eq!(reconciler.resolve_guard(None).unwrap(), "api");
        assert_eq!(prompt.asked(), vec![GUARD_SELECTION]);
    }

    #[test]
    fn test_resolve_rejects_unknown_selected_guard() {
        let prompt = Arc::new(ScriptedPrompt::new().with_selection(Some("admin")));
        let reconciler = Reconciler::new(
            Arc::new(MemoryPermissionStore::new()),
            prompt,
            settings(&["web", "api"]),
        );
        assert!(matches!(
            reconciler.resolve_guard(None),
            Err(SyncError::GuardNotConfigured(g)) if g == "admin"
        ));
    }

    #[test]
    fn test_resolve_falls_back_to_default_guard() {
        let prompt = Arc::new(ScriptedPrompt::new().with_selection(None));
        let reconciler = Reconciler::new(
            Arc::new(MemoryPermissionStore::new()),
            prompt,
            settings(&["web", "api"]),
        );
        assert_eq!(reconciler.resolve_guard(None).unwrap(), "web");
    }

    #[tokio::test]
    async fn test_sync_permissions_skips_empty_names() {
        let reconciler = Reconciler::new(
            Arc::new(MemoryPermissionStore::new()),
            Arc::new(AssumeYes),
            ReconcilerSettings::default(),
        );
        let tally = reconciler
            .sync_permissions(&names(&["posts.view", "", "posts.view"]), "web")
            .await;
        assert_eq!(tally.created, 1);
        assert_eq!(tally.existing, 1);
        assert!(tally.failures.is_empty());
    }
}
