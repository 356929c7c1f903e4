//! End-to-end tests for permission reconciliation.
//!
//! These tests drive the reconciler against the in-memory store, with
//! scripted operator answers and a store wrapper that injects failures.
//!
//! Flows:
//! 1. Repeated syncs are idempotent
//! 2. Fresh wipe + sync leaves exactly the defined set
//! 3. Stale removal deletes exactly the undefined rows of the active guard
//! 4. Super-admin role sync, including a missing role
//! 5. Per-item failures are collected without aborting
//! 6. Wipe failures restore constraint checks
//! 7. Guard resolution and the empty-list short circuit

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use permgen_sync::{
    AssumeYes, FindOrCreate, MemoryPermissionStore, OperatorPrompt, PermissionStore, Reconciler, ReconcilerSettings,
    Relation, RoleSync, ScriptedPrompt, StaleOutcome, StoreError, StoreResult, StoredPermission, StoredRole,
    SyncError, SyncOptions, SyncOutcome, SyncReport, TableNames, WipeOutcome,
};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn web() -> SyncOptions {
    SyncOptions {
        guard: Some("web".to_string()),
        ..SyncOptions::default()
    }
}

async fn stored_names(store: &dyn PermissionStore, guard: &str) -> HashSet<String> {
    store
        .permissions_for_guard(guard)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

async fn run(reconciler: &Reconciler, defined: &[String], options: &SyncOptions) -> SyncReport {
    match reconciler.reconcile(defined, options).await.unwrap() {
        SyncOutcome::Synced(report) => report,
        SyncOutcome::NothingToSync => panic!("expected a sync"),
    }
}

/// Store wrapper that fails selected operations.
struct FailingStore {
    inner: MemoryPermissionStore,
    fail_create: HashSet<String>,
    fail_delete: HashSet<String>,
    fail_truncate: Option<Relation>,
    fail_role_lookup: bool,
    fail_invalidate: bool,
}

impl FailingStore {
    fn new(inner: MemoryPermissionStore) -> Self {
        Self {
            inner,
            fail_create: HashSet::new(),
            fail_delete: HashSet::new(),
            fail_truncate: None,
            fail_role_lookup: false,
            fail_invalidate: false,
        }
    }
}

#[async_trait]
impl PermissionStore for FailingStore {
    fn table_names(&self) -> &TableNames {
        self.inner.table_names()
    }

    async fn find_or_create_permission(&self, name: &str, guard: &str) -> StoreResult<FindOrCreate> {
        if self.fail_create.contains(name) {
            return Err(StoreError::Backend(format!("insert rejected: {name}")));
        }
        self.inner.find_or_create_permission(name, guard).await
    }

    async fn permissions_for_guard(&self, guard: &str) -> StoreResult<Vec<StoredPermission>> {
        self.inner.permissions_for_guard(guard).await
    }

    async fn delete_permission(&self, permission: &StoredPermission) -> StoreResult<()> {
        if self.fail_delete.contains(&permission.name) {
            return Err(StoreError::Backend(format!("delete rejected: {}", permission.name)));
        }
        self.inner.delete_permission(permission).await
    }

    async fn find_role(&self, name: &str, guard: &str) -> StoreResult<Option<StoredRole>> {
        if self.fail_role_lookup {
            return Err(StoreError::Backend("roles unavailable".to_string()));
        }
        self.inner.find_role(name, guard).await
    }

    async fn sync_role_permissions(&self, role: &StoredRole, permissions: &[StoredPermission]) -> StoreResult<()> {
        self.inner.sync_role_permissions(role, permissions).await
    }

    async fn set_constraint_checks(&self, enabled: bool) -> StoreResult<()> {
        self.inner.set_constraint_checks(enabled).await
    }

    async fn truncate(&self, relation: Relation) -> StoreResult<u64> {
        if self.fail_truncate == Some(relation) {
            return Err(StoreError::Backend("truncate rejected".to_string()));
        }
        self.inner.truncate(relation).await
    }

    async fn invalidate_cache(&self) -> StoreResult<()> {
        if self.fail_invalidate {
            return Err(StoreError::Backend("cache unavailable".to_string()));
        }
        self.inner.invalidate_cache().await
    }
}

#[tokio::test]
async fn test_second_sync_creates_nothing() {
    let store = Arc::new(MemoryPermissionStore::new());
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), ReconcilerSettings::default());
    let defined = names(&["posts.view_any", "posts.view", "posts.publish"]);

    let first = run(&reconciler, &defined, &web()).await;
    assert_eq!((first.created, first.existing), (3, 0));
    assert_eq!(store.cache_invalidations(), 1);
    let before = store.snapshot().await;

    let second = run(&reconciler, &defined, &web()).await;
    assert_eq!((second.created, second.existing), (0, 3));
    assert_eq!(store.snapshot().await, before);
    assert_eq!(store.cache_invalidations(), 1);
}

#[tokio::test]
async fn test_fresh_sync_recreates_exactly_the_defined_set() {
    let store = Arc::new(MemoryPermissionStore::new());
    let legacy = store.find_or_create_permission("posts.legacy", "web").await.unwrap();
    store.find_or_create_permission("reports.view", "api").await.unwrap();
    let role = store.create_role("editor", "web").await;
    store
        .sync_role_permissions(&role, std::slice::from_ref(legacy.permission()))
        .await
        .unwrap();
    store.grant_to_model(legacy.permission(), "user", "42").await.unwrap();

    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), ReconcilerSettings::default());
    let defined = names(&["posts.view", "posts.create"]);
    let options = SyncOptions {
        fresh: true,
        assume_yes: true,
        ..web()
    };

    let report = run(&reconciler, &defined, &options).await;

    assert_eq!(report.wipe, WipeOutcome::Wiped { removed: 4 });
    assert_eq!(report.created, 2);
    assert_eq!(stored_names(store.as_ref(), "web").await, defined.into_iter().collect());
    assert!(stored_names(store.as_ref(), "api").await.is_empty());

    let snapshot = store.snapshot().await;
    assert!(snapshot.role_has_permissions.is_empty());
    assert!(snapshot.model_has_permissions.is_empty());
    assert!(store.constraint_checks_enabled());
}

#[tokio::test]
async fn test_fresh_declined_leaves_store_untouched() {
    let store = Arc::new(MemoryPermissionStore::new());
    store.find_or_create_permission("posts.legacy", "web").await.unwrap();
    let prompt = Arc::new(ScriptedPrompt::new().with_confirmation(false));
    let reconciler = Reconciler::new(store.clone(), prompt.clone(), ReconcilerSettings::default());

    let options = SyncOptions { fresh: true, ..web() };
    let report = run(&reconciler, &names(&["posts.view"]), &options).await;

    assert_eq!(report.wipe, WipeOutcome::Declined);
    assert_eq!(prompt.asked().len(), 1);
    assert_eq!(
        stored_names(store.as_ref(), "web").await,
        names(&["posts.legacy", "posts.view"]).into_iter().collect()
    );
}

#[tokio::test]
async fn test_wipe_failure_restores_constraint_checks() {
    let mut failing = FailingStore::new(MemoryPermissionStore::new());
    failing.fail_truncate = Some(Relation::ModelHasPermissions);
    let store = Arc::new(failing);
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), ReconcilerSettings::default());

    let options = SyncOptions {
        fresh: true,
        assume_yes: true,
        ..web()
    };
    let err = reconciler.reconcile(&names(&["posts.view"]), &options).await.unwrap_err();

    assert!(matches!(err, SyncError::Wipe(_)));
    assert_eq!(err.error_code(), "WIPE_FAILED");
    assert!(store.inner.constraint_checks_enabled());
    assert!(stored_names(store.as_ref(), "web").await.is_empty());
}

#[tokio::test]
async fn test_stale_removal_is_exact() {
    let store = Arc::new(MemoryPermissionStore::new());
    for (name, guard) in [
        ("posts.view", "web"),
        ("posts.legacy", "web"),
        ("comments.legacy", "web"),
        ("posts.legacy", "api"),
    ] {
        store.find_or_create_permission(name, guard).await.unwrap();
    }

    let settings = ReconcilerSettings {
        guards: names(&["web", "api"]),
        remove_stale_permissions: true,
        ..ReconcilerSettings::default()
    };
    let prompt = Arc::new(ScriptedPrompt::new().with_confirmation(true));
    let reconciler = Reconciler::new(store.clone(), prompt.clone(), settings);

    let report = run(&reconciler, &names(&["posts.view", "posts.create"]), &web()).await;

    match report.stale {
        StaleOutcome::Removed {
            removed,
            failures,
            cache_error,
        } => {
            assert!(cache_error.is_none());
            assert_eq!(
                removed.into_iter().collect::<HashSet<_>>(),
                names(&["posts.legacy", "comments.legacy"]).into_iter().collect()
            );
            assert!(failures.is_empty());
        }
        other => panic!("unexpected stale outcome: {other:?}"),
    }
    assert!(prompt.asked()[0].contains("posts.legacy, comments.legacy"));
    assert_eq!(
        stored_names(store.as_ref(), "web").await,
        names(&["posts.view", "posts.create"]).into_iter().collect()
    );
    assert_eq!(
        stored_names(store.as_ref(), "api").await,
        names(&["posts.legacy"]).into_iter().collect()
    );
}

#[tokio::test]
async fn test_stale_removal_declined_and_none_found() {
    let store = Arc::new(MemoryPermissionStore::new());
    store.find_or_create_permission("posts.legacy", "web").await.unwrap();
    let settings = ReconcilerSettings {
        remove_stale_permissions: true,
        ..ReconcilerSettings::default()
    };
    let reconciler = Reconciler::new(
        store.clone(),
        Arc::new(ScriptedPrompt::new().with_confirmation(false)),
        settings.clone(),
    );

    let report = run(&reconciler, &names(&["posts.view"]), &web()).await;
    assert!(matches!(report.stale, StaleOutcome::Declined { ref stale } if stale == &names(&["posts.legacy"])));
    assert!(stored_names(store.as_ref(), "web").await.contains("posts.legacy"));

    let clean = Arc::new(MemoryPermissionStore::new());
    let reconciler = Reconciler::new(clean, Arc::new(AssumeYes), settings);
    let report = run(&reconciler, &names(&["posts.view"]), &web()).await;
    assert!(matches!(report.stale, StaleOutcome::NoneFound));
}

#[tokio::test]
async fn test_stale_delete_failures_are_collected() {
    let inner = MemoryPermissionStore::new();
    inner.find_or_create_permission("posts.legacy", "web").await.unwrap();
    inner.find_or_create_permission("posts.archived", "web").await.unwrap();
    let mut failing = FailingStore::new(inner);
    failing.fail_delete.insert("posts.archived".to_string());
    let store = Arc::new(failing);

    let settings = ReconcilerSettings {
        remove_stale_permissions: true,
        ..ReconcilerSettings::default()
    };
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), settings);
    let options = SyncOptions {
        assume_yes: true,
        ..web()
    };

    let report = run(&reconciler, &names(&["posts.view"]), &options).await;

    match report.stale {
        StaleOutcome::Removed { removed, failures, .. } => {
            assert_eq!(removed, names(&["posts.legacy"]));
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].permission, "posts.archived");
        }
        other => panic!("unexpected stale outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_stale_cache_invalidation_failure_is_reported() {
    let inner = MemoryPermissionStore::new();
    inner.find_or_create_permission("posts.view", "web").await.unwrap();
    inner.find_or_create_permission("posts.legacy", "web").await.unwrap();
    let mut failing = FailingStore::new(inner);
    failing.fail_invalidate = true;
    let store = Arc::new(failing);

    let settings = ReconcilerSettings {
        remove_stale_permissions: true,
        ..ReconcilerSettings::default()
    };
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), settings);
    let options = SyncOptions {
        assume_yes: true,
        ..web()
    };

    let report = run(&reconciler, &names(&["posts.view"]), &options).await;

    match report.stale {
        StaleOutcome::Removed {
            removed,
            failures,
            cache_error,
        } => {
            assert_eq!(removed, names(&["posts.legacy"]));
            assert!(failures.is_empty());
            assert!(matches!(cache_error, Some(StoreError::Backend(_))));
        }
        other => panic!("unexpected stale outcome: {other:?}"),
    }
    assert_eq!(
        stored_names(store.as_ref(), "web").await,
        names(&["posts.view"]).into_iter().collect()
    );
}

#[tokio::test]
async fn test_super_admin_receives_every_permission_of_the_guard() {
    let store = Arc::new(MemoryPermissionStore::new());
    store.find_or_create_permission("reports.view", "web").await.unwrap();
    store.find_or_create_permission("reports.view", "api").await.unwrap();
    let role = store.create_role("super-admin", "web").await;

    let settings = ReconcilerSettings {
        super_admin_role: Some("super-admin".to_string()),
        ..ReconcilerSettings::default()
    };
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), settings);

    let report = run(&reconciler, &names(&["posts.view", "posts.create"]), &web()).await;
    assert_eq!(
        report.super_admin,
        RoleSync::Synced {
            role: "super-admin".to_string(),
            permissions: 3
        }
    );
    assert_eq!(
        store.role_permission_names(&role).await.into_iter().collect::<HashSet<_>>(),
        names(&["reports.view", "posts.view", "posts.create"]).into_iter().collect()
    );

    let report = run(&reconciler, &names(&["posts.view", "posts.create"]), &web()).await;
    assert_eq!(report.super_admin, RoleSync::Unchanged);
}

#[tokio::test]
async fn test_missing_super_admin_role_is_a_warning() {
    let store = Arc::new(MemoryPermissionStore::new());
    store.create_role("super-admin", "api").await;
    let settings = ReconcilerSettings {
        super_admin_role: Some("super-admin".to_string()),
        ..ReconcilerSettings::default()
    };
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), settings.clone());

    let report = run(&reconciler, &names(&["posts.view"]), &web()).await;
    assert_eq!(
        report.super_admin,
        RoleSync::NotFound {
            role: "super-admin".to_string()
        }
    );
    assert_eq!(report.created, 1);

    let mut failing = FailingStore::new(MemoryPermissionStore::new());
    failing.fail_role_lookup = true;
    let reconciler = Reconciler::new(Arc::new(failing), Arc::new(AssumeYes), settings);
    let report = run(&reconciler, &names(&["posts.view"]), &web()).await;
    assert!(matches!(report.super_admin, RoleSync::Failed { .. }));
}

#[tokio::test]
async fn test_creation_failures_do_not_abort_the_batch() {
    let mut failing = FailingStore::new(MemoryPermissionStore::new());
    failing.fail_create.insert("posts.broken".to_string());
    let store = Arc::new(failing);
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), ReconcilerSettings::default());

    let report = run(&reconciler, &names(&["posts.view", "posts.broken", "posts.create"]), &web()).await;

    assert_eq!(report.created, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].permission, "posts.broken");
    assert!(matches!(report.failures[0].error, StoreError::Backend(_)));
    assert_eq!(
        stored_names(store.as_ref(), "web").await,
        names(&["posts.view", "posts.create"]).into_iter().collect()
    );
}

#[tokio::test]
async fn test_unconfigured_guard_is_fatal() {
    let store = Arc::new(MemoryPermissionStore::new());
    let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), ReconcilerSettings::default());
    let options = SyncOptions {
        guard: Some("admin".to_string()),
        ..SyncOptions::default()
    };

    let err = reconciler.reconcile(&names(&["posts.view"]), &options).await.unwrap_err();

    assert!(matches!(err, SyncError::GuardNotConfigured(ref g) if g == "admin"));
    assert_eq!(err.to_string(), "Guard 'admin' not found in the configuration.");
    assert!(store.snapshot().await.permissions.is_empty());
}

#[tokio::test]
async fn test_selected_guard_is_used() {
    let store = Arc::new(MemoryPermissionStore::new());
    let settings = ReconcilerSettings {
        guards: names(&["web", "api"]),
        ..ReconcilerSettings::default()
    };
    let prompt: Arc<dyn OperatorPrompt> = Arc::new(ScriptedPrompt::new().with_selection(Some("api")));
    let reconciler = Reconciler::new(store.clone(), prompt, settings);

    let report = run(&reconciler, &names(&["posts.view"]), &SyncOptions::default()).await;

    assert_eq!(report.guard, "api");
    assert!(stored_names(store.as_ref(), "web").await.is_empty());
    assert_eq!(stored_names(store.as_ref(), "api").await.len(), 1);
}

#[tokio::test]
async fn test_mistyped_selected_guard_is_fatal() {
    let store = Arc::new(MemoryPermissionStore::new());
    let settings = ReconcilerSettings {
        guards: names(&["web", "api"]),
        ..ReconcilerSettings::default()
    };
    let prompt: Arc<dyn OperatorPrompt> = Arc::new(ScriptedPrompt::new().with_selection(Some("admin")));
    let reconciler = Reconciler::new(store.clone(), prompt, settings);

    let err = reconciler
        .reconcile(&names(&["posts.view"]), &SyncOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::GuardNotConfigured(ref g) if g == "admin"));
    assert!(store.snapshot().await.permissions.is_empty());
}

#[tokio::test]
async fn test_empty_list_aborts_without_mutation() {
    let store = Arc::new(MemoryPermissionStore::new());
    store.find_or_create_permission("posts.view", "web").await.unwrap();
    let prompt = Arc::new(ScriptedPrompt::new());
    let reconciler = Reconciler::new(store.clone(), prompt.clone(), ReconcilerSettings::default());
    let before = store.snapshot().await;

    let options = SyncOptions {
        fresh: true,
        assume_yes: true,
        ..web()
    };
    let outcome = reconciler.reconcile(&Vec::<String>::new(), &options).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::NothingToSync));
    assert_eq!(store.snapshot().await, before);
    assert!(prompt.asked().is_empty());
    assert_eq!(store.cache_invalidations(), 0);
}
