//! # permgen Sync
//!
//! Keeps a permission store in line with the permissions an application
//! declares.
//!
//! ## Features
//!
//! - `memory` (default): In-memory store for tests and dry runs
//! - `json-file` (default): Store persisted as a JSON snapshot
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use permgen_sync::{AssumeYes, MemoryPermissionStore, Reconciler, ReconcilerSettings, SyncOptions, SyncOutcome};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryPermissionStore::new());
//! let reconciler = Reconciler::new(store.clone(), Arc::new(AssumeYes), ReconcilerSettings::default());
//!
//! let defined = vec!["posts.view".to_string(), "posts.create".to_string()];
//! let options = SyncOptions { guard: Some("web".into()), ..SyncOptions::default() };
//!
//! let SyncOutcome::Synced(report) = reconciler.reconcile(&defined, &options).await.unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(report.created, 2);
//! # }
//! ```

pub mod error;
pub mod prompt;
pub mod reconciler;
pub mod snapshot;
pub mod source;
pub mod store;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "json-file")]
pub mod file_store;

pub use error::{StoreError, StoreResult, SyncError, SyncResult};
pub use prompt::{AssumeYes, OperatorPrompt, ScriptedPrompt};
pub use reconciler::{
    ItemFailure, Reconciler, ReconcilerSettings, RoleSync, StaleOutcome, SyncOptions, SyncOutcome, SyncReport,
    SyncTally, WipeOutcome, DEFAULT_GUARD,
};
pub use snapshot::StoreSnapshot;
pub use source::PermissionSource;
pub use store::{
    FindOrCreate, ModelPermission, PermissionStore, Relation, RolePermission, StoredPermission, StoredRole,
    TableNames,
};

#[cfg(feature = "memory")]
pub use memory::MemoryPermissionStore;

#[cfg(feature = "json-file")]
pub use file_store::JsonFileStore;
