//! # CretoAI Identity
//!
//! User manager for the CretoAI identity service, built around role
//! reconciliation.
//!
//! ## Features
//!
//! - **Role reconciliation** computing the minimal removals and additions
//! - **Removal-before-addition** with short-circuit on the first failure
//! - **Narrow collaborator traits** instead of a framework base class
//! - **Explicit cancellation** and deadlines through [`OperationContext`]
//! - **In-memory store** implementing every collaborator
//!
//! ## Example
//!
//! ```rust
//! use cretoai_identity::{InMemoryIdentityStore, ManagerConfig, OperationContext, User, UserManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryIdentityStore::new());
//!     store.create_role("admin").await?;
//!     store.create_role("editor").await?;
//!
//!     let alice = User::new("alice");
//!     store.create_user(alice.clone()).await?;
//!
//!     let manager = UserManager::from_store(store, ManagerConfig::default());
//!     let ctx = OperationContext::new();
//!
//!     let changes = manager
//!         .set_roles(&alice, &["admin".to_string(), "editor".to_string()], &ctx)
//!         .await?;
//!     assert_eq!(changes.added, vec!["admin", "editor"]);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod manager;
pub mod reconciler;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use context::OperationContext;
pub use error::{ErrorDescriptor, IdentityError, Result};
pub use manager::{ManagerConfig, UserManager};
pub use reconciler::{plan_role_changes, RoleReconciler};
pub use store::{
    InMemoryIdentityStore, RoleAdder, RoleQuery, RoleRemover, UserRepository, UserStore,
};
pub use types::{IdentityResult, Role, RoleChanges, RoleName, User, UserId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
