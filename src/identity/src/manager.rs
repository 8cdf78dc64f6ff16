//! User manager
//!
//! Composes the role reconciler with user lookup collaborators. Hosts build a
//! [`UserManager`] once and share it; it holds no per-user state.

use crate::context::OperationContext;
use crate::error::{IdentityError, Result};
use crate::reconciler::RoleReconciler;
use crate::store::{RoleAdder, RoleQuery, RoleRemover, UserRepository, UserStore};
use crate::types::{Role, RoleChanges, RoleName, User, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable holding the default operation timeout in milliseconds
pub const OPERATION_TIMEOUT_ENV: &str = "IDENTITY_OPERATION_TIMEOUT_MS";

/// User manager configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Deadline applied to operations whose context carries none
    pub operation_timeout: Option<Duration>,
}

impl ManagerConfig {
    /// Load configuration from the environment
    ///
    /// `IDENTITY_OPERATION_TIMEOUT_MS` sets the default timeout; unset or `0`
    /// means no default deadline.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let operation_timeout = match lookup(OPERATION_TIMEOUT_ENV) {
            None => None,
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|e| {
                    IdentityError::Config(format!(
                        "{} must be a number of milliseconds, got '{}': {}",
                        OPERATION_TIMEOUT_ENV, raw, e
                    ))
                })?;
                (millis > 0).then(|| Duration::from_millis(millis))
            }
        };

        Ok(Self { operation_timeout })
    }
}

/// Identity user manager
pub struct UserManager {
    users: Arc<dyn UserStore>,
    repository: Arc<dyn UserRepository>,
    reconciler: RoleReconciler,
    config: ManagerConfig,
}

impl UserManager {
    /// Create a manager from individual collaborators
    pub fn new(
        users: Arc<dyn UserStore>,
        repository: Arc<dyn UserRepository>,
        reconciler: RoleReconciler,
        config: ManagerConfig,
    ) -> Self {
        debug!(
            "UserManager initialized with operation_timeout={:?}",
            config.operation_timeout
        );

        Self {
            users,
            repository,
            reconciler,
            config,
        }
    }

    /// Create a manager over a single backend implementing every collaborator
    pub fn from_store<S>(store: Arc<S>, config: ManagerConfig) -> Self
    where
        S: UserStore + UserRepository + RoleQuery + RoleAdder + RoleRemover + 'static,
    {
        let reconciler = RoleReconciler::from_store(store.clone());
        Self::new(store.clone(), store, reconciler, config)
    }

    /// Manager configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The role reconciler used by [`UserManager::set_roles`]
    pub fn reconciler(&self) -> &RoleReconciler {
        &self.reconciler
    }

    fn scoped(&self, ctx: &OperationContext) -> OperationContext {
        ctx.clone().or_timeout(self.config.operation_timeout)
    }

    /// Get a user by id, failing if it does not exist
    pub async fn get_by_id(&self, id: UserId, ctx: &OperationContext) -> Result<User> {
        let ctx = self.scoped(ctx);
        ctx.run(self.users.find_by_id(id))
            .await?
            .ok_or(IdentityError::EntityNotFound { entity: "User", id })
    }

    /// Replace the user's roles with `role_names`
    ///
    /// See [`RoleReconciler::reconcile`] for failure semantics. On any error the
    /// role set may have partially changed; re-read it before remediating.
    pub async fn set_roles(
        &self,
        user: &User,
        role_names: &[RoleName],
        ctx: &OperationContext,
    ) -> Result<RoleChanges> {
        let ctx = self.scoped(ctx);
        let changes = self.reconciler.reconcile(user, role_names, &ctx).await?;

        info!(
            "Set {} roles for user {} ({})",
            role_names.len(),
            user.user_name,
            user.id
        );
        Ok(changes)
    }

    /// Find a user by exact phone number
    pub async fn find_by_phone_number(
        &self,
        phone_number: &str,
        ctx: &OperationContext,
    ) -> Result<Option<User>> {
        let ctx = self.scoped(ctx);
        ctx.run(self.repository.find_by_phone_number(phone_number)).await
    }

    /// List all users
    pub async fn get_list(&self, ctx: &OperationContext) -> Result<Vec<User>> {
        let ctx = self.scoped(ctx);
        ctx.run(self.repository.get_list()).await
    }

    /// Role entities assigned to the user with `id`
    pub async fn get_roles(&self, id: UserId, ctx: &OperationContext) -> Result<Vec<Role>> {
        let ctx = self.scoped(ctx);
        ctx.run(self.repository.get_roles(id)).await
    }
}
