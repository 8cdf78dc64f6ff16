//! Role reconciliation
//!
//! Brings a user's role set to a desired target set with the fewest
//! membership operations:
//!
//! ```text
//! current ──┐
//!           ├─► to_remove = current − desired ─► RoleRemover ─┐ fail → stop
//! desired ──┤                                                 │
//!           └─► to_add    = desired − current ─► RoleAdder ◄──┘ fail → stop
//! ```
//!
//! Removal always runs first so that if only one step succeeds the user is
//! left with fewer roles, never more. Nothing is rolled back on failure.

use crate::context::OperationContext;
use crate::error::{IdentityError, Result};
use crate::store::{RoleAdder, RoleQuery, RoleRemover};
use crate::types::{RoleChanges, RoleName, User};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Compute the removals and additions turning `current` into `desired`
///
/// Both inputs may contain duplicates. The result is deduplicated and sorted.
pub fn plan_role_changes(current: &[RoleName], desired: &[RoleName]) -> RoleChanges {
    let current: BTreeSet<&RoleName> = current.iter().collect();
    let desired: BTreeSet<&RoleName> = desired.iter().collect();

    RoleChanges {
        removed: current.difference(&desired).map(|r| (*r).clone()).collect(),
        added: desired.difference(&current).map(|r| (*r).clone()).collect(),
    }
}

/// Reconciles user role membership through injected collaborators
///
/// The reconciler holds no state between calls. Each call re-reads the
/// current roles, so re-running after a failure converges.
#[derive(Clone)]
pub struct RoleReconciler {
    query: Arc<dyn RoleQuery>,
    adder: Arc<dyn RoleAdder>,
    remover: Arc<dyn RoleRemover>,
}

impl RoleReconciler {
    /// Create a reconciler over the three role collaborators
    pub fn new(
        query: Arc<dyn RoleQuery>,
        adder: Arc<dyn RoleAdder>,
        remover: Arc<dyn RoleRemover>,
    ) -> Self {
        Self {
            query,
            adder,
            remover,
        }
    }

    /// Create a reconciler from one backend that implements all three roles
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: RoleQuery + RoleAdder + RoleRemover + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Make the user's role set equal `desired`
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - nil user id or blank role name; no collaborator was called
    /// * `RoleRemovalFailed` - the remover rejected the batch; additions were skipped
    /// * `RoleAdditionFailed` - the adder rejected the batch; removals stay applied
    /// * `Cancelled` / `DeadlineExceeded` - the context ended before completion
    /// * any error returned by a collaborator, unchanged
    pub async fn reconcile(
        &self,
        user: &User,
        desired: &[RoleName],
        ctx: &OperationContext,
    ) -> Result<RoleChanges> {
        validate_arguments(user, desired)?;

        let current = ctx.run(self.query.get_role_names(user)).await?;
        let changes = plan_role_changes(&current, desired);

        debug!(
            "Reconciling roles for user {}: remove={:?}, add={:?}",
            user.id, changes.removed, changes.added
        );

        let removal = ctx
            .run(self.remover.remove_roles(user, &changes.removed))
            .await?;
        if !removal.succeeded() {
            warn!(
                "Role removal failed for user {}, skipping additions: {:?}",
                user.id,
                removal.errors()
            );
            return Err(IdentityError::RoleRemovalFailed(removal.into_errors()));
        }

        let addition = ctx.run(self.adder.add_roles(user, &changes.added)).await?;
        if !addition.succeeded() {
            warn!(
                "Role addition failed for user {} after {} removals: {:?}",
                user.id,
                changes.removed.len(),
                addition.errors()
            );
            return Err(IdentityError::RoleAdditionFailed(addition.into_errors()));
        }

        if !changes.is_empty() {
            info!(
                "Reconciled roles for user {}: {} removed, {} added",
                user.id,
                changes.removed.len(),
                changes.added.len()
            );
        }

        Ok(changes)
    }
}

fn validate_arguments(user: &User, desired: &[RoleName]) -> Result<()> {
    if user.id.is_nil() {
        return Err(IdentityError::InvalidArgument(
            "user id must not be nil".to_string(),
        ));
    }

    if desired.iter().any(|name| name.trim().is_empty()) {
        return Err(IdentityError::InvalidArgument(
            "role names must not be empty".to_string(),
        ));
    }

    Ok(())
}
