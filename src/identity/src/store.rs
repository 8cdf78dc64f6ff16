//! Collaborator interfaces and the in-memory identity store
//!
//! The manager never talks to persistence directly. It is handed narrow
//! capabilities: role query, role addition, role removal, user lookup by id,
//! and the user repository. Each capability is a separate trait so hosts can
//! back them with different services.

use crate::error::{ErrorDescriptor, IdentityError, Result};
use crate::types::{IdentityResult, Role, RoleName, User, UserId};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Reads the complete, current role set of a user
#[async_trait]
pub trait RoleQuery: Send + Sync {
    /// Role names currently assigned to the user, without truncation
    async fn get_role_names(&self, user: &User) -> Result<Vec<RoleName>>;
}

/// Adds a batch of roles to a user
#[async_trait]
pub trait RoleAdder: Send + Sync {
    /// Add every role in `roles`; an empty batch is a no-op success
    async fn add_roles(&self, user: &User, roles: &[RoleName]) -> Result<IdentityResult>;
}

/// Removes a batch of roles from a user
#[async_trait]
pub trait RoleRemover: Send + Sync {
    /// Remove every role in `roles`; an empty batch is a no-op success
    async fn remove_roles(&self, user: &User, roles: &[RoleName]) -> Result<IdentityResult>;
}

/// Looks up users by identifier
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;
}

/// Query-side user repository
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by exact phone number
    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<User>>;

    /// List all users
    async fn get_list(&self) -> Result<Vec<User>>;

    /// Role entities assigned to the user (empty for unknown users)
    async fn get_roles(&self, id: UserId) -> Result<Vec<Role>>;
}

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleName, Role>,
    memberships: HashMap<UserId, BTreeSet<RoleName>>,
}

/// In-memory identity store implementing every collaborator trait
///
/// Role batches are all-or-nothing: if any role in a batch is rejected, no
/// membership changes are made and every rejection is reported.
#[derive(Clone, Default)]
pub struct InMemoryIdentityStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryIdentityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user
    pub async fn create_user(&self, user: User) -> Result<()> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(IdentityError::InvalidArgument(format!(
                "User {} already exists",
                user.id
            )));
        }

        debug!("Creating user {} ({})", user.user_name, user.id);
        state.memberships.insert(user.id, BTreeSet::new());
        state.users.insert(user.id, user);
        Ok(())
    }

    /// Register a role by name
    pub async fn create_role(&self, name: impl Into<RoleName>) -> Result<Role> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentityError::InvalidArgument(
                "Role name must not be empty".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        if state.roles.contains_key(&name) {
            return Err(IdentityError::InvalidArgument(format!(
                "Role '{}' already exists",
                name
            )));
        }

        let role = Role::new(name.clone());
        state.roles.insert(name, role.clone());
        Ok(role)
    }
}

#[async_trait]
impl RoleQuery for InMemoryIdentityStore {
    async fn get_role_names(&self, user: &User) -> Result<Vec<RoleName>> {
        let state = self.state.read().await;
        state
            .memberships
            .get(&user.id)
            .map(|roles| roles.iter().cloned().collect())
            .ok_or(IdentityError::UserNotFound(user.id))
    }
}

#[async_trait]
impl RoleAdder for InMemoryIdentityStore {
    async fn add_roles(&self, user: &User, roles: &[RoleName]) -> Result<IdentityResult> {
        if roles.is_empty() {
            return Ok(IdentityResult::success());
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let held = state
            .memberships
            .get_mut(&user.id)
            .ok_or(IdentityError::UserNotFound(user.id))?;

        let mut pending = BTreeSet::new();
        let mut errors = Vec::new();
        for role in roles {
            if !state.roles.contains_key(role) {
                errors.push(ErrorDescriptor::invalid_role_name(role));
            } else if held.contains(role) || !pending.insert(role.clone()) {
                errors.push(ErrorDescriptor::user_already_in_role(role));
            }
        }

        if !errors.is_empty() {
            return Ok(IdentityResult::failed(errors));
        }

        held.extend(pending);
        Ok(IdentityResult::success())
    }
}

#[async_trait]
impl RoleRemover for InMemoryIdentityStore {
    async fn remove_roles(&self, user: &User, roles: &[RoleName]) -> Result<IdentityResult> {
        if roles.is_empty() {
            return Ok(IdentityResult::success());
        }

        let mut state = self.state.write().await;
        let held = state
            .memberships
            .get_mut(&user.id)
            .ok_or(IdentityError::UserNotFound(user.id))?;

        let mut pending = BTreeSet::new();
        let mut errors = Vec::new();
        for role in roles {
            if !held.contains(role) || !pending.insert(role.clone()) {
                errors.push(ErrorDescriptor::user_not_in_role(role));
            }
        }

        if !errors.is_empty() {
            return Ok(IdentityResult::failed(errors));
        }

        for role in &pending {
            held.remove(role);
        }
        Ok(IdentityResult::success())
    }
}

#[async_trait]
impl UserStore for InMemoryIdentityStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryIdentityStore {
    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.phone_number.as_deref() == Some(phone_number))
            .cloned())
    }

    async fn get_list(&self) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.user_name.cmp(&b.user_name));
        Ok(users)
    }

    async fn get_roles(&self, id: UserId) -> Result<Vec<Role>> {
        let state = self.state.read().await;
        let Some(names) = state.memberships.get(&id) else {
            return Ok(Vec::new());
        };

        Ok(names
            .iter()
            .filter_map(|name| state.roles.get(name).cloned())
            .collect())
    }
}
