//! Shared fixtures for identity integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cretoai_identity::{
    ErrorDescriptor, IdentityResult, InMemoryIdentityStore, Result, RoleAdder, RoleName, RoleQuery,
    RoleRemover, User,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Install a test log subscriber (honours RUST_LOG)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Convert string literals into role names
pub fn names(items: &[&str]) -> Vec<RoleName> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Store with the given roles registered and one user holding `held`
pub async fn seeded_store(roles: &[&str], held: &[&str]) -> (Arc<InMemoryIdentityStore>, User) {
    let store = Arc::new(InMemoryIdentityStore::new());
    for role in roles {
        store.create_role(*role).await.unwrap();
    }

    let user = User::new("alice").with_email("alice@example.com");
    store.create_user(user.clone()).await.unwrap();

    let result = store.add_roles(&user, &names(held)).await.unwrap();
    assert!(result.succeeded(), "Seeding roles failed: {:?}", result.errors());

    (store, user)
}

/// A collaborator call observed by [`RecordingRoles`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCall {
    Query,
    Remove(Vec<RoleName>),
    Add(Vec<RoleName>),
}

/// Role collaborators over an in-memory store that record every call and can
/// be told to fail, cancel, or stall
pub struct RecordingRoles {
    inner: Arc<InMemoryIdentityStore>,
    calls: Mutex<Vec<RoleCall>>,
    fail_removal: Option<Vec<ErrorDescriptor>>,
    fail_addition: Option<Vec<ErrorDescriptor>>,
    cancel_after_removal: Option<CancellationToken>,
    addition_delay: Option<Duration>,
}

impl RecordingRoles {
    pub fn new(inner: Arc<InMemoryIdentityStore>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_removal: None,
            fail_addition: None,
            cancel_after_removal: None,
            addition_delay: None,
        }
    }

    pub fn failing_removal(mut self, errors: Vec<ErrorDescriptor>) -> Self {
        self.fail_removal = Some(errors);
        self
    }

    pub fn failing_addition(mut self, errors: Vec<ErrorDescriptor>) -> Self {
        self.fail_addition = Some(errors);
        self
    }

    pub fn cancelling_after_removal(mut self, token: CancellationToken) -> Self {
        self.cancel_after_removal = Some(token);
        self
    }

    pub fn stalling_addition(mut self, delay: Duration) -> Self {
        self.addition_delay = Some(delay);
        self
    }

    pub async fn calls(&self) -> Vec<RoleCall> {
        self.calls.lock().await.clone()
    }

    pub async fn additions(&self) -> Vec<Vec<RoleName>> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                RoleCall::Add(roles) => Some(roles),
                _ => None,
            })
            .collect()
    }

    pub async fn removals(&self) -> Vec<Vec<RoleName>> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                RoleCall::Remove(roles) => Some(roles),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl RoleQuery for RecordingRoles {
    async fn get_role_names(&self, user: &User) -> Result<Vec<RoleName>> {
        self.calls.lock().await.push(RoleCall::Query);
        self.inner.get_role_names(user).await
    }
}

#[async_trait]
impl RoleRemover for RecordingRoles {
    async fn remove_roles(&self, user: &User, roles: &[RoleName]) -> Result<IdentityResult> {
        self.calls.lock().await.push(RoleCall::Remove(roles.to_vec()));

        if let Some(errors) = &self.fail_removal {
            return Ok(IdentityResult::failed(errors.clone()));
        }

        let result = self.inner.remove_roles(user, roles).await?;
        if let Some(token) = &self.cancel_after_removal {
            token.cancel();
        }
        Ok(result)
    }
}

#[async_trait]
impl RoleAdder for RecordingRoles {
    async fn add_roles(&self, user: &User, roles: &[RoleName]) -> Result<IdentityResult> {
        self.calls.lock().await.push(RoleCall::Add(roles.to_vec()));

        if let Some(delay) = self.addition_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(errors) = &self.fail_addition {
            return Ok(IdentityResult::failed(errors.clone()));
        }

        self.inner.add_roles(user, roles).await
    }
}
