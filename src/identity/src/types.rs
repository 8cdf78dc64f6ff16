//! Core identity types

use crate::error::ErrorDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique user identifier
pub type UserId = Uuid;

/// Role identifier as seen by role-membership collaborators
pub type RoleName = String;

/// User identity owned by the host persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable unique identifier
    pub id: UserId,

    /// Login name
    pub user_name: String,

    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number, matched verbatim by phone lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Creation timestamp
    pub creation_time: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh identifier
    pub fn new(user_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), user_name)
    }

    /// Create a user with a known identifier
    pub fn with_id(id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            email: None,
            phone_number: None,
            creation_time: Utc::now(),
        }
    }

    /// Set the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the phone number
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }
}

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier
    pub id: Uuid,

    /// Role name
    pub name: RoleName,
}

impl Role {
    /// Create a new role with a fresh identifier
    pub fn new(name: impl Into<RoleName>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Outcome of a role-membership mutation
///
/// A failed result always carries at least one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResult {
    errors: Vec<ErrorDescriptor>,
}

impl IdentityResult {
    /// Successful outcome
    pub fn success() -> Self {
        Self::default()
    }

    /// Failed outcome; an empty list is promoted to a generic failure
    pub fn failed(errors: Vec<ErrorDescriptor>) -> Self {
        if errors.is_empty() {
            return Self {
                errors: vec![ErrorDescriptor::new("DefaultError", "An unknown failure has occurred.")],
            };
        }
        Self { errors }
    }

    /// Whether the mutation succeeded
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// Reported failures
    pub fn errors(&self) -> &[ErrorDescriptor] {
        &self.errors
    }

    /// Consume into the reported failures
    pub fn into_errors(self) -> Vec<ErrorDescriptor> {
        self.errors
    }
}

/// Role changes applied by a successful reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChanges {
    /// Roles removed from the user, sorted
    pub removed: Vec<RoleName>,

    /// Roles added to the user, sorted
    pub added: Vec<RoleName>,
}

impl RoleChanges {
    /// Whether the reconciliation changed nothing
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}
