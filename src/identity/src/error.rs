//! Error types for the identity user manager

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A single failure reported by a role-membership collaborator
///
/// Descriptors are produced by the store and travel to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Machine-readable code (e.g., "UserAlreadyInRole")
    pub code: String,

    /// Human-readable description
    pub description: String,
}

impl ErrorDescriptor {
    /// Create a new error descriptor
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// The user already holds the role
    pub fn user_already_in_role(role: &str) -> Self {
        Self::new("UserAlreadyInRole", format!("User already in role '{}'.", role))
    }

    /// The user does not hold the role
    pub fn user_not_in_role(role: &str) -> Self {
        Self::new("UserNotInRole", format!("User is not in role '{}'.", role))
    }

    /// The role does not exist
    pub fn invalid_role_name(role: &str) -> Self {
        Self::new("InvalidRoleName", format!("Role name '{}' is invalid.", role))
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

fn join_descriptors(errors: &[ErrorDescriptor]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Identity manager errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Invalid argument, rejected before any collaborator is called
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The role remover reported failures; additions were skipped
    #[error("Role removal failed: {}", join_descriptors(.0))]
    RoleRemovalFailed(Vec<ErrorDescriptor>),

    /// The role adder reported failures; applied removals were kept
    #[error("Role addition failed: {}", join_descriptors(.0))]
    RoleAdditionFailed(Vec<ErrorDescriptor>),

    /// The operation was cancelled through its context
    #[error("Operation cancelled")]
    Cancelled,

    /// The operation's deadline elapsed
    #[error("Operation deadline exceeded")]
    DeadlineExceeded,

    /// Entity lookup by id found nothing
    #[error("There is no such an entity. Entity type: {entity}, id: {id}")]
    EntityNotFound {
        /// Entity type name
        entity: &'static str,
        /// Requested id
        id: Uuid,
    },

    /// A collaborator does not know the user
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Collaborator infrastructure error
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IdentityError {
    /// Whether the error is a cancellation outcome (explicit or deadline)
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Descriptors reported by a failed role mutation, if any
    pub fn descriptors(&self) -> &[ErrorDescriptor] {
        match self {
            Self::RoleRemovalFailed(errors) | Self::RoleAdditionFailed(errors) => errors,
            _ => &[],
        }
    }
}

/// Result type for identity operations
pub type Result<T> = std::result::Result<T, IdentityError>;
