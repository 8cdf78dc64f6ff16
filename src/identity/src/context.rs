//! Explicit cancellation and deadline context
//!
//! Every manager and reconciler operation takes an [`OperationContext`].
//! Cancellation is cooperative: the context is checked between steps and raced
//! against each in-flight collaborator call. A call that already completed is
//! never rolled back.

use crate::error::{IdentityError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline for one logical operation
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// Context that is never cancelled and has no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Apply a default timeout when no deadline is set yet
    pub fn or_timeout(self, timeout: Option<Duration>) -> Self {
        match (self.deadline, timeout) {
            (None, Some(timeout)) => self.with_timeout(timeout),
            _ => self,
        }
    }

    /// The cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Signal cancellation to every holder of this context
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Fail if the context was cancelled or its deadline has passed
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(IdentityError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(IdentityError::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Run a step under this context
    ///
    /// The step is not started if the context is already done. If it finishes
    /// in the same poll that cancellation is observed, its result wins.
    pub async fn run<T, F>(&self, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            result = step => result,
            _ = self.token.cancelled() => Err(IdentityError::Cancelled),
            _ = deadline => Err(IdentityError::DeadlineExceeded),
        }
    }
}
