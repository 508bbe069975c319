//! Users repository contract.
//!
//! Storage adapters implement [`UsersRepository`]. Uniqueness of id and email
//! is enforced by the storage layer, never by a read-then-write check.

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::DomainError;
use crate::user::User;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Mutation applied by [`UsersRepository::update`] to the loaded user.
pub type UpdateFn = Box<dyn FnOnce(&mut User) -> Result<(), DomainError> + Send>;

/// Repository failures.
///
/// Not-found is split by lookup key: id lookups and email lookups map to
/// different caller-visible outcomes.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Id or email is already taken
    #[error("user already exists")]
    UserAlreadyExists,

    #[error("user with id {id} not found")]
    UserNotFound { id: String },

    #[error("user with email {email} not found")]
    UserEmailNotFound { email: String },

    /// The caller's cancellation token fired before storage work finished
    #[error("operation cancelled")]
    Cancelled,

    /// The update callback rejected the change
    #[error("update rejected: {0}")]
    Mutation(DomainError),

    /// A stored row could not be turned back into a valid user
    #[error("stored user record is invalid: {0}")]
    InvalidRecord(DomainError),

    /// Any other driver failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn not_found(id: impl Into<String>) -> Self {
        RepositoryError::UserNotFound { id: id.into() }
    }

    pub fn email_not_found(email: impl Into<String>) -> Self {
        RepositoryError::UserEmailNotFound {
            email: email.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        RepositoryError::Storage(msg.into())
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Users repository trait for dependency injection.
///
/// Every operation takes the caller's cancellation token and returns
/// [`RepositoryError::Cancelled`] once it fires.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Persist a new user.
    ///
    /// Fails with [`RepositoryError::UserAlreadyExists`] if the id or the
    /// email is taken, including under concurrent inserts.
    async fn save(&self, ctx: &CancellationToken, user: &User) -> RepositoryResult<()>;

    /// Find user by id
    async fn user(&self, ctx: &CancellationToken, id: &str) -> RepositoryResult<User>;

    /// Find user by email address
    async fn user_by_email(&self, ctx: &CancellationToken, email: &str) -> RepositoryResult<User>;

    /// Load a user, apply `update_fn`, refresh `updated_at` and write it back.
    ///
    /// A user that is missing before the read or vanishes before the write
    /// is [`RepositoryError::UserNotFound`]. A rejected mutation is
    /// [`RepositoryError::Mutation`] and nothing is written.
    async fn update(
        &self,
        ctx: &CancellationToken,
        id: &str,
        update_fn: UpdateFn,
    ) -> RepositoryResult<()>;

    /// Permanently remove a user
    async fn delete(&self, ctx: &CancellationToken, id: &str) -> RepositoryResult<()>;
}

/// Race storage work against the caller's cancellation token.
///
/// An already-cancelled token wins without polling `work`.
pub async fn run_cancellable<T, F>(ctx: &CancellationToken, work: F) -> RepositoryResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(RepositoryError::Cancelled),
        result = work => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_cancellable_passes_result_through() {
        let ctx = CancellationToken::new();
        let result = run_cancellable(&ctx, async { Ok::<_, RepositoryError>(7) }).await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_run_cancellable_short_circuits_when_cancelled() {
        let ctx = CancellationToken::new();
        ctx.cancel();

        let result = run_cancellable(&ctx, std::future::pending::<RepositoryResult<()>>()).await;

        assert!(matches!(result, Err(RepositoryError::Cancelled)));
    }

    #[tokio::test]
    async fn test_run_cancellable_aborts_pending_work() {
        let ctx = CancellationToken::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = run_cancellable(&ctx, std::future::pending::<RepositoryResult<()>>()).await;

        assert!(matches!(result, Err(RepositoryError::Cancelled)));
    }
}
