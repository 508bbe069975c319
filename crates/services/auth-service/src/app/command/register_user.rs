//! Register a new user.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use common::AppResult;
use domain::{CredentialHasher, Password, User, UsersRepository};

use crate::app::run_blocking;
use crate::decorator::Handler;

#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub id: String,
    pub email: String,
    pub password: Password,
}

pub struct RegisterUserHandler {
    users: Arc<dyn UsersRepository>,
    hasher: CredentialHasher,
}

impl RegisterUserHandler {
    pub fn new(users: Arc<dyn UsersRepository>, hasher: CredentialHasher) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl Handler<RegisterUser, ()> for RegisterUserHandler {
    async fn handle(&self, ctx: &CancellationToken, cmd: RegisterUser) -> AppResult<()> {
        let hasher = self.hasher.clone();
        let user = run_blocking(move || {
            Ok(User::new(cmd.id, cmd.email, &cmd.password, &hasher)?)
        })
        .await?;

        self.users.save(ctx, &user).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::AppError;
    use domain::{MockUsersRepository, RepositoryError};

    use super::*;

    fn cheap_hasher() -> CredentialHasher {
        CredentialHasher::new(1024, 1, 1).unwrap()
    }

    fn command(id: &str, email: &str, password: &str) -> RegisterUser {
        RegisterUser {
            id: id.to_string(),
            email: email.to_string(),
            password: Password::from(password),
        }
    }

    #[tokio::test]
    async fn test_register_saves_user() {
        let mut repo = MockUsersRepository::new();
        repo.expect_save()
            .withf(|_, user| user.id() == "u1" && user.email().as_str() == "a@b.com")
            .times(1)
            .returning(|_, _| Ok(()));

        let handler = RegisterUserHandler::new(Arc::new(repo), cheap_hasher());
        let result = handler
            .handle(&CancellationToken::new(), command("u1", "a@b.com", "Password1"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_storage() {
        let mut repo = MockUsersRepository::new();
        repo.expect_save().never();

        let handler = RegisterUserHandler::new(Arc::new(repo), cheap_hasher());
        let ctx = CancellationToken::new();

        for cmd in [
            command("", "a@b.com", "Password1"),
            command("u1", "not-an-email", "Password1"),
            command("u1", "a@b.com", "short"),
        ] {
            let err = handler.handle(&ctx, cmd).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let mut repo = MockUsersRepository::new();
        repo.expect_save()
            .returning(|_, _| Err(RepositoryError::UserAlreadyExists));

        let handler = RegisterUserHandler::new(Arc::new(repo), cheap_hasher());
        let err = handler
            .handle(&CancellationToken::new(), command("u1", "a@b.com", "Password1"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::UserAlreadyExists);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let mut repo = MockUsersRepository::new();
        repo.expect_save()
            .returning(|_, _| Err(RepositoryError::storage("connection refused")));

        let handler = RegisterUserHandler::new(Arc::new(repo), cheap_hasher());
        let err = handler
            .handle(&CancellationToken::new(), command("u1", "a@b.com", "Password1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
    }
}
