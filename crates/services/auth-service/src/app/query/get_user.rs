//! Fetch a user's public profile.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use common::AppResult;
use domain::UsersRepository;

use super::UserView;
use crate::decorator::Handler;

#[derive(Debug, Clone)]
pub struct GetUser {
    pub id: String,
}

pub struct GetUserHandler {
    users: Arc<dyn UsersRepository>,
}

impl GetUserHandler {
    pub fn new(users: Arc<dyn UsersRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler<GetUser, UserView> for GetUserHandler {
    // An unknown id is reported as not found, unlike login.
    async fn handle(&self, ctx: &CancellationToken, query: GetUser) -> AppResult<UserView> {
        let user = self.users.user(ctx, &query.id).await?;
        Ok(UserView::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use common::AppError;
    use domain::{CredentialHasher, MockUsersRepository, Password, RepositoryError, User};

    use super::*;

    #[tokio::test]
    async fn test_get_user_projection() {
        let hasher = CredentialHasher::new(1024, 1, 1).unwrap();
        let user = User::new("u1", "a@b.com", &Password::from("Password1"), &hasher).unwrap();
        let expected = UserView::from(&user);

        let mut repo = MockUsersRepository::new();
        repo.expect_user()
            .withf(|_, id| id == "u1")
            .returning(move |_, _| Ok(user.clone()));

        let view = GetUserHandler::new(Arc::new(repo))
            .handle(&CancellationToken::new(), GetUser { id: "u1".into() })
            .await
            .unwrap();

        assert_eq!(view, expected);
        assert_eq!(view.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let mut repo = MockUsersRepository::new();
        repo.expect_user()
            .returning(|_, id| Err(RepositoryError::not_found(id)));

        let err = GetUserHandler::new(Arc::new(repo))
            .handle(&CancellationToken::new(), GetUser { id: "ghost".into() })
            .await
            .unwrap_err();

        assert_eq!(err, AppError::UserNotFound("ghost".into()));
    }

    #[tokio::test]
    async fn test_cancelled_lookup() {
        let mut repo = MockUsersRepository::new();
        repo.expect_user()
            .returning(|_, _| Err(RepositoryError::Cancelled));

        let err = GetUserHandler::new(Arc::new(repo))
            .handle(&CancellationToken::new(), GetUser { id: "u1".into() })
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Cancelled);
    }
}
