//! Authenticate by email and password, returning an access token.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tokio_util::sync::CancellationToken;

use common::{AppError, AppResult};
use domain::{CredentialHasher, Password, RepositoryError, UsersRepository};

use crate::app::run_blocking;
use crate::decorator::Handler;
use crate::token::{AccessToken, TokenIssuer};

#[derive(Debug, Clone)]
pub struct LoginUser {
    pub email: String,
    pub password: Password,
}

pub struct LoginUserHandler {
    users: Arc<dyn UsersRepository>,
    hasher: CredentialHasher,
    issuer: Arc<TokenIssuer>,
    token_ttl: Duration,
}

impl LoginUserHandler {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        hasher: CredentialHasher,
        issuer: Arc<TokenIssuer>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
            token_ttl,
        }
    }
}

#[async_trait]
impl Handler<LoginUser, AccessToken> for LoginUserHandler {
    /// Unknown email and wrong password both fail with
    /// [`AppError::InvalidCredentials`] after roughly the same hashing work.
    async fn handle(&self, ctx: &CancellationToken, query: LoginUser) -> AppResult<AccessToken> {
        let hasher = self.hasher.clone();
        let password = query.password;

        let user = match self.users.user_by_email(ctx, &query.email).await {
            Ok(user) => user,
            Err(RepositoryError::UserEmailNotFound { .. }) => {
                run_blocking(move || {
                    hasher.equalize_timing(&password);
                    Ok(())
                })
                .await?;
                return Err(AppError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        };

        let user = run_blocking(move || {
            user.match_password(&password, &hasher)?;
            Ok(user)
        })
        .await?;

        Ok(self.issuer.issue(user.id(), self.token_ttl)?)
    }
}
