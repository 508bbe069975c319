//! In-memory users repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use domain::{run_cancellable, RepositoryError, RepositoryResult, UpdateFn, User, UsersRepository};

/// [`UsersRepository`] backed by a map keyed by user id.
///
/// Clones share the same map. Uniqueness checks and writes happen under one
/// write lock, so concurrent saves of the same id or email cannot both win.
#[derive(Clone, Default)]
pub struct InMemoryUsersRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &HashMap<String, User>, email: &str, except_id: &str) -> bool {
    users
        .values()
        .any(|u| u.id() != except_id && u.email().as_str() == email)
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn save(&self, ctx: &CancellationToken, user: &User) -> RepositoryResult<()> {
        run_cancellable(ctx, async {
            let mut users = self.users.write().await;

            if users.contains_key(user.id()) || email_taken(&users, user.email().as_str(), "") {
                return Err(RepositoryError::UserAlreadyExists);
            }

            users.insert(user.id().to_string(), user.clone());
            tracing::debug!(user_id = %user.id(), "Stored user");
            Ok(())
        })
        .await
    }

    async fn user(&self, ctx: &CancellationToken, id: &str) -> RepositoryResult<User> {
        run_cancellable(ctx, async {
            self.users
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| RepositoryError::not_found(id))
        })
        .await
    }

    async fn user_by_email(&self, ctx: &CancellationToken, email: &str) -> RepositoryResult<User> {
        run_cancellable(ctx, async {
            self.users
                .read()
                .await
                .values()
                .find(|u| u.email().as_str() == email)
                .cloned()
                .ok_or_else(|| RepositoryError::email_not_found(email))
        })
        .await
    }

    async fn update(
        &self,
        ctx: &CancellationToken,
        id: &str,
        update_fn: UpdateFn,
    ) -> RepositoryResult<()> {
        run_cancellable(ctx, async move {
            // The mutator runs without holding the lock
            let mut current = self
                .users
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| RepositoryError::not_found(id))?;

            update_fn(&mut current).map_err(RepositoryError::Mutation)?;
            current.touch();

            let mut users = self.users.write().await;
            if !users.contains_key(id) {
                return Err(RepositoryError::not_found(id));
            }
            if email_taken(&users, current.email().as_str(), id) {
                return Err(RepositoryError::UserAlreadyExists);
            }

            users.insert(id.to_string(), current);
            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &CancellationToken, id: &str) -> RepositoryResult<()> {
        run_cancellable(ctx, async {
            self.users
                .write()
                .await
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| RepositoryError::not_found(id))
        })
        .await
    }
}
