//! Postgres users repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use tokio_util::sync::CancellationToken;

use domain::{run_cancellable, RepositoryError, RepositoryResult, UpdateFn, User, UsersRepository};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};

/// SeaORM implementation of [`UsersRepository`].
///
/// Id and email uniqueness come from the table's primary key and unique
/// index; a violation on insert is reported as already exists.
#[derive(Clone)]
pub struct PgUsersRepository {
    db: DatabaseConnection,
}

impl PgUsersRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<User> {
        let model = UserEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| RepositoryError::not_found(id))?;

        User::try_from(model)
    }
}

fn map_db_err(err: DbErr) -> RepositoryError {
    classify(err.sql_err(), &err)
}

fn classify(sql_err: Option<SqlErr>, err: &DbErr) -> RepositoryError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::UserAlreadyExists,
        _ => RepositoryError::storage(err.to_string()),
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn save(&self, ctx: &CancellationToken, user: &User) -> RepositoryResult<()> {
        run_cancellable(ctx, async {
            ActiveModel::from(user)
                .insert(&self.db)
                .await
                .map_err(map_db_err)?;
            Ok(())
        })
        .await
    }

    async fn user(&self, ctx: &CancellationToken, id: &str) -> RepositoryResult<User> {
        run_cancellable(ctx, self.find_by_id(id)).await
    }

    async fn user_by_email(&self, ctx: &CancellationToken, email: &str) -> RepositoryResult<User> {
        run_cancellable(ctx, async {
            let model = UserEntity::find()
                .filter(user::Column::Email.eq(email))
                .one(&self.db)
                .await
                .map_err(map_db_err)?
                .ok_or_else(|| RepositoryError::email_not_found(email))?;

            User::try_from(model)
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
            let mut current = self.find_by_id(id).await?;

            update_fn(&mut current).map_err(RepositoryError::Mutation)?;
            current.touch();

            // Zero rows means the user was deleted after the read
            let result = UserEntity::update_many()
                .col_expr(user::Column::Email, Expr::value(current.email().to_string()))
                .col_expr(
                    user::Column::Passhash,
                    Expr::value(current.password_hash().as_str().to_string()),
                )
                .col_expr(user::Column::UpdatedAt, Expr::value(current.updated_at()))
                .filter(user::Column::Uuid.eq(id))
                .exec(&self.db)
                .await
                .map_err(map_db_err)?;

            if result.rows_affected == 0 {
                return Err(RepositoryError::not_found(id));
            }

            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &CancellationToken, id: &str) -> RepositoryResult<()> {
        run_cancellable(ctx, async {
            let result = UserEntity::delete_by_id(id.to_string())
                .exec(&self.db)
                .await
                .map_err(map_db_err)?;

            if result.rows_affected == 0 {
                return Err(RepositoryError::not_found(id));
            }

            Ok(())
        })
        .await
    }
}
