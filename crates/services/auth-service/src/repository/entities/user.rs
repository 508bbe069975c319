//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{PasswordHash, RepositoryError, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    #[sea_orm(unique)]
    pub email: String,
    pub passhash: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Rebuild the aggregate; a row that breaks its invariants is an error, not a panic
impl TryFrom<Model> for User {
    type Error = RepositoryError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        User::from_storage(
            model.uuid,
            model.email,
            PasswordHash::from_stored(model.passhash),
            model.created_at,
            model.updated_at,
        )
        .map_err(RepositoryError::InvalidRecord)
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            uuid: Set(user.id().to_string()),
            email: Set(user.email().to_string()),
            passhash: Set(user.password_hash().as_str().to_string()),
            created_at: Set(user.created_at()),
            updated_at: Set(user.updated_at()),
        }
    }
}
