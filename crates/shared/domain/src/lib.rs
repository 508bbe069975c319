//! Domain layer - Credential value types, the user aggregate and its storage contract.
//!
//! This crate contains pure domain logic with no transport or driver dependencies.
//! Storage adapters implement [`UsersRepository`]; the application layer only
//! ever talks to the trait.

pub mod constants;
pub mod error;
pub mod password;
pub mod repository;
pub mod user;
pub mod value;

pub use constants::*;
pub use error::{DomainError, DomainResult, TokenError};
pub use password::{CredentialHasher, PasswordHash};
pub use repository::{run_cancellable, RepositoryError, RepositoryResult, UpdateFn, UsersRepository};
pub use user::User;
pub use value::{validate_email, validate_password, Email, Password};

#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockUsersRepository;
